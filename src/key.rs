use std::fmt;

pub mod creator;
pub mod local;

/// A PEM-encoded public key.
pub type PublicKeyPem = Vec<u8>;

/// Represents a PEM-encoded private key "byte string".
#[derive(Clone, PartialEq)]
pub struct PrivateKeyPem(Vec<u8>);

impl<S: AsRef<[u8]>> From<S> for PrivateKeyPem {
    fn from(key: S) -> Self {
        PrivateKeyPem(key.as_ref().to_vec())
    }
}

impl PrivateKeyPem {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

/// Opaque key identifier returned by a key store when generating a key.
///
/// What the bytes mean is up to the backend that produced them. The software key store uses
/// the PEM-encoded private key itself, so identifiers coming from it are secrets. Other
/// backends hand out non-secret handles such as a key name or URI. The `Debug` output never
/// shows the content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyId(Vec<u8>);

impl KeyId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for KeyId {
    fn from(value: Vec<u8>) -> Self {
        KeyId(value)
    }
}

impl From<&[u8]> for KeyId {
    fn from(value: &[u8]) -> Self {
        KeyId(value.to_vec())
    }
}

impl From<PrivateKeyPem> for KeyId {
    fn from(value: PrivateKeyPem) -> Self {
        KeyId(value.0)
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId(<{} bytes>)", self.0.len())
    }
}
