use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ssh::SigningAlg;

/// Identifies which key store backend is able to interpret a key pair record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrivateKeyType {
    /// The private key is stored in the record itself, PEM-encoded.
    #[default]
    Raw,
    /// The record holds a handle to a key living in a PKCS#11 module.
    Pkcs11,
    /// The record holds the resource name of a GCP KMS key version.
    GcpKms,
    /// The record holds the ARN of an AWS KMS key.
    AwsKms,
}

/// The certificate domains a CA signs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Ssh,
    Tls,
    Jwt,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ssh => write!(f, "SSH"),
            Protocol::Tls => write!(f, "TLS"),
            Protocol::Jwt => write!(f, "JWT"),
        }
    }
}

/// An SSH CA key pair.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SshKeyPair {
    /// Public key in OpenSSH authorized-key format.
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Key material or backend handle, depending on `private_key_type`.
    #[serde(with = "base64_bytes")]
    pub private_key: Vec<u8>,
    pub private_key_type: PrivateKeyType,
    #[serde(default)]
    pub provisional: bool,
}

/// A TLS CA key pair.
///
/// `key` can be empty, in which case the certificate is only good for verification.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TlsKeyPair {
    /// PEM-encoded CA certificate.
    #[serde(with = "base64_bytes")]
    pub cert: Vec<u8>,
    #[serde(with = "base64_bytes", default)]
    pub key: Vec<u8>,
    pub key_type: PrivateKeyType,
    #[serde(default)]
    pub provisional: bool,
}

/// A JWT signing key pair. JWT keys are never distributed as certificates.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct JwtKeyPair {
    /// PEM-encoded public key.
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub private_key: Vec<u8>,
    pub private_key_type: PrivateKeyType,
    #[serde(default)]
    pub provisional: bool,
}

/// The set of key pairs a CA holds for every protocol.
///
/// Ordering is meaningful: it reflects insertion and rotation history, and the first
/// eligible record wins during selection.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CaKeySet {
    #[serde(default)]
    pub ssh: Vec<SshKeyPair>,
    #[serde(default)]
    pub tls: Vec<TlsKeyPair>,
    #[serde(default)]
    pub jwt: Vec<JwtKeyPair>,
}

impl CaKeySet {
    pub fn is_empty(&self) -> bool {
        self.ssh.is_empty() && self.tls.is_empty() && self.jwt.is_empty()
    }
}

/// A cluster certificate authority, as seen by the key store.
///
/// Key stores only read this value. Adding, promoting and removing key pairs is up to the
/// rotation workflow that owns it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CertAuthority {
    pub cluster_name: String,
    /// Keys used to sign new certificates and tokens.
    #[serde(default)]
    pub active_keys: CaKeySet,
    /// Keys kept around for verification while a rotation is in progress.
    #[serde(default)]
    pub additional_trusted_keys: CaKeySet,
    #[serde(default)]
    pub signing_alg: SigningAlg,
}

impl CertAuthority {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            ..Default::default()
        }
    }

    pub fn with_active_keys(self, active_keys: CaKeySet) -> Self {
        Self {
            active_keys,
            ..self
        }
    }

    pub fn with_additional_trusted_keys(self, additional_trusted_keys: CaKeySet) -> Self {
        Self {
            additional_trusted_keys,
            ..self
        }
    }

    pub fn with_signing_alg(self, signing_alg: SigningAlg) -> Self {
        Self {
            signing_alg,
            ..self
        }
    }
}

/// Common view over the per-protocol key pair records, used by selection.
pub trait KeyPairRecord {
    fn key_type(&self) -> PrivateKeyType;
    fn is_provisional(&self) -> bool;
}

impl KeyPairRecord for SshKeyPair {
    fn key_type(&self) -> PrivateKeyType {
        self.private_key_type
    }
    fn is_provisional(&self) -> bool {
        self.provisional
    }
}

impl KeyPairRecord for TlsKeyPair {
    fn key_type(&self) -> PrivateKeyType {
        self.key_type
    }
    fn is_provisional(&self) -> bool {
        self.provisional
    }
}

impl KeyPairRecord for JwtKeyPair {
    fn key_type(&self) -> PrivateKeyType {
        self.private_key_type
    }
    fn is_provisional(&self) -> bool {
        self.provisional
    }
}

/// Serializes raw bytes as standard base64 strings.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
