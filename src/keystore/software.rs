use std::time::Duration;

use tracing::debug;

use super::factory;
use super::{
    KeyStore, KeyStoreError, TlsCertAndSigner, key_set_has_local_keys, select_key_pair,
};
use crate::authority::{CertAuthority, JwtKeyPair, PrivateKeyType, Protocol, SshKeyPair, TlsKeyPair};
use crate::key::KeyId;
use crate::key::creator::{Creator, KeyType, Options};
use crate::key::local::LocalCreator;
use crate::signer::local::LocalSigner;
use crate::ssh::{SshSigner, signing_alg_name};
use crate::tls::DEFAULT_CA_TTL;

/// Key store keeping private keys as PEM inside the CA records.
///
/// The identifier of a key is the PEM-encoded private key, so any key can be turned back into
/// a signer without looking anything up. It holds no state besides the key source, which
/// makes it safe to share between threads when the creator is.
#[derive(Debug, Clone)]
pub struct SoftwareKeyStore<C = LocalCreator> {
    creator: C,
    options: Options,
    tls_ca_ttl: Duration,
}

impl Default for SoftwareKeyStore<LocalCreator> {
    fn default() -> Self {
        Self::new(LocalCreator)
    }
}

impl<C: Creator> SoftwareKeyStore<C> {
    pub fn new(creator: C) -> Self {
        Self {
            creator,
            options: Options::default(),
            tls_ca_ttl: DEFAULT_CA_TTL,
        }
    }

    pub fn with_key_type(self, key_type: KeyType) -> Self {
        Self {
            options: Options { key_type },
            ..self
        }
    }

    pub fn with_tls_ca_ttl(self, tls_ca_ttl: Duration) -> Self {
        Self { tls_ca_ttl, ..self }
    }

    fn parse_signer(
        ca: &CertAuthority,
        protocol: Protocol,
        private_key: &[u8],
    ) -> Result<LocalSigner, KeyStoreError> {
        LocalSigner::try_from(private_key).map_err(|e| KeyStoreError::parse(ca, protocol, e))
    }
}

impl<C: Creator> KeyStore for SoftwareKeyStore<C> {
    type Signer = LocalSigner;

    fn key_type(&self) -> PrivateKeyType {
        PrivateKeyType::Raw
    }

    fn generate_rsa(&self) -> Result<(KeyId, LocalSigner), KeyStoreError> {
        let key_pair = self.creator.create(&self.options)?;
        let key_id = KeyId::from(key_pair.private_key);
        let signer = self.get_signer(&key_id)?;
        Ok((key_id, signer))
    }

    fn get_signer(&self, key_id: &KeyId) -> Result<LocalSigner, KeyStoreError> {
        LocalSigner::try_from(key_id.as_bytes())
            .map_err(|e| KeyStoreError::InvalidKey(e.to_string()))
    }

    fn get_tls_cert_and_signer(
        &self,
        ca: &CertAuthority,
        allow_provisional: bool,
    ) -> Result<TlsCertAndSigner<LocalSigner>, KeyStoreError> {
        let (_, key_pair) =
            select_key_pair(&ca.active_keys.tls, self.key_type(), allow_provisional)
                .ok_or_else(|| KeyStoreError::not_found(ca, Protocol::Tls))?;

        // No private key: the certificate is only used for verification.
        if key_pair.key.is_empty() {
            debug!(cluster_name = %ca.cluster_name, "selected TLS key pair has no private key");
            return Ok(TlsCertAndSigner {
                cert: key_pair.cert.clone(),
                signer: None,
            });
        }

        let signer = Self::parse_signer(ca, Protocol::Tls, &key_pair.key)?;
        Ok(TlsCertAndSigner {
            cert: key_pair.cert.clone(),
            signer: Some(signer),
        })
    }

    fn get_ssh_signer(
        &self,
        ca: &CertAuthority,
        allow_provisional: bool,
    ) -> Result<SshSigner<LocalSigner>, KeyStoreError> {
        let (_, key_pair) =
            select_key_pair(&ca.active_keys.ssh, self.key_type(), allow_provisional)
                .ok_or_else(|| KeyStoreError::not_found(ca, Protocol::Ssh))?;
        let signer = Self::parse_signer(ca, Protocol::Ssh, &key_pair.private_key)?;
        SshSigner::new(signer, signing_alg_name(ca))
            .map_err(|e| KeyStoreError::parse(ca, Protocol::Ssh, e))
    }

    fn get_jwt_signer(&self, ca: &CertAuthority) -> Result<LocalSigner, KeyStoreError> {
        let (_, key_pair) = select_key_pair(&ca.active_keys.jwt, self.key_type(), false)
            .ok_or_else(|| KeyStoreError::not_found(ca, Protocol::Jwt))?;
        Self::parse_signer(ca, Protocol::Jwt, &key_pair.private_key)
    }

    fn new_ssh_key_pair(&self) -> Result<SshKeyPair, KeyStoreError> {
        factory::new_ssh_key_pair(self)
    }

    fn new_tls_key_pair(&self, cluster_name: &str) -> Result<TlsKeyPair, KeyStoreError> {
        factory::new_tls_key_pair(self, cluster_name, self.tls_ca_ttl)
    }

    fn new_jwt_key_pair(&self) -> Result<JwtKeyPair, KeyStoreError> {
        factory::new_jwt_key_pair(self)
    }

    fn has_local_active_keys(&self, ca: &CertAuthority) -> bool {
        key_set_has_local_keys(&ca.active_keys, self.key_type(), false)
    }

    fn has_local_additional_keys(&self, ca: &CertAuthority) -> bool {
        key_set_has_local_keys(&ca.additional_trusted_keys, self.key_type(), false)
    }

    fn has_local_provisional_keys(&self, ca: &CertAuthority) -> bool {
        key_set_has_local_keys(&ca.active_keys, self.key_type(), true)
    }

    /// Nothing to delete: the identifier is the key, and it lives in the CA record.
    fn delete_key(&self, _key_id: &KeyId) -> Result<(), KeyStoreError> {
        Ok(())
    }

    /// Nothing to delete: the identifier is the key, and it lives in the CA record.
    fn delete_unused_keys(&self, _used_keys: &[KeyId]) -> Result<(), KeyStoreError> {
        Ok(())
    }
}
