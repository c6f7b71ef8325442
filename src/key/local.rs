use rcgen::KeyPair as RcKeyPair;
use rcgen::{PKCS_RSA_SHA256, RsaKeySize};
use thiserror::Error;
use tracing::debug;

use crate::key::creator::{CreationError, Creator, KeyPair, KeyType, Options};

/// Errors that can occur during local key creation.
#[derive(Error, Debug)]
pub enum LocalKeyCreationError {
    /// Error that occurs when key generation fails.
    #[error("unable to generate key: `{0}`")]
    UnableToGenerateKey(String),
}

/// A creator generating RSA keys in process.
///
/// Nothing is persisted: the PEM-encoded private key is handed back to the caller, which
/// decides where it lives.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCreator;

impl Creator for LocalCreator {
    fn create(&self, options: &Options) -> Result<KeyPair, CreationError> {
        Ok(rsa(options.key_type)?)
    }
}

impl From<LocalKeyCreationError> for CreationError {
    fn from(value: LocalKeyCreationError) -> Self {
        CreationError::UnableToCreateKey(value.to_string())
    }
}

/// Generates an RSA key pair based on the specified key type.
///
/// Returns the generated `KeyPair` or an error if key generation fails.
fn rsa(key_type: KeyType) -> Result<KeyPair, LocalKeyCreationError> {
    let key_size = match key_type {
        KeyType::Rsa2048 => RsaKeySize::_2048,
        KeyType::Rsa3072 => RsaKeySize::_3072,
        KeyType::Rsa4096 => RsaKeySize::_4096,
    };

    debug!(?key_type, "generating RSA key pair");
    let rsa = RcKeyPair::generate_rsa_for(&PKCS_RSA_SHA256, key_size)
        .map_err(|e| LocalKeyCreationError::UnableToGenerateKey(e.to_string()))?;

    Ok(KeyPair {
        private_key: rsa.serialize_pem().into(),
        public_key: rsa.public_key_pem().into_bytes(),
    })
}
