use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{PrivateKeyPem, PublicKeyPem};

/// Represents the type of cryptographic key to be created.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// RSA key with a size of 2048 bits.
    #[default]
    Rsa2048,
    /// RSA key with a size of 3072 bits.
    Rsa3072,
    /// RSA key with a size of 4096 bits.
    Rsa4096,
}

/// Options for creating a cryptographic key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// The type of key to be created.
    pub key_type: KeyType,
}

/// A pair of cryptographic keys, consisting of a private key and a public key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// The private key in PEM format.
    pub private_key: PrivateKeyPem,
    /// The public key in PEM format.
    pub public_key: PublicKeyPem,
}

/// Errors that can occur during key creation.
#[derive(Error, Debug)]
pub enum CreationError {
    /// Indicates that the key could not be created, with a specific error message.
    #[error("unable to create key: `{0}`")]
    UnableToCreateKey(String),
}

/// A source of new key pairs.
#[cfg_attr(test, mockall::automock)]
pub trait Creator {
    /// Creates a cryptographic key based on the provided options.
    ///
    /// Returns both halves PEM-encoded, or an error if key creation fails.
    fn create(&self, options: &Options) -> Result<KeyPair, CreationError>;
}

impl<F> Creator for F
where
    F: Fn(&Options) -> Result<KeyPair, CreationError>,
{
    fn create(&self, options: &Options) -> Result<KeyPair, CreationError> {
        self(options)
    }
}
