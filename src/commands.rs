use thiserror::Error;

use crate::keystore::KeyStoreError;
use crate::keystore::config::ConfigError;

pub mod new_key_pair;
pub mod select_signer;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("key store: `{0}`")]
    KeyStore(#[from] KeyStoreError),
    #[error("config: `{0}`")]
    Config(#[from] ConfigError),
    #[error("a cluster name is required for TLS key pairs")]
    MissingClusterName,
    #[error("reading CA: `{0}`")]
    ReadCa(String),
    #[error("encoding output: `{0}`")]
    Encoding(#[from] serde_json::Error),
}
