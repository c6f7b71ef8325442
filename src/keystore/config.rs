use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::software::SoftwareKeyStore;
use crate::key::creator::KeyType;
use crate::key::local::LocalCreator;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading key store config: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("parsing key store config: `{0}`")]
    Parse(#[from] serde_json::Error),
}

/// Which key store backend a CA uses, and its settings.
///
/// ```json
/// { "software": { "key_type": "rsa2048", "tls_ca_ttl_days": 3650 } }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum KeyStoreConfig {
    Software(SoftwareKeyStoreConfig),
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self::Software(SoftwareKeyStoreConfig::default())
    }
}

impl KeyStoreConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SoftwareKeyStoreConfig {
    #[serde(default)]
    pub key_type: KeyType,
    /// Validity of the self-signed certificates of new TLS key pairs.
    #[serde(default = "default_tls_ca_ttl_days")]
    pub tls_ca_ttl_days: u32,
}

fn default_tls_ca_ttl_days() -> u32 {
    3650
}

impl Default for SoftwareKeyStoreConfig {
    fn default() -> Self {
        Self {
            key_type: KeyType::default(),
            tls_ca_ttl_days: default_tls_ca_ttl_days(),
        }
    }
}

impl From<&SoftwareKeyStoreConfig> for SoftwareKeyStore<LocalCreator> {
    fn from(config: &SoftwareKeyStoreConfig) -> Self {
        SoftwareKeyStore::new(LocalCreator)
            .with_key_type(config.key_type)
            .with_tls_ca_ttl(DAY * config.tls_ca_ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::keystore::{KeyStore, KeyStoreError};
    use crate::tls::CertificateError;

    #[test]
    fn software_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"software": {"key_type": "rsa4096", "tls_ca_ttl_days": 30}}"#)
            .unwrap();

        let config = KeyStoreConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            KeyStoreConfig::Software(SoftwareKeyStoreConfig {
                key_type: KeyType::Rsa4096,
                tls_ca_ttl_days: 30,
            })
        );
    }

    #[test]
    fn software_config_defaults() {
        let config: KeyStoreConfig = serde_json::from_str(r#"{"software": {}}"#).unwrap();
        assert_eq!(config, KeyStoreConfig::default());
    }

    #[test]
    fn tls_ttl_beyond_certificate_range() {
        let config: KeyStoreConfig =
            serde_json::from_str(r#"{"software": {"tls_ca_ttl_days": 3000000}}"#).unwrap();
        let KeyStoreConfig::Software(config) = config;
        let store: SoftwareKeyStore = (&config).into();

        assert_matches!(
            store.new_tls_key_pair("example.com"),
            Err(KeyStoreError::Certificate {
                cluster_name,
                source: CertificateError::InvalidValidity(_),
            }) => assert_eq!(cluster_name, "example.com")
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = serde_json::from_str::<KeyStoreConfig>(r#"{"pkcs11": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = KeyStoreConfig::from_file(&dir.path().join("missing.json"));
        assert_matches!(result, Err(ConfigError::Io(_)));
    }
}
