use std::path::Path;

use serde::Serialize;

use super::CommandError;
use crate::authority::{CertAuthority, Protocol};
use crate::keystore::{KeyStore, KeyStoreError};
use crate::signer::Signer;

/// Summary of the key a key store picked for a CA.
#[derive(Serialize, Debug, PartialEq)]
pub struct SelectedSigner {
    pub cluster_name: String,
    pub protocol: String,
    /// Whether the selected key can sign. TLS keys without private key only verify.
    pub can_sign: bool,
    /// Public key of the signer: PEM for TLS and JWT, authorized-key line for SSH.
    pub public_key: Option<String>,
    /// SSH signature algorithm the CA advertises.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

pub struct SelectSignerCommand<K>
where
    K: KeyStore,
{
    key_store: K,
}

impl<K> SelectSignerCommand<K>
where
    K: KeyStore,
{
    pub fn new(key_store: K) -> Self {
        Self { key_store }
    }

    pub fn load_ca(path: &Path) -> Result<CertAuthority, CommandError> {
        let content = std::fs::read(path).map_err(|e| CommandError::ReadCa(e.to_string()))?;
        serde_json::from_slice(&content).map_err(|e| CommandError::ReadCa(e.to_string()))
    }

    pub fn select_signer(
        &self,
        ca: &CertAuthority,
        protocol: Protocol,
        allow_provisional: bool,
    ) -> Result<SelectedSigner, CommandError> {
        let (public_key, algorithm) = match protocol {
            Protocol::Ssh => {
                let signer = self.key_store.get_ssh_signer(ca, allow_provisional)?;
                let public_key = signer.authorized_key().map_err(KeyStoreError::from)?;
                (Some(public_key), Some(signer.algorithm().as_str().to_string()))
            }
            Protocol::Tls => {
                let selected = self
                    .key_store
                    .get_tls_cert_and_signer(ca, allow_provisional)?;
                let public_key = selected
                    .signer
                    .map(|signer| public_key_pem(&signer))
                    .transpose()?;
                (public_key, None)
            }
            Protocol::Jwt => {
                let signer = self.key_store.get_jwt_signer(ca)?;
                (Some(public_key_pem(&signer)?), None)
            }
        };

        Ok(SelectedSigner {
            cluster_name: ca.cluster_name.clone(),
            protocol: protocol.to_string(),
            can_sign: public_key.is_some(),
            public_key,
            algorithm,
        })
    }
}

fn public_key_pem<S: Signer>(signer: &S) -> Result<String, CommandError> {
    let pem = signer.public_key_pem().map_err(KeyStoreError::from)?;
    Ok(String::from_utf8_lossy(&pem).into_owned())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::authority::{CaKeySet, PrivateKeyType, TlsKeyPair};
    use crate::keystore::software::SoftwareKeyStore;
    use crate::signer::local::test::{RS256_PRIVATE_KEY, RS256_PUBLIC_KEY};

    fn ca() -> CertAuthority {
        let store = SoftwareKeyStore::default();
        CertAuthority::new("example.com").with_active_keys(CaKeySet {
            ssh: vec![store.new_ssh_key_pair().unwrap()],
            tls: vec![TlsKeyPair {
                cert: b"cert".to_vec(),
                key: Vec::new(),
                key_type: PrivateKeyType::Raw,
                provisional: false,
            }],
            jwt: Vec::new(),
        })
    }

    #[test]
    fn select_ssh_signer() {
        let ca = ca();
        let command = SelectSignerCommand::new(SoftwareKeyStore::default());
        let selected = command.select_signer(&ca, Protocol::Ssh, false).unwrap();

        let expected = String::from_utf8(ca.active_keys.ssh[0].public_key.clone()).unwrap();
        assert!(selected.can_sign);
        assert_eq!(selected.public_key.as_deref(), Some(expected.trim_end()));
        assert_eq!(selected.algorithm.as_deref(), Some("rsa-sha2-512"));
    }

    #[test]
    fn select_verification_only_tls() {
        let command = SelectSignerCommand::new(SoftwareKeyStore::default());
        let selected = command.select_signer(&ca(), Protocol::Tls, false).unwrap();
        assert_eq!(
            selected,
            SelectedSigner {
                cluster_name: "example.com".to_string(),
                protocol: "TLS".to_string(),
                can_sign: false,
                public_key: None,
                algorithm: None,
            }
        );
    }

    #[test]
    fn select_missing_jwt() {
        let command = SelectSignerCommand::new(SoftwareKeyStore::default());
        assert_matches!(
            command.select_signer(&ca(), Protocol::Jwt, true),
            Err(CommandError::KeyStore(KeyStoreError::NotFound { .. }))
        );
    }

    #[test]
    fn load_ca_from_file() {
        let ca = CertAuthority::new("example.com").with_active_keys(CaKeySet {
            jwt: vec![crate::authority::JwtKeyPair {
                public_key: RS256_PUBLIC_KEY.as_bytes().to_vec(),
                private_key: RS256_PRIVATE_KEY.as_bytes().to_vec(),
                private_key_type: PrivateKeyType::Raw,
                provisional: false,
            }],
            ..Default::default()
        });
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&serde_json::to_vec(&ca).unwrap()).unwrap();

        let loaded = SelectSignerCommand::<SoftwareKeyStore>::load_ca(file.path()).unwrap();
        assert_eq!(loaded, ca);

        let command = SelectSignerCommand::new(SoftwareKeyStore::default());
        let selected = command.select_signer(&loaded, Protocol::Jwt, false).unwrap();
        assert!(selected.can_sign);
        assert!(
            selected
                .public_key
                .unwrap()
                .starts_with("-----BEGIN PUBLIC KEY-----")
        );
    }
}
