use serde_json::Value;

use super::CommandError;
use crate::authority::Protocol;
use crate::keystore::KeyStore;

pub struct NewKeyPairCommand<K>
where
    K: KeyStore,
{
    key_store: K,
}

impl<K> NewKeyPairCommand<K>
where
    K: KeyStore,
{
    pub fn new(key_store: K) -> Self {
        Self { key_store }
    }

    /// Creates a key pair record for `protocol`, serialized as JSON.
    pub fn new_key_pair(
        &self,
        protocol: Protocol,
        cluster_name: Option<&str>,
    ) -> Result<Value, CommandError> {
        let key_pair = match protocol {
            Protocol::Ssh => serde_json::to_value(self.key_store.new_ssh_key_pair()?)?,
            Protocol::Tls => {
                let cluster_name = cluster_name.ok_or(CommandError::MissingClusterName)?;
                serde_json::to_value(self.key_store.new_tls_key_pair(cluster_name)?)?
            }
            Protocol::Jwt => serde_json::to_value(self.key_store.new_jwt_key_pair()?)?,
        };
        Ok(key_pair)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::authority::{JwtKeyPair, PrivateKeyType, SshKeyPair, TlsKeyPair};
    use crate::keystore::software::SoftwareKeyStore;

    #[test]
    fn new_ssh_key_pair_json() {
        let command = NewKeyPairCommand::new(SoftwareKeyStore::default());
        let value = command.new_key_pair(Protocol::Ssh, None).unwrap();
        let key_pair: SshKeyPair = serde_json::from_value(value).unwrap();
        assert_eq!(key_pair.private_key_type, PrivateKeyType::Raw);
        assert!(key_pair.public_key.starts_with(b"ssh-rsa "));
    }

    #[test]
    fn new_tls_key_pair_json() {
        let command = NewKeyPairCommand::new(SoftwareKeyStore::default());
        let value = command
            .new_key_pair(Protocol::Tls, Some("example.com"))
            .unwrap();
        let key_pair: TlsKeyPair = serde_json::from_value(value).unwrap();
        assert!(!key_pair.cert.is_empty());
        assert!(!key_pair.key.is_empty());
    }

    #[test]
    fn new_tls_key_pair_requires_cluster_name() {
        let command = NewKeyPairCommand::new(SoftwareKeyStore::default());
        assert_matches!(
            command.new_key_pair(Protocol::Tls, None),
            Err(CommandError::MissingClusterName)
        );
    }

    #[test]
    fn new_jwt_key_pair_json() {
        let command = NewKeyPairCommand::new(SoftwareKeyStore::default());
        let value = command.new_key_pair(Protocol::Jwt, None).unwrap();
        let key_pair: JwtKeyPair = serde_json::from_value(value).unwrap();
        assert!(key_pair.public_key.starts_with(b"-----BEGIN PUBLIC KEY-----"));
    }
}
