//! Builders of new CA key pair records, shared by every key store backend.
//!
//! Each builder generates exactly one key through [`KeyStore::generate_rsa`] and tags the
//! record with the key store it came from. New records are never provisional; promoting or
//! demoting them is up to the rotation workflow.
use std::time::Duration;

use tracing::debug;

use super::{KeyStore, KeyStoreError};
use crate::authority::{JwtKeyPair, SshKeyPair, TlsKeyPair};
use crate::signer::Signer;
use crate::{ssh, tls};

pub fn new_ssh_key_pair<K: KeyStore + ?Sized>(store: &K) -> Result<SshKeyPair, KeyStoreError> {
    let (key_id, signer) = store.generate_rsa()?;
    let public_key = ssh::authorized_key(&signer)?;
    debug!(key_type = ?store.key_type(), "created SSH key pair");
    Ok(SshKeyPair {
        public_key: public_key.into_bytes(),
        private_key: key_id.into_bytes(),
        private_key_type: store.key_type(),
        provisional: false,
    })
}

/// Creates a TLS key pair whose certificate is a self-signed CA for `cluster_name`.
pub fn new_tls_key_pair<K: KeyStore + ?Sized>(
    store: &K,
    cluster_name: &str,
    ttl: Duration,
) -> Result<TlsKeyPair, KeyStoreError> {
    let (key_id, signer) = store.generate_rsa()?;
    let cert = tls::generate_self_signed_ca(&signer, cluster_name, ttl).map_err(|source| {
        KeyStoreError::Certificate {
            cluster_name: cluster_name.to_string(),
            source,
        }
    })?;
    debug!(key_type = ?store.key_type(), cluster_name, "created TLS key pair");
    Ok(TlsKeyPair {
        cert,
        key: key_id.into_bytes(),
        key_type: store.key_type(),
        provisional: false,
    })
}

pub fn new_jwt_key_pair<K: KeyStore + ?Sized>(store: &K) -> Result<JwtKeyPair, KeyStoreError> {
    let (key_id, signer) = store.generate_rsa()?;
    let public_key = signer.public_key_pem()?;
    debug!(key_type = ?store.key_type(), "created JWT key pair");
    Ok(JwtKeyPair {
        public_key,
        private_key: key_id.into_bytes(),
        private_key_type: store.key_type(),
        provisional: false,
    })
}
