//! Key store contract shared by every backend holding CA private keys.
//!
//! A key store knows how to create RSA keys, how to turn its own key identifiers back into
//! [`Signer`]s, and which records of a [`CertAuthority`] it is able to use. The CA itself is
//! owned elsewhere: key stores never add, promote or remove key pairs.
//!
//! Identifiers are backend specific. The [`software`] key store returns the PEM-encoded private
//! key as identifier, which makes it a secret that must be protected like the key itself.
//! Backends keeping keys in an HSM or a KMS hand out non-secret handles (a key label, a
//! resource name) and must document their format.
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::authority::{
    CaKeySet, CertAuthority, JwtKeyPair, KeyPairRecord, PrivateKeyType, Protocol, SshKeyPair,
    TlsKeyPair,
};
use crate::key::KeyId;
use crate::key::creator::CreationError;
use crate::signer::{SignError, Signer};
use crate::ssh::{SshSigner, SshSignerError};
use crate::tls::CertificateError;

pub mod config;
pub mod factory;
pub mod software;

/// Whether retrying an operation against an external key manager may succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retry {
    Transient,
    Permanent,
}

impl fmt::Display for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retry::Transient => write!(f, "transient"),
            Retry::Permanent => write!(f, "permanent"),
        }
    }
}

#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// No record in the CA is usable by this key store for the request.
    #[error("no matching {protocol} key pairs found in CA for `{cluster_name}`")]
    NotFound {
        cluster_name: String,
        protocol: Protocol,
    },
    /// A record usable by this key store holds malformed key material.
    #[error("parsing {protocol} key pair in CA for `{cluster_name}`: `{reason}`")]
    Parse {
        cluster_name: String,
        protocol: Protocol,
        reason: String,
    },
    #[error("invalid key identifier: `{0}`")]
    InvalidKey(String),
    #[error("generating key: `{0}`")]
    Generation(#[from] CreationError),
    #[error("generating TLS CA certificate for `{cluster_name}`: `{source}`")]
    Certificate {
        cluster_name: String,
        source: CertificateError,
    },
    #[error("building SSH signer: `{0}`")]
    Ssh(#[from] SshSignerError),
    #[error("signer: `{0}`")]
    Signer(#[from] SignError),
    /// The external key manager behind the key store failed.
    #[error("{operation} failed ({retry}): `{reason}`")]
    Upstream {
        operation: String,
        retry: Retry,
        reason: String,
    },
    #[error(transparent)]
    Deletion(#[from] DeletionErrors),
}

impl KeyStoreError {
    pub fn not_found(ca: &CertAuthority, protocol: Protocol) -> Self {
        Self::NotFound {
            cluster_name: ca.cluster_name.clone(),
            protocol,
        }
    }

    pub fn parse(ca: &CertAuthority, protocol: Protocol, reason: impl fmt::Display) -> Self {
        Self::Parse {
            cluster_name: ca.cluster_name.clone(),
            protocol,
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Upstream {
                retry: Retry::Transient,
                ..
            }
        )
    }
}

/// One key that could not be deleted.
#[derive(Debug)]
pub struct DeletionFailure {
    pub key: KeyId,
    pub error: KeyStoreError,
}

/// Every failure of a bulk deletion, not only the first one.
#[derive(Debug, Default)]
pub struct DeletionErrors {
    pub failures: Vec<DeletionFailure>,
}

impl fmt::Display for DeletionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to delete {} key(s)", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}", failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeletionErrors {}

/// Calls `delete` for every key, collecting failures instead of stopping at the first one.
///
/// Intended for backends where deleting is a call to an external system, so that a single
/// failure does not leave the remaining keys orphaned.
pub fn delete_each<'a, I, F>(keys: I, mut delete: F) -> Result<(), KeyStoreError>
where
    I: IntoIterator<Item = &'a KeyId>,
    F: FnMut(&KeyId) -> Result<(), KeyStoreError>,
{
    let mut errors = DeletionErrors::default();
    for key in keys {
        if let Err(error) = delete(key) {
            warn!("error deleting key: {error}");
            errors.failures.push(DeletionFailure {
                key: key.clone(),
                error,
            });
        }
    }
    if errors.failures.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

/// The certificate of the selected TLS key pair and, when the record holds a private key,
/// a signer for it. No signer means the certificate can only be used for verification.
#[derive(Debug)]
pub struct TlsCertAndSigner<S> {
    pub cert: Vec<u8>,
    pub signer: Option<S>,
}

/// Operations every CA key store backend provides.
pub trait KeyStore {
    type Signer: Signer;

    /// Tag of the key pair records this key store creates and is able to use.
    fn key_type(&self) -> PrivateKeyType;

    /// Creates a new RSA key and returns its identifier along with a ready to use signer.
    ///
    /// The identifier can be passed to [`KeyStore::get_signer`] to get the same key back.
    fn generate_rsa(&self) -> Result<(KeyId, Self::Signer), KeyStoreError>;

    /// Returns a signer for an identifier previously returned by this key store.
    fn get_signer(&self, key_id: &KeyId) -> Result<Self::Signer, KeyStoreError>;

    /// Selects the first usable TLS key pair among the active keys of `ca`.
    fn get_tls_cert_and_signer(
        &self,
        ca: &CertAuthority,
        allow_provisional: bool,
    ) -> Result<TlsCertAndSigner<Self::Signer>, KeyStoreError>;

    /// Selects the first usable SSH key pair among the active keys of `ca`.
    fn get_ssh_signer(
        &self,
        ca: &CertAuthority,
        allow_provisional: bool,
    ) -> Result<SshSigner<Self::Signer>, KeyStoreError>;

    /// Selects the first usable JWT key pair among the active keys of `ca`.
    ///
    /// Provisional JWT keys are never used for signing.
    fn get_jwt_signer(&self, ca: &CertAuthority) -> Result<Self::Signer, KeyStoreError>;

    fn new_ssh_key_pair(&self) -> Result<SshKeyPair, KeyStoreError>;

    fn new_tls_key_pair(&self, cluster_name: &str) -> Result<TlsKeyPair, KeyStoreError>;

    fn new_jwt_key_pair(&self) -> Result<JwtKeyPair, KeyStoreError>;

    /// Whether `ca` has active, non-provisional keys usable with this key store.
    fn has_local_active_keys(&self, ca: &CertAuthority) -> bool;

    /// Whether `ca` has additional trusted keys usable with this key store.
    fn has_local_additional_keys(&self, ca: &CertAuthority) -> bool;

    /// Whether `ca` has active provisional keys usable with this key store.
    fn has_local_provisional_keys(&self, ca: &CertAuthority) -> bool;

    /// Deletes the key behind `key_id`.
    fn delete_key(&self, key_id: &KeyId) -> Result<(), KeyStoreError>;

    /// Deletes every key created by this key store that is not listed in `used_keys`.
    ///
    /// Backends must attempt every deletion and report all failures together, see
    /// [`delete_each`].
    fn delete_unused_keys(&self, used_keys: &[KeyId]) -> Result<(), KeyStoreError>;
}

/// First record tagged with `key_type` that is allowed by `allow_provisional`.
pub fn select_key_pair<R: KeyPairRecord>(
    key_pairs: &[R],
    key_type: PrivateKeyType,
    allow_provisional: bool,
) -> Option<(usize, &R)> {
    let selected = key_pairs.iter().enumerate().find(|(_, key_pair)| {
        key_pair.key_type() == key_type && (allow_provisional || !key_pair.is_provisional())
    });
    if let Some((index, _)) = selected {
        debug!(?key_type, index, "selected key pair");
    }
    selected
}

/// Whether `key_set` has any record tagged with `key_type` whose provisional flag is
/// `provisional`.
pub fn key_set_has_local_keys(
    key_set: &CaKeySet,
    key_type: PrivateKeyType,
    provisional: bool,
) -> bool {
    fn any<R: KeyPairRecord>(key_pairs: &[R], key_type: PrivateKeyType, provisional: bool) -> bool {
        key_pairs
            .iter()
            .any(|kp| kp.key_type() == key_type && kp.is_provisional() == provisional)
    }
    any(&key_set.ssh, key_type, provisional)
        || any(&key_set.tls, key_type, provisional)
        || any(&key_set.jwt, key_type, provisional)
}
