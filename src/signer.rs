use rsa::RsaPublicKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::key::PublicKeyPem;

pub mod local;

/// Hash algorithms a digest handed to a [`Signer`] can be computed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error("digest length {actual} does not match {algorithm:?} ({expected} bytes)")]
    DigestLength {
        algorithm: DigestAlgorithm,
        expected: usize,
        actual: usize,
    },
    #[error("unable to sign digest: `{0}`")]
    Signing(String),
    #[error("unable to encode public key: `{0}`")]
    PublicKeyEncoding(String),
}

/// A capability producing signatures with a private key that may not be reachable otherwise.
///
/// Backends only need to sign pre-computed digests. Hashing the message, and picking the
/// hash, is the caller's concern.
pub trait Signer: Send + Sync {
    /// The public half of the signing key.
    fn public_key(&self) -> &RsaPublicKey;

    /// Signs `digest`, computed with `algorithm`, using RSASSA-PKCS1-v1_5.
    fn sign(&self, algorithm: DigestAlgorithm, digest: &[u8]) -> Result<Vec<u8>, SignError>;

    /// The public key in SPKI PEM format.
    fn public_key_pem(&self) -> Result<PublicKeyPem, SignError> {
        self.public_key()
            .to_public_key_pem(LineEnding::LF)
            .map(String::into_bytes)
            .map_err(|e| SignError::PublicKeyEncoding(e.to_string()))
    }
}

/// Checks that `digest` has the length `algorithm` produces.
pub(crate) fn check_digest(algorithm: DigestAlgorithm, digest: &[u8]) -> Result<(), SignError> {
    if digest.len() != algorithm.output_size() {
        return Err(SignError::DigestLength {
            algorithm,
            expected: algorithm.output_size(),
            actual: digest.len(),
        });
    }
    Ok(())
}
