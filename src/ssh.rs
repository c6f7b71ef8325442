use serde::{Deserialize, Serialize};
use ssh_key::public::{KeyData, RsaPublicKey};
use ssh_key::{Algorithm, HashAlg, PublicKey, Signature};
use thiserror::Error;

use crate::authority::CertAuthority;
use crate::signer::{DigestAlgorithm, SignError, Signer};

/// SSH certificate signing algorithm configured for a CA.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SigningAlg {
    #[default]
    Unspecified,
    RsaSha2_256,
    RsaSha2_512,
}

#[derive(Error, Debug)]
pub enum SshSignerError {
    #[error("encoding SSH public key: `{0}`")]
    PublicKey(String),
    #[error("signing SSH payload: `{0}`")]
    Sign(#[from] SignError),
    #[error("building SSH signature: `{0}`")]
    Signature(String),
}

/// Maps the CA signing configuration to the SSH algorithm advertised in signatures.
pub fn signing_alg_name(ca: &CertAuthority) -> Algorithm {
    let hash = match ca.signing_alg {
        SigningAlg::RsaSha2_256 => HashAlg::Sha256,
        SigningAlg::RsaSha2_512 | SigningAlg::Unspecified => HashAlg::Sha512,
    };
    Algorithm::Rsa { hash: Some(hash) }
}

/// Renders the public key of `signer` as an OpenSSH authorized key line.
pub fn authorized_key<S: Signer + ?Sized>(signer: &S) -> Result<String, SshSignerError> {
    openssh_line(&ssh_public_key(signer)?)
}

fn openssh_line(public_key: &PublicKey) -> Result<String, SshSignerError> {
    public_key
        .to_openssh()
        .map_err(|e| SshSignerError::PublicKey(e.to_string()))
}

fn ssh_public_key<S: Signer + ?Sized>(signer: &S) -> Result<PublicKey, SshSignerError> {
    let key = RsaPublicKey::try_from(signer.public_key())
        .map_err(|e| SshSignerError::PublicKey(e.to_string()))?;
    Ok(PublicKey::from(KeyData::Rsa(key)))
}

/// Signs SSH payloads with a key store signer, using a fixed algorithm.
#[derive(Debug)]
pub struct SshSigner<S> {
    signer: S,
    public_key: PublicKey,
    algorithm: Algorithm,
}

impl<S: Signer> SshSigner<S> {
    pub fn new(signer: S, algorithm: Algorithm) -> Result<Self, SshSignerError> {
        let public_key = ssh_public_key(&signer)?;
        Ok(Self {
            signer,
            public_key,
            algorithm,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// The public key as an OpenSSH authorized key line.
    pub fn authorized_key(&self) -> Result<String, SshSignerError> {
        openssh_line(&self.public_key)
    }

    pub fn inner(&self) -> &S {
        &self.signer
    }

    /// Signs `data`, hashing it as the configured algorithm requires.
    pub fn sign(&self, data: &[u8]) -> Result<Signature, SshSignerError> {
        let digest_algorithm = match self.algorithm {
            Algorithm::Rsa {
                hash: Some(HashAlg::Sha256),
            } => DigestAlgorithm::Sha256,
            _ => DigestAlgorithm::Sha512,
        };
        let digest = digest_algorithm.digest(data);
        let signature = self.signer.sign(digest_algorithm, &digest)?;
        Signature::new(self.algorithm.clone(), signature)
            .map_err(|e| SshSignerError::Signature(e.to_string()))
    }
}
