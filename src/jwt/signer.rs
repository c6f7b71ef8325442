use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Header};
use serde::Serialize;

use super::{claims::Claims, error::JwtEncoderError, signed::SignedJwt};
use crate::signer::{DigestAlgorithm, Signer};

/// A JWT signer.
pub trait JwtSigner {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtEncoderError>;
}

/// RS256 JWT encoder on top of a key store signer.
///
/// The private key never leaves the signer, so this works the same for keys held in memory
/// and for keys held by an external key manager.
#[derive(Debug)]
pub struct CaJwtSigner<S> {
    signer: S,
    key_id: Option<String>,
}

impl<S: Signer> CaJwtSigner<S> {
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            key_id: None,
        }
    }

    /// Sets the `kid` header of every token.
    pub fn with_key_id(self, key_id: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            ..self
        }
    }
}

impl<S: Signer> JwtSigner for CaJwtSigner<S> {
    fn sign(&self, claims: Claims) -> Result<SignedJwt, JwtEncoderError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let message = format!("{}.{}", encode_part(&header)?, encode_part(&claims)?);
        let digest = DigestAlgorithm::Sha256.digest(message.as_bytes());
        let signature = self.signer.sign(DigestAlgorithm::Sha256, &digest)?;

        Ok(SignedJwt {
            value: format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature)),
        })
    }
}

fn encode_part<T: Serialize>(part: &T) -> Result<String, JwtEncoderError> {
    let json =
        serde_json::to_vec(part).map_err(|e| JwtEncoderError::TokenEncoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
