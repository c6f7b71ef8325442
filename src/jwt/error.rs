use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtEncoderError {
    // Generic error for each implementation to use
    #[error("unable to encode token: `{0}`")]
    TokenEncoding(String),
    #[error("unable to sign token: `{0}`")]
    Signing(#[from] crate::signer::SignError),
}
