use std::time::Duration;

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyUsagePurpose,
    PKCS_RSA_SHA256, PublicKeyData, SignatureAlgorithm, SigningKey,
};
use rsa::pkcs1::EncodeRsaPublicKey;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;

use crate::signer::{DigestAlgorithm, Signer};

/// Validity of CA certificates generated for new TLS key pairs.
pub const DEFAULT_CA_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("encoding public key: `{0}`")]
    PublicKey(String),
    #[error("generating self-signed CA certificate: `{0}`")]
    Generation(#[from] rcgen::Error),
    #[error("certificate validity of {0:?} is out of range")]
    InvalidValidity(Duration),
}

/// Lets rcgen sign through a key store signer instead of holding the key itself.
struct SignerKey<'a, S: ?Sized> {
    signer: &'a S,
    public_key_der: Vec<u8>,
}

impl<'a, S: Signer + ?Sized> SignerKey<'a, S> {
    fn new(signer: &'a S) -> Result<Self, CertificateError> {
        let public_key_der = signer
            .public_key()
            .to_pkcs1_der()
            .map_err(|e| CertificateError::PublicKey(e.to_string()))?
            .as_bytes()
            .to_vec();
        Ok(Self {
            signer,
            public_key_der,
        })
    }
}

impl<S: Signer + ?Sized> PublicKeyData for SignerKey<'_, S> {
    fn der_bytes(&self) -> &[u8] {
        &self.public_key_der
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        &PKCS_RSA_SHA256
    }
}

impl<S: Signer + ?Sized> SigningKey for SignerKey<'_, S> {
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, rcgen::Error> {
        let digest = DigestAlgorithm::Sha256.digest(msg);
        self.signer
            .sign(DigestAlgorithm::Sha256, &digest)
            .map_err(|e| {
                warn!("signing CA certificate failed: {e}");
                rcgen::Error::RemoteKeyError
            })
    }
}

/// Generates a PEM-encoded self-signed CA certificate for `cluster_name`, signed by `signer`.
pub fn generate_self_signed_ca<S: Signer + ?Sized>(
    signer: &S,
    cluster_name: &str,
    ttl: Duration,
) -> Result<Vec<u8>, CertificateError> {
    let key = SignerKey::new(signer)?;

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(DnType::CommonName, cluster_name);
    distinguished_name.push(DnType::OrganizationName, cluster_name);

    let not_before = OffsetDateTime::now_utc();
    let not_after = time::Duration::try_from(ttl)
        .ok()
        .and_then(|ttl| not_before.checked_add(ttl))
        .ok_or(CertificateError::InvalidValidity(ttl))?;

    let mut params = CertificateParams::default();
    params.distinguished_name = distinguished_name;
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.not_before = not_before;
    params.not_after = not_after;

    let cert = params.self_signed(&key)?;
    Ok(cert.pem().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::SignError;
    use crate::signer::local::{LocalSigner, test::RS256_PRIVATE_KEY};

    #[test]
    fn self_signed_ca_certificate() {
        let signer = LocalSigner::try_from(RS256_PRIVATE_KEY.as_bytes()).unwrap();
        let cert = generate_self_signed_ca(&signer, "example.com", DEFAULT_CA_TTL).unwrap();
        let cert = String::from_utf8(cert).unwrap();
        assert!(cert.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(cert.trim_end().ends_with("-----END CERTIFICATE-----"));
    }

    #[test]
    fn validity_out_of_range() {
        let signer = LocalSigner::try_from(RS256_PRIVATE_KEY.as_bytes()).unwrap();
        for ttl in [Duration::MAX, Duration::from_secs(3_000_000 * 24 * 60 * 60)] {
            assert!(matches!(
                generate_self_signed_ca(&signer, "example.com", ttl),
                Err(CertificateError::InvalidValidity(invalid)) if invalid == ttl
            ));
        }
    }

    struct BrokenSigner(LocalSigner);

    impl Signer for BrokenSigner {
        fn public_key(&self) -> &rsa::RsaPublicKey {
            self.0.public_key()
        }

        fn sign(&self, _: DigestAlgorithm, _: &[u8]) -> Result<Vec<u8>, SignError> {
            Err(SignError::Signing("device unavailable".to_string()))
        }
    }

    #[test]
    fn signing_failure_is_reported() {
        let signer = BrokenSigner(LocalSigner::try_from(RS256_PRIVATE_KEY.as_bytes()).unwrap());
        let result = generate_self_signed_ca(&signer, "example.com", DEFAULT_CA_TTL);
        assert!(matches!(result, Err(CertificateError::Generation(_))));
    }
}
