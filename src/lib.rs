//! Signing keys of a cluster certificate authority.
//!
//! The [`keystore::KeyStore`] trait abstracts where CA private keys live. Higher level CA
//! logic creates key pair records through it, attaches them to a
//! [`authority::CertAuthority`], and later asks the key store for a signer for the SSH, TLS
//! or JWT domain. The [`keystore::software::SoftwareKeyStore`] keeps keys as PEM inside the
//! records themselves.
pub mod authority;
pub mod commands;
pub mod jwt;
pub mod key;
pub mod keystore;
pub mod parameters;
pub mod signer;
pub mod ssh;
pub mod tls;
