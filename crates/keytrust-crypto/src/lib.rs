//! Cryptographic primitives for repository trust
//!
//! This crate provides the pieces a repository client needs to establish
//! trust in published metadata: a private key store and certificate store
//! for the publisher side, SHA-1/RSA digest signatures, a keyring of trusted
//! master keys, and raw RSA verification of whitelists with an appended
//! signature.
//!
//! RSA is provided by the `rsa` crate, hashing by aws-lc-rs.

pub mod certificate;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod keyring;
pub mod keystore;
mod legacy_pem;
pub mod signing;
pub mod tail;
pub mod verification;

pub use certificate::{CertificateStore, LoadedCertificate, NO_CERTIFICATE};
pub use encoding::CertificateDer;
pub use error::{LoadError, ParseError, Result, SignError};
pub use hash::{sha1, Fingerprint};
pub use keyring::{PublicKeyRing, TrustedPublicKey};
pub use keystore::{KeyAlgorithm, KeyStore, PrivateKeyHandle};
pub use signing::{Signature, SigningEngine, SELF_CHECK_MESSAGE};
pub use tail::SignatureTail;
pub use verification::RawRsaVerifier;
