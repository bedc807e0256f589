//! Digest-then-sign signatures
//!
//! Manifests are signed with RSASSA-PKCS1-v1_5 over a SHA-1 digest using the
//! loaded private key, and verified against the public key embedded in the
//! loaded certificate.

use crate::certificate::CertificateStore;
use crate::error::{SignError, VerifyFailure};
use crate::hash::sha1;
use crate::keystore::KeyStore;
use rsa::Pkcs1v15Sign;
use sha1::Sha1;

/// Message signed by [`SigningEngine::self_check`]
pub const SELF_CHECK_MESSAGE: &[u8] = b"sign me";

/// A cryptographic signature
///
/// This type wraps raw signature bytes. For digest signatures the length is
/// the modulus size of the signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a new Signature from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length of the signature in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the signature is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Signs with the active key and verifies against the active certificate
pub struct SigningEngine<'a> {
    keys: &'a KeyStore,
    certificates: &'a CertificateStore,
}

impl<'a> SigningEngine<'a> {
    /// Create an engine reading from the given stores
    pub fn new(keys: &'a KeyStore, certificates: &'a CertificateStore) -> Self {
        Self { keys, certificates }
    }

    /// Sign `message` with the loaded private key
    pub fn sign(&self, message: &[u8]) -> Result<Signature, SignError> {
        let key = self.keys.key().ok_or(SignError::NoKey)?;
        let digest = sha1(message);
        let bytes = key.rsa().sign_with_rng(
            &mut rand::thread_rng(),
            Pkcs1v15Sign::new::<Sha1>(),
            &digest,
        )?;
        Ok(Signature::new(bytes))
    }

    /// Verify `signature` over `message` against the loaded certificate
    ///
    /// Returns `false` both for a bad signature and when no certificate is
    /// loaded.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self.check(message, signature) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Signature verification failed: {}", reason);
                false
            }
        }
    }

    fn check(&self, message: &[u8], signature: &[u8]) -> Result<(), VerifyFailure> {
        let cert = self
            .certificates
            .current()
            .ok_or(VerifyFailure::NoCertificate)?;
        let public_key = cert.public_key().ok_or(VerifyFailure::UnsupportedKey)?;
        let digest = sha1(message);
        public_key
            .verify(Pkcs1v15Sign::new::<Sha1>(), &digest, signature)
            .map_err(|_| VerifyFailure::BadSignature)
    }

    /// Check that the loaded key and certificate form a key pair
    ///
    /// Signs [`SELF_CHECK_MESSAGE`] and verifies the result. Returns `false`
    /// if either side is missing.
    pub fn self_check(&self) -> bool {
        if !self.keys.is_loaded() || !self.certificates.is_loaded() {
            return false;
        }
        match self.sign(SELF_CHECK_MESSAGE) {
            Ok(signature) => self.verify(SELF_CHECK_MESSAGE, signature.as_bytes()),
            Err(e) => {
                tracing::debug!("Self-check signing failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn stores(key: &[u8], cert: &[u8]) -> (KeyStore, CertificateStore) {
        let mut keys = KeyStore::new();
        keys.load(key, "").unwrap();
        let mut certificates = CertificateStore::new();
        certificates.load_from_bytes(cert).unwrap();
        (keys, certificates)
    }

    #[test]
    fn test_sign_and_verify() {
        let (keys, certificates) = stores(fixtures::PUBLISHER_KEY, fixtures::PUBLISHER_CRT);
        let engine = SigningEngine::new(&keys, &certificates);

        let data = b"test data to sign";
        let sig = engine.sign(data).unwrap();
        assert_eq!(sig.len(), 256);
        assert!(engine.verify(data, sig.as_bytes()));
        assert!(!engine.verify(b"wrong data", sig.as_bytes()));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let (keys, certificates) = stores(fixtures::PUBLISHER_KEY, fixtures::PUBLISHER_CRT);
        let engine = SigningEngine::new(&keys, &certificates);

        // PKCS#1 v1.5 has no randomness; blinding must not change the output
        assert_eq!(engine.sign(b"abc").unwrap(), engine.sign(b"abc").unwrap());
    }

    #[test]
    fn test_verify_openssl_signature() {
        let keys = KeyStore::new();
        let mut certificates = CertificateStore::new();
        certificates.load_from_bytes(fixtures::PUBLISHER_CRT).unwrap();
        let engine = SigningEngine::new(&keys, &certificates);

        assert!(engine.verify(fixtures::MANIFEST, fixtures::MANIFEST_SIG));

        let mut tampered = fixtures::MANIFEST_SIG.to_vec();
        tampered[10] ^= 0xff;
        assert!(!engine.verify(fixtures::MANIFEST, &tampered));
        assert!(!engine.verify(fixtures::MANIFEST, &[]));
    }

    #[test]
    fn test_sign_without_key() {
        let keys = KeyStore::new();
        let certificates = CertificateStore::new();
        let engine = SigningEngine::new(&keys, &certificates);

        assert!(matches!(engine.sign(b"data"), Err(SignError::NoKey)));
    }

    #[test]
    fn test_verify_without_certificate() {
        let (keys, _) = stores(fixtures::PUBLISHER_KEY, fixtures::PUBLISHER_CRT);
        let certificates = CertificateStore::new();
        let engine = SigningEngine::new(&keys, &certificates);

        let sig = engine.sign(b"data").unwrap();
        assert!(!engine.verify(b"data", sig.as_bytes()));
        assert_eq!(
            engine.check(b"data", sig.as_bytes()),
            Err(VerifyFailure::NoCertificate)
        );
    }

    #[test]
    fn test_self_check() {
        let (keys, certificates) = stores(fixtures::PUBLISHER_KEY, fixtures::PUBLISHER_CRT);
        assert!(SigningEngine::new(&keys, &certificates).self_check());

        let (keys, certificates) = stores(fixtures::PUBLISHER_KEY, fixtures::OTHER_CRT);
        assert!(!SigningEngine::new(&keys, &certificates).self_check());

        let (_, certificates) = stores(fixtures::OTHER_KEY, fixtures::OTHER_CRT);
        let empty = KeyStore::new();
        assert!(!SigningEngine::new(&empty, &certificates).self_check());
    }
}
