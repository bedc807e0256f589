//! Raw RSA verification against the trusted keyring
//!
//! Whitelist signatures are not digest signatures. The signature is the RSA
//! private-key operation applied to the PKCS#1 v1.5 (type 1) padded payload
//! itself, so verification recovers the block with each public key and
//! compares it to the payload byte for byte.

use crate::error::VerifyFailure;
use crate::keyring::{PublicKeyRing, TrustedPublicKey};
use rsa::Pkcs1v15Sign;

/// Verifies raw signatures against every key of a [`PublicKeyRing`]
pub struct RawRsaVerifier<'a> {
    ring: &'a PublicKeyRing,
}

impl<'a> RawRsaVerifier<'a> {
    /// Create a verifier over `ring`
    pub fn new(ring: &'a PublicKeyRing) -> Self {
        Self { ring }
    }

    /// Whether any trusted key recovers exactly `message` from `signature`
    pub fn verify_any(&self, message: &[u8], signature: &[u8]) -> bool {
        match self.find(message, signature) {
            Ok(key) => {
                tracing::debug!(
                    "Raw signature accepted by {}-bit key {:?}",
                    key.size_bytes() * 8,
                    key.source()
                );
                true
            }
            Err(reason) => {
                tracing::debug!("Raw signature verification failed: {}", reason);
                false
            }
        }
    }

    /// The first trusted key that accepts the signature, if any
    pub fn matching_key(&self, message: &[u8], signature: &[u8]) -> Option<&'a TrustedPublicKey> {
        self.find(message, signature).ok()
    }

    fn find(&self, message: &[u8], signature: &[u8]) -> Result<&'a TrustedPublicKey, VerifyFailure> {
        if self.ring.is_empty() {
            return Err(VerifyFailure::NoTrustedKeys);
        }

        for key in self.ring.iter() {
            // Payload cannot fit in this key's block
            if message.len() > key.size_bytes() {
                tracing::trace!(
                    "Skipping {}-bit key for {}-byte payload",
                    key.size_bytes() * 8,
                    message.len()
                );
                continue;
            }
            // No left-padding of short signatures
            if signature.len() != key.size_bytes() {
                continue;
            }

            // Unprefixed PKCS#1 v1.5: unpad the recovered block and compare
            // the remainder with the payload in constant time
            if key
                .key()
                .verify(Pkcs1v15Sign::new_unprefixed(), message, signature)
                .is_ok()
            {
                return Ok(key);
            }
        }

        Err(VerifyFailure::NoKeyAccepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::keystore::KeyStore;

    fn ring(keys: &[&[u8]]) -> PublicKeyRing {
        let mut ring = PublicKeyRing::new();
        ring.load_pem_list(keys).unwrap();
        ring
    }

    fn ring_with_master2() -> PublicKeyRing {
        ring(&[fixtures::MASTER2_PUB])
    }

    #[test]
    fn test_verify_any_accepts_second_key() {
        let ring = ring(&[fixtures::MASTER1_PUB, fixtures::MASTER2_PUB]);
        let verifier = RawRsaVerifier::new(&ring);

        assert!(verifier.verify_any(fixtures::WHITELIST_PAYLOAD, fixtures::WHITELIST_PAYLOAD_SIG));
        let key = verifier
            .matching_key(fixtures::WHITELIST_PAYLOAD, fixtures::WHITELIST_PAYLOAD_SIG)
            .unwrap();
        assert_eq!(key, ring.iter().nth(1).unwrap());
    }

    #[test]
    fn test_verify_any_rejects() {
        let outsider = ring(&[fixtures::MASTER1_PUB]);
        let verifier = RawRsaVerifier::new(&outsider);

        // Signed by a key outside the ring
        assert!(!verifier.verify_any(fixtures::WHITELIST_PAYLOAD, fixtures::WHITELIST_PAYLOAD_SIG));

        let trusted = ring_with_master2();
        let verifier = RawRsaVerifier::new(&trusted);
        assert!(!verifier.verify_any(b"different payload", fixtures::WHITELIST_PAYLOAD_SIG));
        assert!(!verifier.verify_any(fixtures::WHITELIST_PAYLOAD, &[]));
        assert!(!verifier.verify_any(fixtures::WHITELIST_PAYLOAD, &[0u8; 256]));
    }

    #[test]
    fn test_empty_ring_rejects() {
        let ring = PublicKeyRing::new();
        let verifier = RawRsaVerifier::new(&ring);
        assert!(!verifier.verify_any(fixtures::WHITELIST_PAYLOAD, fixtures::WHITELIST_PAYLOAD_SIG));
        assert_eq!(
            verifier.find(b"x", b"y").unwrap_err(),
            VerifyFailure::NoTrustedKeys
        );
    }

    #[test]
    fn test_oversized_payload_is_skipped() {
        let ring = ring_with_master2();
        let verifier = RawRsaVerifier::new(&ring);
        let payload = vec![b'a'; 257];
        assert_eq!(
            verifier.find(&payload, fixtures::WHITELIST_PAYLOAD_SIG).unwrap_err(),
            VerifyFailure::NoKeyAccepted
        );
    }

    #[test]
    fn test_signature_must_span_the_modulus() {
        let mut keys = KeyStore::new();
        keys.load(fixtures::PUBLISHER_KEY, "").unwrap();
        let mut ring = PublicKeyRing::new();
        ring.add_key(TrustedPublicKey::new(keys.key().unwrap().public_key()));
        let verifier = RawRsaVerifier::new(&ring);

        assert_eq!(fixtures::LEADING_ZERO_SIG.len(), 256);
        assert_eq!(fixtures::LEADING_ZERO_SIG[0], 0);
        assert!(verifier.verify_any(fixtures::LEADING_ZERO_PAYLOAD, fixtures::LEADING_ZERO_SIG));

        // OpenSSL would accept the signature with its leading zero dropped,
        // this verifier requires the full modulus length
        let stripped = &fixtures::LEADING_ZERO_SIG[1..];
        assert!(!verifier.verify_any(fixtures::LEADING_ZERO_PAYLOAD, stripped));
    }

    #[test]
    fn test_digest_signature_is_not_raw() {
        // A SHA-1 DigestInfo signature recovers the DigestInfo, not the message
        let mut keys = KeyStore::new();
        keys.load(fixtures::PUBLISHER_KEY, "").unwrap();
        let mut ring = PublicKeyRing::new();
        ring.add_key(TrustedPublicKey::new(keys.key().unwrap().public_key()));

        let verifier = RawRsaVerifier::new(&ring);
        assert!(!verifier.verify_any(fixtures::MANIFEST, fixtures::MANIFEST_SIG));
    }
}
