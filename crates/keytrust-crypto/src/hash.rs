//! Hashing utilities using aws-lc-rs

use aws_lc_rs::digest::{self, SHA1_FOR_LEGACY_USE_ONLY};

/// Length of a SHA-1 digest in bytes
pub const SHA1_LEN: usize = 20;

/// Hash data using SHA-1
///
/// SHA-1 is what published manifests and certificate fingerprints are built
/// on, so it stays here even though it is unsuitable for anything new.
pub fn sha1(data: &[u8]) -> [u8; SHA1_LEN] {
    let digest = digest::digest(&SHA1_FOR_LEGACY_USE_ONLY, data);
    let mut result = [0u8; SHA1_LEN];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Certificate fingerprint in OpenSSL notation (`01:AB:...`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the SHA-1 fingerprint of DER-encoded data
    pub fn of_der(der: &[u8]) -> Self {
        let groups: Vec<String> = sha1(der).iter().map(|b| format!("{:02X}", b)).collect();
        Self(groups.join(":"))
    }

    /// The fingerprint used when no certificate is loaded
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Get the fingerprint string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty fingerprint
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1() {
        let hash = sha1(b"hello");

        // Known SHA-1 hash of "hello"
        let expected = hex::decode("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d").unwrap();
        assert_eq!(&hash[..], &expected[..]);
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = Fingerprint::of_der(b"hello");
        assert_eq!(
            fp.as_str(),
            "AA:F4:C6:1D:DC:C5:E8:A2:DA:BE:DE:0F:3B:48:2C:D9:AE:A9:43:4D"
        );
        assert_eq!(fp.as_str().len(), 59);
        assert_eq!(fp.as_str().split(':').count(), SHA1_LEN);
    }

    #[test]
    fn test_empty_fingerprint() {
        assert!(Fingerprint::empty().is_empty());
        assert_eq!(Fingerprint::default().to_string(), "");
    }
}
