//! Trust establishment for signed repository metadata
//!
//! [`TrustContext`] owns the material a repository client or publisher works
//! with: an optional private key, the publisher certificate, and a keyring of
//! trusted master public keys. It signs and verifies manifests, verifies
//! whitelists carrying an appended raw signature, and reports who the loaded
//! certificate belongs to.
//!
//! ```no_run
//! use keytrust::{TrustConfig, TrustContext};
//!
//! let config = TrustConfig::default()
//!     .with_certificate("/srv/repo/publisher.crt")
//!     .with_public_keys("/etc/keytrust/keys/master.pub");
//! let trust = TrustContext::from_config(&config, "")?;
//! # let (manifest, signature) = (b"", b"");
//! if trust.verify(manifest, signature) {
//!     println!("{}", trust.describe());
//! }
//! # Ok::<(), keytrust::Error>(())
//! ```

pub mod config;
pub mod context;
pub mod error;

// Re-export the primitives crate
pub use keytrust_crypto as crypto;

pub use config::{TrustConfig, DEFAULT_PUBLIC_KEY_PATH};
pub use context::TrustContext;
pub use error::{Error, Result};
pub use keytrust_crypto::{Fingerprint, Signature, NO_CERTIFICATE};
