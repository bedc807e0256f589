//! Splitting of documents with an appended raw signature.
//!
//! Whitelists carry their signature after the signed text:
//!
//! ```text
//! <header>
//! <plaintext>\n<raw signature bytes ...>
//! ```
//!
//! The caller passes the length of any header to skip. The first line feed
//! after it ends the plaintext, and everything after that line feed is the
//! signature. The signature is binary and may itself contain line feeds.

use crate::error::ParseError;

const LINE_FEED: u8 = b'\n';

/// Plaintext and signature borrowed from a signed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureTail<'a> {
    /// Bytes between the skipped header and the line feed
    pub plaintext: &'a [u8],
    /// Bytes after the line feed, never empty
    pub signature: &'a [u8],
}

/// Split `buffer` into plaintext and signature, searching from `skip_bytes`
pub fn split(buffer: &[u8], skip_bytes: usize) -> Result<SignatureTail<'_>, ParseError> {
    let searched = buffer.get(skip_bytes..).ok_or(ParseError::MalformedTail)?;
    let newline = searched
        .iter()
        .position(|&b| b == LINE_FEED)
        .ok_or(ParseError::MalformedTail)?;

    let (plaintext, rest) = searched.split_at(newline);
    let signature = &rest[1..];
    if signature.is_empty() {
        return Err(ParseError::MalformedTail);
    }

    Ok(SignatureTail {
        plaintext,
        signature,
    })
}
