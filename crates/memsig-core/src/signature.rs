//! # Signatures
//!
//! Byte patterns with per-nibble wildcards.
//!
//! A pattern is a whitespace-separated list of tokens, one per byte. Each
//! token has one or two characters, each a hex digit or `?`:
//!
//! | Token | Byte   | Mask   | Matches                                 |
//! |-------|--------|--------|-----------------------------------------|
//! | `4F`  | `0x4F` | `0xFF` | exactly `0x4F`                          |
//! | `?3`  | `0x03` | `0x0F` | any byte whose low nibble is 3          |
//! | `A?`  | `0xA0` | `0xF0` | any byte whose high nibble is A         |
//! | `??`  | `0x00` | `0x00` | any byte                                |
//! | `7`   | `0x07` | `0xFF` | exactly `0x07`                          |
//! | `?`   | `0x00` | `0xF0` | any byte whose high nibble is 0         |
//!
//! A lone `?` is *not* a full wildcard: it keeps the high nibble fixed at 0
//! and frees only the low nibble. Existing patterns depend on this, so it is
//! kept as-is; write `??` for "any byte".

use std::fmt;
use std::str::FromStr;

use crate::error::{MemError, Result};

/// Signatures must be shorter than this many bytes.
pub const MAX_SIGNATURE_LEN: usize = 4096;

/// A decoded signature: parallel expected-value and mask arrays
///
/// A byte `b` at position `i` matches when `b & mask[i] == bytes[i]`.
///
/// ## Example
///
/// ```rust
/// use memsig_core::signature::Signature;
///
/// let sig: Signature = "F6 47 3B 02 ?? 3E".parse()?;
/// assert_eq!(sig.len(), 6);
/// assert_eq!(sig.bytes()[4], 0x00);
/// assert_eq!(sig.mask()[4], 0x00);
/// assert!(sig.matches(&[0xF6, 0x47, 0x3B, 0x02, 0x74, 0x3E]));
/// # Ok::<(), memsig_core::error::MemError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature
{
    bytes: Vec<u8>,
    mask: Vec<u8>,
}

impl Signature
{
    /// Decode a textual pattern
    ///
    /// ## Errors
    ///
    /// - `Parse`: a token is longer than two characters or contains a
    ///   character other than a hex digit or `?`
    /// - `Logic`: the pattern is empty, or decodes to [`MAX_SIGNATURE_LEN`]
    ///   bytes or more
    pub fn parse(pattern: &str) -> Result<Self>
    {
        let tokens = pattern.split_whitespace();
        let capacity = tokens.clone().count();
        let mut bytes = Vec::with_capacity(capacity);
        let mut mask = Vec::with_capacity(capacity);

        for token in tokens {
            let (byte, bits) = decode_token(token)?;
            bytes.push(byte);
            mask.push(bits);
        }

        Self::from_parts(bytes, mask)
    }

    /// Build a signature from already decoded arrays
    ///
    /// Expected bytes are normalised with `bytes[i] & mask[i]` so that
    /// masked-out bits never prevent a match.
    ///
    /// ## Errors
    ///
    /// - `Logic`: the arrays differ in length, are empty, or are
    ///   [`MAX_SIGNATURE_LEN`] bytes or longer
    pub fn from_parts(bytes: Vec<u8>, mask: Vec<u8>) -> Result<Self>
    {
        if bytes.len() != mask.len() {
            return Err(MemError::Logic(format!(
                "Signature bytes and mask differ in length ({} != {})",
                bytes.len(),
                mask.len()
            )));
        }
        if bytes.is_empty() {
            return Err(MemError::Logic("Signature pattern is empty".to_string()));
        }
        if bytes.len() >= MAX_SIGNATURE_LEN {
            return Err(MemError::Logic(format!(
                "Signature cannot be longer than {MAX_SIGNATURE_LEN} bytes (got {})",
                bytes.len()
            )));
        }

        let bytes = bytes.iter().zip(&mask).map(|(byte, bits)| byte & bits).collect();
        Ok(Self { bytes, mask })
    }

    /// Build an exact-match signature (every mask byte `0xFF`)
    ///
    /// ## Errors
    ///
    /// Same length rules as [`from_parts`](Self::from_parts).
    pub fn exact(bytes: &[u8]) -> Result<Self>
    {
        Self::from_parts(bytes.to_vec(), vec![0xFF; bytes.len()])
    }

    /// Number of bytes the signature spans
    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    /// Always `false`: empty signatures are rejected at construction
    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }

    /// Expected byte values (masked)
    pub fn bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// Per-byte masks of the bits that must match
    pub fn mask(&self) -> &[u8]
    {
        &self.mask
    }

    /// Whether `byte` matches position `index`
    #[inline]
    pub fn matches_at(&self, index: usize, byte: u8) -> bool
    {
        byte & self.mask[index] == self.bytes[index]
    }

    /// Whether `data` starts with a match for the whole signature
    pub fn matches(&self, data: &[u8]) -> bool
    {
        data.len() >= self.len() && data.iter().enumerate().take(self.len()).all(|(i, &b)| self.matches_at(i, b))
    }
}

impl FromStr for Signature
{
    type Err = MemError;

    fn from_str(s: &str) -> Result<Self>
    {
        Signature::parse(s)
    }
}

impl fmt::Display for Signature
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for (i, (&byte, &mask)) in self.bytes.iter().zip(&self.mask).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let high = if mask & 0xF0 == 0xF0 { hex_digit(byte >> 4) } else { '?' };
            let low = if mask & 0x0F == 0x0F { hex_digit(byte & 0x0F) } else { '?' };
            write!(f, "{high}{low}")?;
        }
        Ok(())
    }
}

/// Decode one token into `(byte, mask)`.
fn decode_token(token: &str) -> Result<(u8, u8)>
{
    let chars: Vec<char> = token.chars().collect();
    let (high, low) = match chars.as_slice() {
        // A lone `?` keeps its high nibble fixed at zero.
        ['?'] => ('0', '?'),
        [c] => ('0', *c),
        [c1, c2] => (*c1, *c2),
        _ => {
            return Err(MemError::parse(token, "signature tokens are one or two characters"));
        }
    };

    let mut byte = 0u8;
    let mut mask = 0xFFu8;

    match nibble(high, token)? {
        Some(value) => byte |= value << 4,
        None => mask &= 0x0F,
    }
    match nibble(low, token)? {
        Some(value) => byte |= value,
        None => mask &= 0xF0,
    }

    Ok((byte, mask))
}

/// `Some(value)` for a hex digit, `None` for a wildcard.
fn nibble(c: char, token: &str) -> Result<Option<u8>>
{
    if c == '?' {
        return Ok(None);
    }
    c.to_digit(16)
        .and_then(|value| u8::try_from(value).ok())
        .map(Some)
        .ok_or_else(|| MemError::parse(token, format!("'{c}' is not a hex digit or '?'")))
}

fn hex_digit(value: u8) -> char
{
    char::from_digit(u32::from(value & 0x0F), 16).map_or('0', |c| c.to_ascii_uppercase())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::ErrorKind;

    fn single(token: &str) -> (u8, u8)
    {
        let sig = Signature::parse(token).unwrap();
        (sig.bytes()[0], sig.mask()[0])
    }

    #[test]
    fn test_token_table()
    {
        assert_eq!(single("00"), (0x00, 0xFF));
        assert_eq!(single("?3"), (0x03, 0x0F));
        assert_eq!(single("A?"), (0xA0, 0xF0));
        assert_eq!(single("??"), (0x00, 0x00));
        assert_eq!(single("?"), (0x00, 0xF0));
        assert_eq!(single("7"), (0x07, 0xFF));
        assert_eq!(single("ff"), (0xFF, 0xFF));
    }

    #[test]
    fn test_lone_question_mark_fixes_high_nibble()
    {
        let sig = Signature::parse("?").unwrap();
        assert!(sig.matches(&[0x00]));
        assert!(sig.matches(&[0x0F]));
        assert!(!sig.matches(&[0x10]));
        assert!(!sig.matches(&[0xF0]));
    }

    #[test]
    fn test_mixed_whitespace()
    {
        let sig = Signature::parse("  F6\t47\n3B  02 ").unwrap();
        assert_eq!(sig.bytes(), &[0xF6, 0x47, 0x3B, 0x02]);
        assert_eq!(sig.mask(), &[0xFF; 4]);
    }

    #[test]
    fn test_malformed_tokens()
    {
        let err = Signature::parse("F6 4G").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("4G"));

        let err = Signature::parse("F6 123").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_length_limits()
    {
        assert_eq!(Signature::parse("").unwrap_err().kind(), ErrorKind::Logic);
        assert_eq!(Signature::parse("   ").unwrap_err().kind(), ErrorKind::Logic);

        let longest = vec!["??"; MAX_SIGNATURE_LEN - 1].join(" ");
        assert_eq!(Signature::parse(&longest).unwrap().len(), MAX_SIGNATURE_LEN - 1);

        let too_long = vec!["??"; MAX_SIGNATURE_LEN].join(" ");
        assert_eq!(Signature::parse(&too_long).unwrap_err().kind(), ErrorKind::Logic);
    }

    #[test]
    fn test_from_parts_normalises_bytes()
    {
        let sig = Signature::from_parts(vec![0xAB], vec![0xF0]).unwrap();
        assert_eq!(sig.bytes(), &[0xA0]);
        assert!(Signature::from_parts(vec![0x00, 0x01], vec![0xFF]).is_err());
    }

    #[test]
    fn test_display()
    {
        let sig = Signature::parse("F6 ?3 a? ?? 7 ?").unwrap();
        assert_eq!(sig.to_string(), "F6 ?3 A? ?? 07 0?");
    }
}
