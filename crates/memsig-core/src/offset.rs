//! # Offset Chains
//!
//! A comma-separated list of signed hex offsets, e.g. `"10,-4,0x20"`, and
//! its resolution against a base address.
//!
//! Every literal is hexadecimal whether or not it carries the `0x` prefix, so
//! `"10"` is sixteen.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::channel::MemoryChannel;
use crate::error::{MemError, Result};
use crate::types::Address;

/// A parsed offset chain
///
/// ## Example
///
/// ```rust
/// use memsig_core::offset::OffsetChain;
///
/// let chain: OffsetChain = "10,-4,0x20".parse()?;
/// assert_eq!(chain.offsets(), &[16, -4, 32]);
/// # Ok::<(), memsig_core::error::MemError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OffsetChain
{
    offsets: SmallVec<[i32; 4]>,
}

impl OffsetChain
{
    /// Marks "no offset"; a chain starting with it resolves to the base unchanged.
    pub const INVALID: i32 = i32::MIN;

    /// Empty chain
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Parse a comma-separated chain
    ///
    /// Each token is an optional `-`, an optional `0x`/`0X`, then one or more
    /// hex digits. The empty string is the empty chain.
    ///
    /// ## Errors
    ///
    /// - `Parse`: a token is empty, has a stray sign, a non-hex digit, or does
    ///   not fit in an `i32`. The error cites the token.
    pub fn parse(input: &str) -> Result<Self>
    {
        if input.is_empty() {
            return Ok(Self::new());
        }
        input.split(',').map(parse_offset).collect::<Result<SmallVec<_>>>().map(|offsets| Self { offsets })
    }

    /// Offsets in order
    pub fn offsets(&self) -> &[i32]
    {
        &self.offsets
    }

    pub fn len(&self) -> usize
    {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.offsets.is_empty()
    }

    /// Append an offset
    pub fn push(&mut self, offset: i32)
    {
        self.offsets.push(offset);
    }

    /// Resolve this chain from `base`; see [`resolve`]
    ///
    /// ## Errors
    ///
    /// - `Peek`: the pointer dereference failed
    pub fn resolve<C: MemoryChannel>(&self, channel: &mut C, base: Address) -> Result<Address>
    {
        resolve(channel, base, self)
    }
}

impl From<i32> for OffsetChain
{
    fn from(offset: i32) -> Self
    {
        let mut offsets = SmallVec::new();
        offsets.push(offset);
        Self { offsets }
    }
}

impl FromIterator<i32> for OffsetChain
{
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self
    {
        Self {
            offsets: iter.into_iter().collect(),
        }
    }
}

impl FromStr for OffsetChain
{
    type Err = MemError;

    fn from_str(s: &str) -> Result<Self>
    {
        Self::parse(s)
    }
}

impl fmt::Display for OffsetChain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for (i, offset) in self.offsets.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if *offset < 0 {
                write!(f, "-0x{:X}", offset.unsigned_abs())?;
            } else {
                write!(f, "0x{offset:X}")?;
            }
        }
        Ok(())
    }
}

fn parse_offset(token: &str) -> Result<i32>
{
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(MemError::parse(token, "expected a hex offset"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MemError::parse(token, "offsets are hex digits with an optional '-' and '0x'"));
    }

    let magnitude =
        i32::from_str_radix(digits, 16).map_err(|err| MemError::parse(token, format!("offset out of range: {err}")))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Resolve `chain` against `base`
///
/// Applies at most two steps:
///
/// 1. If the first offset is not [`OffsetChain::INVALID`], add it to `base`.
/// 2. If that happened and the chain has a second entry, replace `base` with
///    the 8-byte pointer stored at the new `base`.
///
/// The value of the second entry, and any later entries, are not used.
///
/// ## Errors
///
/// - `Peek`: the pointer dereference failed
pub fn resolve<C: MemoryChannel>(channel: &mut C, base: Address, chain: &OffsetChain) -> Result<Address>
{
    let Some(&first) = chain.offsets().first() else {
        return Ok(base);
    };
    if first == OffsetChain::INVALID {
        return Ok(base);
    }

    let base = base.offset(i64::from(first));
    if chain.len() < 2 {
        return Ok(base);
    }
    channel.read_u64(base).map(Address::new)
}
