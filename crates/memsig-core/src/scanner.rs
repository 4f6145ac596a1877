//! # Signature Scanner
//!
//! Streams selected regions of a process through a bounded buffer and
//! reports every address where a [`Signature`] matches.
//!
//! ## Streaming
//!
//! Regions are read in chunks of at most [`ScanOptions::chunk_size`] bytes.
//! Every chunk after the first in a region carries the last
//! `signature.len()` bytes of the previous chunk at its head, so a match
//! straddling a chunk boundary is reported exactly as it would be in one
//! contiguous buffer. New bytes are matched from just after that prefix;
//! the prefix is only revisited when the matcher backtracks.
//!
//! A chunk that cannot be read (for example `[vvar]`, which other processes
//! cannot read) is skipped and the scan continues with the next chunk. The
//! carried prefix and any partial match are dropped at such a hole.
//!
//! ## Matching
//!
//! A single counter tracks how many signature bytes have matched so far. On
//! a mismatch the scan index is rewound by that count and matching restarts
//! one byte after the attempted start. On a full match the start address is
//! recorded and the counter resets, so reported matches never overlap.
//!
//! This naive backtracking costs `O(n * m)` in the worst case (long runs of
//! a repeating prefix); signatures are capped below
//! [`MAX_SIGNATURE_LEN`](crate::signature::MAX_SIGNATURE_LEN) bytes.
//!
//! ## Ordering
//!
//! Results are ascending within a region, and regions are visited in
//! enumeration order. There is no global sort.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::backend::ProcessBackend;
use crate::channel::MemoryChannel;
use crate::error::{MemError, Result};
use crate::process::ProcessContext;
use crate::signature::Signature;
use crate::types::{Address, MemoryRegion, RegionFlags};

/// Default chunk size for streaming region contents.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Which regions a scan visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode
{
    /// Regions having at least one of the flags (an empty set accepts every region)
    AnyOf(RegionFlags),
    /// Regions having every one of the flags
    AllOf(RegionFlags),
    /// Only the process's code segment
    Code,
    /// Only the process's read-only data segment (nothing if it was not located)
    ReadOnlyData,
    /// Only the process's read-write data segment
    Data,
}

impl Default for SearchMode
{
    fn default() -> Self
    {
        SearchMode::AnyOf(RegionFlags::all())
    }
}

impl SearchMode
{
    /// Whether `region` is visited under this mode
    ///
    /// The segment modes ignore permissions and select the single region whose
    /// start equals the process's resolved segment start.
    pub fn selects<B: ProcessBackend>(&self, region: &MemoryRegion, process: &ProcessContext<B>) -> bool
    {
        match self {
            SearchMode::AnyOf(flags) => flags.is_empty() || region.flags.intersects(*flags),
            SearchMode::AllOf(flags) => region.flags.contains(*flags),
            SearchMode::Code => region.start == process.code().start,
            SearchMode::ReadOnlyData => process.rodata().is_some_and(|rodata| region.start == rodata.start),
            SearchMode::Data => region.start == process.data().start,
        }
    }
}

impl FromStr for SearchMode
{
    type Err = MemError;

    /// Parse `any`, `any:<rwx>`, `all:<rwx>`, `code`/`text`, `rodata`/`rdata`, or `data`.
    fn from_str(s: &str) -> Result<Self>
    {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "any" => return Ok(SearchMode::default()),
            "code" | "text" => return Ok(SearchMode::Code),
            "rodata" | "rdata" => return Ok(SearchMode::ReadOnlyData),
            "data" => return Ok(SearchMode::Data),
            _ => {}
        }

        let (kind, perms) = lowered
            .split_once(':')
            .ok_or_else(|| MemError::parse(s, "expected any, any:<rwx>, all:<rwx>, code, rodata or data"))?;
        let mut flags = RegionFlags::empty();
        for c in perms.chars() {
            flags |= match c {
                'r' => RegionFlags::READ,
                'w' => RegionFlags::WRITE,
                'x' => RegionFlags::EXECUTE,
                '-' => RegionFlags::empty(),
                _ => return Err(MemError::parse(s, format!("unknown permission '{c}'"))),
            };
        }
        match kind {
            "any" => Ok(SearchMode::AnyOf(flags)),
            "all" => Ok(SearchMode::AllOf(flags)),
            _ => Err(MemError::parse(s, format!("unknown region filter '{kind}'"))),
        }
    }
}

impl fmt::Display for SearchMode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let letters = |flags: RegionFlags| flags.to_string().replace('-', "");
        match self {
            SearchMode::AnyOf(flags) => write!(f, "any:{}", letters(*flags)),
            SearchMode::AllOf(flags) => write!(f, "all:{}", letters(*flags)),
            SearchMode::Code => f.write_str("code"),
            SearchMode::ReadOnlyData => f.write_str("rodata"),
            SearchMode::Data => f.write_str("data"),
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions
{
    /// Capacity of the streaming buffer, carried prefix included
    ///
    /// Must be larger than the signature being scanned for.
    pub chunk_size: usize,
}

impl Default for ScanOptions
{
    fn default() -> Self
    {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Per-scan counters, reported at debug level.
#[derive(Debug, Default, Clone, Copy)]
struct ScanStats
{
    regions: usize,
    bytes: u64,
    skipped_chunks: usize,
}

/// Streaming signature scanner
///
/// ## Example
///
/// ```rust,no_run
/// use memsig_core::backend::create_backend;
/// use memsig_core::process::ProcessContext;
/// use memsig_core::scanner::{Scanner, SearchMode};
/// use memsig_core::signature::Signature;
/// use memsig_core::types::AccessMode;
///
/// let process = ProcessContext::attach(create_backend()?, "game.exe")?;
/// let mut peek = process.open_channel(AccessMode::Peek)?;
/// let signature: Signature = "F6 47 3B 02 ?? 3E 8D 83 83 C1 FF FF".parse()?;
///
/// for address in Scanner::new().scan(&process, &mut peek, &signature, SearchMode::Code)? {
///     println!("match at {address}");
/// }
/// # Ok::<(), memsig_core::error::MemError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct Scanner
{
    options: ScanOptions,
}

impl Scanner
{
    /// Scanner with the default 8 KiB buffer
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Scanner with explicit options
    pub fn with_options(options: ScanOptions) -> Self
    {
        Self { options }
    }

    /// Options this scanner runs with
    pub fn options(&self) -> ScanOptions
    {
        self.options
    }

    /// Find every match of `signature` in the regions of `process` selected by `mode`
    ///
    /// ## Errors
    ///
    /// - `Logic`: the chunk size is not larger than the signature
    /// - Region enumeration failures from the backend
    ///
    /// Unreadable chunks are not errors; they are skipped.
    pub fn scan<B, C>(
        &self,
        process: &ProcessContext<B>,
        channel: &mut C,
        signature: &Signature,
        mode: SearchMode,
    ) -> Result<Vec<Address>>
    where
        B: ProcessBackend,
        C: MemoryChannel,
    {
        let regions = process.regions()?;
        let selected = regions.iter().filter(|region| mode.selects(region, process));
        debug!(pid = %process.pid(), %mode, signature = %signature, "scanning process memory");
        self.scan_regions(channel, selected, signature)
    }

    /// Find every match of `signature` in the given regions, in order
    ///
    /// ## Errors
    ///
    /// - `Logic`: the chunk size is not larger than the signature
    pub fn scan_regions<'r, C, I>(&self, channel: &mut C, regions: I, signature: &Signature) -> Result<Vec<Address>>
    where
        C: MemoryChannel,
        I: IntoIterator<Item = &'r MemoryRegion>,
    {
        if self.options.chunk_size <= signature.len() {
            return Err(MemError::Logic(format!(
                "Scan chunk size {} must be larger than the signature ({} bytes)",
                self.options.chunk_size,
                signature.len()
            )));
        }

        let mut buf = vec![0u8; self.options.chunk_size];
        let mut matches = Vec::new();
        let mut stats = ScanStats::default();

        for region in regions {
            self.scan_region(channel, region, signature, &mut buf, &mut matches, &mut stats);
        }

        debug!(
            regions = stats.regions,
            bytes = stats.bytes,
            skipped_chunks = stats.skipped_chunks,
            matches = matches.len(),
            "scan finished"
        );
        Ok(matches)
    }

    fn scan_region<C: MemoryChannel>(
        &self,
        channel: &mut C,
        region: &MemoryRegion,
        signature: &Signature,
        buf: &mut [u8],
        matches: &mut Vec<Address>,
        stats: &mut ScanStats,
    )
    {
        trace!(start = %region.start, end = %region.end, flags = %region.flags, file = %region.filename, "scanning region");
        stats.regions += 1;

        let last = signature.len() - 1;
        let end = region.end.value();
        let mut addr = region.start.value();
        // Bytes at the head of `buf` carried over from the previous chunk.
        let mut carried = 0usize;
        let mut matched = 0usize;

        while addr < end {
            let remaining = usize::try_from(end - addr).unwrap_or(usize::MAX);
            let fresh = (buf.len() - carried).min(remaining);
            let filled = carried + fresh;

            if let Err(err) = channel.read_into(Address::new(addr), &mut buf[carried..filled]) {
                debug!(address = %Address::new(addr), len = fresh, error = %err, "skipping unreadable chunk");
                stats.skipped_chunks += 1;
                carried = 0;
                matched = 0;
                addr += fresh as u64;
                continue;
            }
            stats.bytes += fresh as u64;

            // Absolute address of buf[0].
            let base = addr - carried as u64;
            let mut i = carried;
            while i < filled {
                if signature.matches_at(matched, buf[i]) {
                    if matched == last {
                        matches.push(Address::new(base + (i - matched) as u64));
                        matched = 0;
                    } else {
                        matched += 1;
                    }
                } else {
                    i -= matched;
                    matched = 0;
                }
                i += 1;
            }

            carried = signature.len().min(filled);
            buf.copy_within(filled - carried..filled, 0);
            addr += fresh as u64;
        }
    }
}

/// Decode `pattern` and scan `process` with a default [`Scanner`]
///
/// ## Errors
///
/// - `Parse`/`Logic`: the pattern is malformed, empty, or too long
/// - Anything [`Scanner::scan`] returns
pub fn find_signature<B, C>(
    process: &ProcessContext<B>,
    channel: &mut C,
    pattern: &str,
    mode: SearchMode,
) -> Result<Vec<Address>>
where
    B: ProcessBackend,
    C: MemoryChannel,
{
    let signature = Signature::parse(pattern)?;
    Scanner::new().scan(process, channel, &signature, mode)
}
