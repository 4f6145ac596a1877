//! # Process Context
//!
//! A located process plus the named segments of its main image.
//!
//! Attaching resolves a process ID by name and then classifies the
//! process's regions into three named segments:
//!
//! - **code**: the executable section of the main image
//! - **read-only data**: the section that follows it
//! - **read-write data**: the section after that
//!
//! Classification is a best-effort heuristic over the loader's layout, not a
//! symbol-table lookup. It is exposed as a [`SegmentStrategy`] so callers
//! (and tests) can substitute their own.

use tracing::debug;

use crate::backend::ProcessBackend;
use crate::error::{MemError, Result};
use crate::types::{AccessMode, MemoryRegion, ProcessId};

/// Segments located by a [`SegmentStrategy`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Segments
{
    /// Readable and executable section of the main image
    pub code: Option<MemoryRegion>,
    /// Readable section following the code
    pub rodata: Option<MemoryRegion>,
    /// Readable and writable section following the read-only data
    pub data: Option<MemoryRegion>,
}

/// Strategy that picks the named segments out of an enumerated region list
///
/// Receives the image name the process was attached by and the regions in
/// enumeration order.
pub type SegmentStrategy = fn(image_name: &str, regions: &[MemoryRegion]) -> Segments;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutState
{
    SeekingImage,
    Code,
    ReadOnlyData,
    Data,
}

/// Default [`SegmentStrategy`]: assume the loader maps the image as
/// header, code, read-only data, read-write data
///
/// Walks the regions in order:
///
/// 1. Skip until a file-backed region whose name starts with `image_name`.
/// 2. The next region is the code segment if it is readable and executable.
/// 3. The next region is the read-only data segment if it is readable.
/// 4. The next region is the read-write data segment if it is readable and
///    writable. The walk stops here.
///
/// Each step advances whether or not its region qualified.
///
/// ## Example
///
/// ```rust
/// use memsig_core::process::loader_layout_segments;
/// use memsig_core::types::{Address, MemoryRegion, RegionFlags};
///
/// let r = RegionFlags::READ;
/// let region = |start: u64, flags| MemoryRegion::new(Address::new(start), Address::new(start + 0x1000), flags);
/// let regions = vec![
///     region(0x1000, r).with_file("game.exe"),
///     region(0x2000, r | RegionFlags::EXECUTE).with_file("game.exe"),
///     region(0x3000, r).with_file("game.exe"),
///     region(0x4000, r | RegionFlags::WRITE).with_file("game.exe"),
/// ];
///
/// let segments = loader_layout_segments("game.exe", &regions);
/// assert_eq!(segments.code.unwrap().start, Address::new(0x2000));
/// assert_eq!(segments.rodata.unwrap().start, Address::new(0x3000));
/// assert_eq!(segments.data.unwrap().start, Address::new(0x4000));
/// ```
pub fn loader_layout_segments(image_name: &str, regions: &[MemoryRegion]) -> Segments
{
    let mut segments = Segments::default();
    let mut state = LayoutState::SeekingImage;

    for region in regions {
        match state {
            LayoutState::SeekingImage => {
                if region.mapped && region.filename.starts_with(image_name) {
                    state = LayoutState::Code;
                }
            }
            LayoutState::Code => {
                if region.is_readable() && region.is_executable() {
                    segments.code = Some(region.clone());
                }
                state = LayoutState::ReadOnlyData;
            }
            LayoutState::ReadOnlyData => {
                if region.is_readable() {
                    segments.rodata = Some(region.clone());
                }
                state = LayoutState::Data;
            }
            LayoutState::Data => {
                if region.is_readable() && region.is_writable() {
                    segments.data = Some(region.clone());
                }
                break;
            }
        }
    }

    segments
}

/// A located process with its classified segments
///
/// The code and read-write data segments are guaranteed to be resolved (with
/// a non-null start) once construction succeeds; the read-only data segment
/// may be absent.
///
/// ## Example
///
/// ```rust,no_run
/// use memsig_core::backend::create_backend;
/// use memsig_core::process::ProcessContext;
/// use memsig_core::types::AccessMode;
///
/// let process = ProcessContext::attach(create_backend()?, "game.exe")?;
/// println!("pid {} code at {}", process.pid(), process.code().start);
/// let channel = process.open_channel(AccessMode::Peek)?;
/// # drop(channel);
/// # Ok::<(), memsig_core::error::MemError>(())
/// ```
#[derive(Debug)]
pub struct ProcessContext<B: ProcessBackend>
{
    backend: B,
    name: String,
    pid: ProcessId,
    code: MemoryRegion,
    rodata: Option<MemoryRegion>,
    data: MemoryRegion,
}

impl<B: ProcessBackend> ProcessContext<B>
{
    /// Locate `name` and classify its segments with [`loader_layout_segments`]
    ///
    /// ## Errors
    ///
    /// - `ProcessNotFound`: no process matched `name`
    /// - `Process`: the code or read-write data segment could not be located
    /// - `Io`: the region list could not be read
    pub fn attach(backend: B, name: &str) -> Result<Self>
    {
        Self::attach_with(backend, name, loader_layout_segments)
    }

    /// Locate `name` and classify its segments with a custom strategy
    ///
    /// ## Errors
    ///
    /// Same as [`attach`](Self::attach).
    pub fn attach_with(backend: B, name: &str, strategy: SegmentStrategy) -> Result<Self>
    {
        let pid = backend.find_process(name)?;
        Self::from_pid(backend, pid, name, strategy)
    }

    /// Build a context for an already known process ID
    ///
    /// `image_name` is the name the strategy uses to find the main image.
    ///
    /// ## Errors
    ///
    /// - `Process`: the code or read-write data segment could not be located
    /// - `Io`: the region list could not be read
    pub fn from_pid(backend: B, pid: ProcessId, image_name: &str, strategy: SegmentStrategy) -> Result<Self>
    {
        let regions = backend.regions(pid)?;
        let segments = strategy(image_name, &regions);

        let resolved = |segment: Option<MemoryRegion>| segment.filter(|region| !region.start.is_null());

        let code = resolved(segments.code)
            .ok_or_else(|| MemError::Process("Could not locate .text section in memory".to_string()))?;
        let data = resolved(segments.data)
            .ok_or_else(|| MemError::Process("Could not locate .data section in memory".to_string()))?;
        let rodata = resolved(segments.rodata);

        debug!(
            %pid,
            image_name,
            code = %code.start,
            rodata = ?rodata.as_ref().map(|region| region.start.value()),
            data = %data.start,
            "classified image segments"
        );

        Ok(Self {
            backend,
            name: image_name.to_string(),
            pid,
            code,
            rodata,
            data,
        })
    }

    /// Process ID
    pub fn pid(&self) -> ProcessId
    {
        self.pid
    }

    /// Name the process was attached by
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Backend this context reads through
    pub fn backend(&self) -> &B
    {
        &self.backend
    }

    /// Code segment of the main image
    pub fn code(&self) -> &MemoryRegion
    {
        &self.code
    }

    /// Read-only data segment of the main image, if one was found
    pub fn rodata(&self) -> Option<&MemoryRegion>
    {
        self.rodata.as_ref()
    }

    /// Read-write data segment of the main image
    pub fn data(&self) -> &MemoryRegion
    {
        &self.data
    }

    /// Enumerate the process's regions afresh
    ///
    /// ## Errors
    ///
    /// Propagates the backend's enumeration failure.
    pub fn regions(&self) -> Result<Vec<MemoryRegion>>
    {
        self.backend.regions(self.pid)
    }

    /// Open a memory channel into the process
    ///
    /// ## Errors
    ///
    /// - `ChannelOpen`: the OS refused the handle
    pub fn open_channel(&self, mode: AccessMode) -> Result<B::Channel>
    {
        self.backend.open_channel(self.pid, mode)
    }
}
