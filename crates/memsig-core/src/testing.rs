//! In-memory backend and channel for unit tests.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::backend::ProcessBackend;
use crate::channel::MemoryChannel;
use crate::error::{MemError, Result};
use crate::types::{AccessMode, Address, MemoryRegion, ProcessId};

/// Flat memory image indexed by absolute address, with optional holes.
#[derive(Debug, Default)]
struct Image
{
    bytes: Vec<u8>,
    unreadable: Vec<Range<u64>>,
}

/// Backend serving a fixed process list and region list over one shared image.
#[derive(Debug, Clone)]
pub(crate) struct MockBackend
{
    processes: Vec<(String, u32)>,
    regions: Vec<MemoryRegion>,
    image: Rc<RefCell<Image>>,
}

impl MockBackend
{
    pub(crate) fn new(bytes: Vec<u8>) -> Self
    {
        Self {
            processes: Vec::new(),
            regions: Vec::new(),
            image: Rc::new(RefCell::new(Image {
                bytes,
                unreadable: Vec::new(),
            })),
        }
    }

    pub(crate) fn with_process(mut self, name: &str, pid: u32) -> Self
    {
        self.processes.push((name.to_string(), pid));
        self
    }

    pub(crate) fn with_regions(mut self, regions: Vec<MemoryRegion>) -> Self
    {
        self.regions = regions;
        self
    }

    pub(crate) fn with_unreadable(self, range: Range<u64>) -> Self
    {
        self.image.borrow_mut().unreadable.push(range);
        self
    }

    pub(crate) fn channel(&self, mode: AccessMode) -> MockChannel
    {
        MockChannel {
            image: Rc::clone(&self.image),
            mode,
        }
    }
}

impl ProcessBackend for MockBackend
{
    type Channel = MockChannel;

    fn find_process(&self, name: &str) -> Result<ProcessId>
    {
        if let Some((_, pid)) = self.processes.iter().find(|(candidate, _)| candidate == name) {
            return Ok(ProcessId(*pid));
        }
        self.processes
            .iter()
            .find(|(candidate, _)| candidate.starts_with(name))
            .map(|(_, pid)| ProcessId(*pid))
            .ok_or_else(|| MemError::ProcessNotFound(name.to_string()))
    }

    fn regions(&self, _pid: ProcessId) -> Result<Vec<MemoryRegion>>
    {
        Ok(self.regions.clone())
    }

    fn open_channel(&self, _pid: ProcessId, mode: AccessMode) -> Result<Self::Channel>
    {
        Ok(self.channel(mode))
    }
}

/// Channel over a [`MockBackend`] image.
#[derive(Debug)]
pub(crate) struct MockChannel
{
    image: Rc<RefCell<Image>>,
    mode: AccessMode,
}

impl MockChannel
{
    fn span(offset: Address, len: usize) -> Range<u64>
    {
        offset.value()..offset.value() + len as u64
    }
}

impl MemoryChannel for MockChannel
{
    fn mode(&self) -> AccessMode
    {
        self.mode
    }

    fn read_into(&mut self, offset: Address, buf: &mut [u8]) -> Result<()>
    {
        let image = self.image.borrow();
        let span = Self::span(offset, buf.len());
        let unreadable = image
            .unreadable
            .iter()
            .any(|hole| hole.start < span.end && span.start < hole.end);
        if unreadable || span.end > image.bytes.len() as u64 {
            return Err(MemError::Peek {
                offset,
                message: "Input/output error (os error 5)".to_string(),
            });
        }
        buf.copy_from_slice(&image.bytes[span.start as usize..span.end as usize]);
        Ok(())
    }

    fn write(&mut self, offset: Address, data: &[u8]) -> Result<()>
    {
        if !self.mode.is_writable() {
            return Err(MemError::Poke {
                offset,
                message: "channel was opened read-only".to_string(),
            });
        }
        let mut image = self.image.borrow_mut();
        let span = Self::span(offset, data.len());
        if span.end > image.bytes.len() as u64 {
            return Err(MemError::Poke {
                offset,
                message: "Input/output error (os error 5)".to_string(),
            });
        }
        image.bytes[span.start as usize..span.end as usize].copy_from_slice(data);
        Ok(())
    }
}
