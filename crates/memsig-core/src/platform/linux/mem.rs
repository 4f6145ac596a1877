//! Memory channel over `/proc/<pid>/mem`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::channel::MemoryChannel;
use crate::error::{MemError, Result};
use crate::types::{AccessMode, Address};

/// Channel backed by an open `mem` file
///
/// The file is opened read-only for [`AccessMode::Peek`] and read-write for
/// [`AccessMode::Poke`]. It is closed when the channel is dropped.
#[derive(Debug)]
pub struct ProcMemChannel
{
    file: File,
    mode: AccessMode,
    path: PathBuf,
}

impl ProcMemChannel
{
    /// Open `path` in the given mode
    ///
    /// ## Errors
    ///
    /// - `ChannelOpen`: the file could not be opened (usually `EACCES` or `ENOENT`)
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> Result<Self>
    {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(mode.is_writable())
            .open(&path)
            .map_err(|source| MemError::ChannelOpen {
                path: path.clone(),
                mode,
                source,
            })?;
        trace!(path = %path.display(), %mode, "opened memory channel");
        Ok(Self { file, mode, path })
    }

    /// Path of the underlying memory file
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    fn seek(&mut self, offset: Address) -> std::io::Result<()>
    {
        self.file.seek(SeekFrom::Start(offset.value())).map(|_| ())
    }
}

impl MemoryChannel for ProcMemChannel
{
    fn mode(&self) -> AccessMode
    {
        self.mode
    }

    fn read_into(&mut self, offset: Address, buf: &mut [u8]) -> Result<()>
    {
        let peek_error = |err: std::io::Error| MemError::Peek {
            offset,
            message: err.to_string(),
        };
        self.seek(offset).map_err(peek_error)?;
        self.file.read_exact(buf).map_err(peek_error)
    }

    fn write(&mut self, offset: Address, data: &[u8]) -> Result<()>
    {
        let poke_error = |err: std::io::Error| MemError::Poke {
            offset,
            message: err.to_string(),
        };
        if !self.mode.is_writable() {
            return Err(MemError::Poke {
                offset,
                message: "channel was opened read-only".to_string(),
            });
        }
        self.seek(offset).map_err(poke_error)?;
        self.file.write_all(data).map_err(poke_error)
    }
}
