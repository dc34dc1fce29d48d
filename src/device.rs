//! Fixed-1024-byte-block reader over a seekable image.
//!
//! Mirrors the original driver's `disk_block_read()`, but uses positional reads
//! (`pread`) instead of a shared `lseek`+`read` pair so that concurrent calls from
//! multiple threads never race on a file cursor (see `spec.md` §5).

use crate::error::{Error, Result};
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

pub const BLOCK_SIZE: usize = 1024;

/// Abstraction over the underlying image storage. Absolute block indices, no band
/// offset applied here -- that happens one layer up.
pub trait BlockDevice: Send + Sync {
    fn read_block(&self, abs_block_index: u32) -> Result<[u8; BLOCK_SIZE]>;

    /// Total number of `BLOCK_SIZE` blocks available in the image.
    fn block_count(&self) -> u32;
}

pub struct FileBlockDevice {
    file: File,
    block_count: u32,
}

impl FileBlockDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let block_count = (len / BLOCK_SIZE as u64) as u32;
        Ok(Self { file, block_count })
    }
}

impl BlockDevice for FileBlockDevice {
    fn read_block(&self, abs_block_index: u32) -> Result<[u8; BLOCK_SIZE]> {
        let mut buf = [0u8; BLOCK_SIZE];
        let offset = abs_block_index as u64 * BLOCK_SIZE as u64;
        self.file.read_exact_at(&mut buf, offset).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("short read at block {abs_block_index}"),
                ))
            } else {
                Error::Io(e)
            }
        })?;
        Ok(buf)
    }

    fn block_count(&self) -> u32 {
        self.block_count
    }
}

#[cfg(test)]
pub(crate) struct MemBlockDevice {
    pub data: Vec<u8>,
}

#[cfg(test)]
impl BlockDevice for MemBlockDevice {
    fn read_block(&self, abs_block_index: u32) -> Result<[u8; BLOCK_SIZE]> {
        let start = abs_block_index as usize * BLOCK_SIZE;
        let end = start + BLOCK_SIZE;
        if end > self.data.len() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "read past end of in-memory image",
            )));
        }
        let mut buf = [0u8; BLOCK_SIZE];
        buf.copy_from_slice(&self.data[start..end]);
        Ok(buf)
    }

    fn block_count(&self) -> u32 {
        (self.data.len() / BLOCK_SIZE) as u32
    }
}
