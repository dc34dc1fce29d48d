//! Error type shared by every fallible operation in the crate.
//!
//! The original `lmfuse.c` driver returns raw negative `errno` values
//! (`-EINVAL`, `-EIO`, `-ENOENT`, ...) from each FUSE callback. This crate
//! threads a single typed [`Error`] through instead, and exposes [`Error::errno`]
//! so a FUSE host can recover the POSIX code it actually needs at the boundary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("magic mismatch: expected {expected:#010x}, got {got:#010x}")]
    MagicMismatch { expected: u32, got: u32 },

    #[error("partition entry size must be 7 words, got {0}")]
    BadPartitionSize(u32),

    #[error("unexpected LMFS version: expected 5, got {0}")]
    UnexpectedVersion(u32),

    #[error("non-zero LMFS checkword: {0:#08x}")]
    BadCheckword(u32),

    #[error("LMFS size mismatch: header says {header}, partition says {partition}")]
    SizeMismatch { header: u32, partition: u32 },

    #[error("root directory map too large: {0} entries (max 31)")]
    RootMapTooLarge(u32),

    #[error("directory header id string not recognized")]
    BadDirectoryHeaderId,

    #[error("unknown directory header version: {0}")]
    UnknownHeaderVersion(u32),

    #[error("illegal directory header flag: {0}")]
    BadHeaderFlag(u32),

    #[error("extent bit size {0} is not a multiple of 8")]
    BadAlignment(u32),

    #[error("extent block {block} is out of bounds (band has {band_size} blocks)")]
    BoundsExceeded { block: u32, band_size: u32 },

    #[error("unsupported proplist opcode: {0}")]
    Unsupported(u8),

    #[error("no such band partition: {0:?}")]
    BandNotFound([u8; 4]),

    #[error("no such file or directory")]
    NotFound,

    #[error("not a directory")]
    NotADirectory,

    #[error("is a directory")]
    IsADirectory,
}

impl Error {
    /// POSIX errno a FUSE host would want to surface for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::NotFound => libc_enoent(),
            Error::NotADirectory => libc_enotdir(),
            Error::IsADirectory => libc_eisdir(),
            Error::Io(_) => libc_eio(),
            _ => libc_einval(),
        }
    }
}

// Avoid a dependency on the `libc` crate for four well-known constants.
fn libc_enoent() -> i32 {
    2
}
fn libc_eio() -> i32 {
    5
}
fn libc_einval() -> i32 {
    22
}
fn libc_enotdir() -> i32 {
    20
}
fn libc_eisdir() -> i32 {
    21
}
