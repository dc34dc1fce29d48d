//! Read-only driver for LMFS (Lisp Machine File System) bands embedded inside
//! Lambda disk images.
//!
//! The on-disk structure nests four layers, each handled by its own module:
//!
//! - [`label`] -- the True Mini Label and Main Label that locate a named band's
//!   partition on the raw image.
//! - [`band`] -- the LMFS configuration block at the start of a band, which gives
//!   the filesystem version, size, and the root directory's map.
//! - [`directory`] -- directory headers, submaps, and the packed directory-entry
//!   grammar (names, types, versions, extent maps, proplists).
//! - [`resolve`] -- POSIX-style path parsing and version-aware lookup over the
//!   directory tree.
//!
//! [`volume::LmfsVolume`] ties these together into one handle a host opens once
//! and then shares across threads; [`adapter`] exposes the read-only operations
//! (`getattr`, `readdir`, `open`, `read`) a filesystem host actually calls.

pub mod adapter;
pub mod band;
pub mod cli;
pub mod device;
pub mod directory;
pub mod error;
pub mod extent;
pub mod label;
pub mod resolve;
pub mod time;
pub mod volume;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use volume::{LmfsVolume, MountConfig};
