//! Read-only filesystem operations built on top of [`crate::resolve`]:
//! `getattr`, `readdir`, `open`, and `read`. Corresponds to `spec.md` §4.8.

use crate::directory::{self, parse_entries};
use crate::error::{Error, Result};
use crate::extent::read_extents;
use crate::resolve::{self, ResolvedEntry};
use crate::time::lisp_to_posix_secs;
use crate::volume::LmfsVolume;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// POSIX-flavored attributes for a resolved path, independent of any particular
/// host's stat struct layout.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub mtime_posix: i64,
    pub version: u32,
}

impl From<ResolvedEntry> for Attr {
    fn from(e: ResolvedEntry) -> Self {
        let kind = if e.attributes.is_directory() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Attr {
            name: e.name,
            kind,
            size: e.total_bytes as u64,
            mtime_posix: lisp_to_posix_secs(e.cdate),
            version: e.version,
        }
    }
}

/// Returns attributes for `path`, which may be `/` for the root.
pub fn getattr(volume: &LmfsVolume, path: &str) -> Result<Attr> {
    resolve::resolve(volume, path).map(Attr::from)
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Lists the directory at `path` as host-facing filenames: bare names for
/// subdirectories, `name.type#version` for files, plus `.` and `..`.
pub fn readdir(volume: &LmfsVolume, path: &str) -> Result<Vec<String>> {
    let dir_map = if is_root(path) {
        volume.band_header().root_map.clone()
    } else {
        let resolved = resolve::resolve(volume, path)?;
        if !resolved.attributes.is_directory() {
            return Err(Error::NotADirectory);
        }
        resolved.map
    };

    let (_, body) = directory::load_directory_body(
        volume.device.as_ref(),
        volume.geometry().band_block,
        volume.geometry().band_size_blocks,
        &dir_map,
    )?;
    let entries = parse_entries(&body)?;

    let mut names = vec![".".to_string(), "..".to_string()];
    for e in entries {
        if e.attributes.is_directory() {
            names.push(e.name);
        } else {
            names.push(format!("{}.{}#{}", e.name, e.file_type, e.version));
        }
    }
    Ok(names)
}

/// An open file: the resolved entry plus whatever state `read` needs. Mirrors the
/// original driver's `file_handle` cast, minus the raw pointer.
pub struct FileHandle {
    entry: ResolvedEntry,
}

/// Validates that `path` resolves to a file (not a directory) and returns a handle
/// subsequent `read` calls use.
pub fn open(volume: &LmfsVolume, path: &str) -> Result<FileHandle> {
    let entry = resolve::resolve(volume, path)?;
    if entry.attributes.is_directory() {
        return Err(Error::IsADirectory);
    }
    Ok(FileHandle { entry })
}

/// Reads up to `size` bytes starting at `offset` from an open file. When the
/// entry's `CHARACTERS` bit is set, each byte is masked to 7 bits and carriage
/// returns (`0x0D`) are rewritten to line feeds (`0x0A`), matching the original
/// driver's text-mode translation.
pub fn read(volume: &LmfsVolume, handle: &FileHandle, offset: u64, size: usize) -> Result<Vec<u8>> {
    let mut bytes = read_extents(
        volume.device.as_ref(),
        volume.geometry().band_block,
        volume.geometry().band_size_blocks,
        &handle.entry.map,
    )?;

    if handle.entry.attributes.is_characters() {
        for b in bytes.iter_mut() {
            *b &= 0x7f;
            if *b == 0x0D {
                *b = 0x0A;
            }
        }
    }

    let start = (offset as usize).min(bytes.len());
    let end = start.saturating_add(size).min(bytes.len());
    Ok(bytes[start..end].to_vec())
}
