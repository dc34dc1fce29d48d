//! POSIX-style path parsing and recursive, version-aware directory lookup.
//! Corresponds to `spec.md` §4.7.

use crate::directory::{self, DirAttributes, DirectoryEntry};
use crate::error::{Error, Result};
use crate::extent::Extent;
use crate::volume::LmfsVolume;
use log::{debug, trace, warn};

const ROOT_ATTRIBUTES: u16 =
    DirAttributes::HEADER_BLOCK | DirAttributes::DIRECTORY | DirAttributes::CLOSED;

/// A resolved path target, uniform whether it came from a real directory entry or
/// was synthesized for the root.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub name: String,
    pub file_type: String,
    pub version: u32,
    pub author: String,
    pub cdate: u32,
    pub map: Vec<Extent>,
    pub total_bytes: u32,
    pub attributes: DirAttributes,
}

impl From<DirectoryEntry> for ResolvedEntry {
    fn from(e: DirectoryEntry) -> Self {
        ResolvedEntry {
            name: e.name,
            file_type: e.file_type,
            version: e.version,
            author: e.author,
            cdate: e.cdate,
            map: e.map,
            total_bytes: e.total_bytes,
            attributes: e.attributes,
        }
    }
}

#[derive(Debug, Clone)]
struct PathComponent {
    name: String,
    file_type: Option<String>,
    version: Option<u32>,
}

fn parse_component(token: &str) -> PathComponent {
    let (before_hash, version) = match token.find('#') {
        Some(idx) => {
            let version = token[idx + 1..].parse::<u32>().ok();
            (&token[..idx], version)
        }
        None => (token, None),
    };
    match before_hash.find('.') {
        Some(idx) => PathComponent {
            name: before_hash[..idx].to_string(),
            file_type: Some(before_hash[idx + 1..].to_string()),
            version,
        },
        None => PathComponent {
            name: before_hash.to_string(),
            file_type: None,
            version,
        },
    }
}

fn split_path(path: &str) -> Vec<PathComponent> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(parse_component)
        .collect()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn is_directory_type(file_type: &str) -> bool {
    file_type.is_empty() || eq_ignore_case(file_type, "DIRECTORY")
}

/// Resolves a slash-separated path against the volume's root.
pub fn resolve(volume: &LmfsVolume, path: &str) -> Result<ResolvedEntry> {
    debug!("resolving path '{}'", path);
    let components = split_path(path);
    if components.is_empty() {
        return Ok(synth_root(volume)?);
    }

    let mut current_header_extents = volume.band_header.root_map.clone();
    let last = components.len() - 1;

    for (i, comp) in components.iter().enumerate() {
        let (_header, body) = directory::load_directory_body(
            volume.device.as_ref(),
            volume.geometry.band_block,
            volume.geometry.band_size_blocks,
            &current_header_extents,
        )?;
        let entries = directory::parse_entries(&body)?;
        trace!("component '{}': {} entries in directory", comp.name, entries.len());

        if i != last {
            let found = entries
                .into_iter()
                .find(|e| is_directory_type(&e.file_type) && eq_ignore_case(&e.name, &comp.name));
            match found {
                Some(e) => current_header_extents = e.map,
                None => {
                    warn!("no such directory component '{}' in path '{}'", comp.name, path);
                    return Err(Error::NotFound);
                }
            }
        } else {
            return terminal_match(entries, comp);
        }
    }

    unreachable!("loop always returns on the last component")
}

fn terminal_match(entries: Vec<DirectoryEntry>, comp: &PathComponent) -> Result<ResolvedEntry> {
    let result = match (&comp.file_type, comp.version) {
        (Some(file_type), Some(version)) => entries
            .into_iter()
            .find(|e| {
                eq_ignore_case(&e.name, &comp.name)
                    && eq_ignore_case(&e.file_type, file_type)
                    && e.version == version
            })
            .map(ResolvedEntry::from),
        (Some(file_type), None) => {
            let mut best: Option<DirectoryEntry> = None;
            for e in entries {
                if eq_ignore_case(&e.name, &comp.name) && eq_ignore_case(&e.file_type, file_type) {
                    let replace = match &best {
                        Some(b) => e.version > b.version,
                        None => true,
                    };
                    if replace {
                        best = Some(e);
                    }
                }
            }
            best.map(ResolvedEntry::from)
        }
        (None, _) => entries
            .into_iter()
            .find(|e| eq_ignore_case(&e.name, &comp.name) && is_directory_type(&e.file_type))
            .map(ResolvedEntry::from),
    };
    if result.is_none() {
        warn!("no match for terminal path component '{}'", comp.name);
    }
    result.ok_or(Error::NotFound)
}

fn synth_root(volume: &LmfsVolume) -> Result<ResolvedEntry> {
    let root_map = &volume.band_header.root_map;
    let header = directory::load_header(
        volume.device.as_ref(),
        volume.geometry.band_block,
        volume.geometry.band_size_blocks,
        root_map,
    )?;
    let total_bytes: u32 = root_map.iter().map(|e| e.bit_size / 8).fold(0u32, |a, b| a + b);
    Ok(ResolvedEntry {
        name: header.id_string,
        file_type: "DIRECTORY".to_string(),
        version: 1,
        author: "lispm".to_string(),
        cdate: header.cdate,
        map: root_map.clone(),
        total_bytes,
        attributes: DirAttributes(ROOT_ATTRIBUTES),
    })
}
