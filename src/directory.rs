//! Directory header, submap, and directory-entry decoding. This is the densest part
//! of the format: two header versions with a conditionally-present leading submap,
//! followed by a packed sequence of variable-length entries with their own extent
//! maps and typed property lists. Corresponds to `spec.md` §3 (`DirectoryHeader`,
//! `SubmapTable`, `DirectoryEntry`, `PropList`) and §4.6.

use crate::device::BlockDevice;
use crate::error::{Error, Result};
use crate::extent::{read_extents, read_u24_be, Extent};
use log::{debug, trace, warn};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

const HEADER_ID: &[u8; 28] = b"_THIS_IS_A_DIRECTORY_HEADER_";
const RETURN: u8 = 0x8D;

/// Attribute bits on a directory entry (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirAttributes(pub u16);

impl DirAttributes {
    pub const DONT_DELETE: u16 = 0x0001;
    pub const CLOSED: u16 = 0x0002;
    pub const DELETED: u16 = 0x0004;
    pub const DUMPED: u16 = 0x0008;
    pub const DONT_REAP: u16 = 0x0010;
    pub const CHARACTERS: u16 = 0x0020;
    pub const DIRECTORY: u16 = 0x0040;
    pub const HEADER_BLOCK: u16 = 0x4000;

    pub fn has(&self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn is_directory(&self) -> bool {
        self.has(Self::DIRECTORY)
    }

    pub fn is_characters(&self) -> bool {
        self.has(Self::CHARACTERS)
    }
}

#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq)]
pub enum HeaderVersion {
    V1 = 1,
    V2 = 2,
}

#[derive(Debug, Clone)]
pub struct DirectoryHeader {
    pub version: HeaderVersion,
    pub id_string: String,
    pub cdate: u32,
    #[allow(dead_code)]
    pub self_block: u32,
    pub data_submap: Vec<Extent>,
}

#[derive(Debug, Clone)]
pub enum PropValue {
    False,
    True,
    Int(u32),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct PropItem {
    pub name: String,
    pub opcode: u8,
    pub value: PropValue,
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub file_type: String,
    pub version: u32,
    #[allow(dead_code)]
    pub byte_size: u8,
    pub author: String,
    pub cdate: u32,
    pub map: Vec<Extent>,
    pub total_bytes: u32,
    pub attributes: DirAttributes,
    pub proplist: Vec<PropItem>,
}

/// A `{count: u16 BE, entries: Extent24[count]}` table, the shape shared by submap
/// tables and directory-entry extent maps (`spec.md` §3).
fn parse_extent_table(bytes: &[u8], offset: usize) -> Result<(Vec<Extent>, usize)> {
    let count = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]) as usize;
    let mut entries = Vec::with_capacity(count);
    let mut pos = offset + 2;
    for _ in 0..count {
        let block = read_u24_be(&bytes[pos..pos + 3]);
        let bit_size = read_u24_be(&bytes[pos + 3..pos + 6]);
        entries.push(Extent { block, bit_size });
        pos += 6;
    }
    Ok((entries, pos - offset))
}

/// Decodes the directory header found in `header_bytes` (the flattened contents of
/// the extent list handed to a directory lookup -- root map, or an entry's own map)
/// and selects the data submap per the flag/version rules in `spec.md` §4.6.
pub fn decode_header(header_bytes: &[u8]) -> Result<DirectoryHeader> {
    if header_bytes.len() < 84 || &header_bytes[0..28] != HEADER_ID {
        warn!("directory header id string not recognized");
        return Err(Error::BadDirectoryHeaderId);
    }
    let version_raw = u32::from_le_bytes(header_bytes[28..32].try_into().unwrap());
    let version = HeaderVersion::from_u32(version_raw).ok_or_else(|| {
        warn!("unknown directory header version: {}", version_raw);
        Error::UnknownHeaderVersion(version_raw)
    })?;
    let id_string = ascii_trimmed(&header_bytes[32..72]);
    let cdate = u32::from_le_bytes(header_bytes[72..76].try_into().unwrap());
    let self_block = u32::from_le_bytes(header_bytes[76..80].try_into().unwrap());
    let flag = u32::from_le_bytes(header_bytes[80..84].try_into().unwrap());
    trace!("directory header '{}': version {:?}, flag {}", id_string, version, flag);

    let data_submap_offset = match flag {
        0 => 84,
        1 => {
            let leading_count =
                u16::from_be_bytes([header_bytes[84], header_bytes[85]]) as usize;
            let mut skip = leading_count * 6 + 2;
            if version == HeaderVersion::V2 {
                skip += 2;
            }
            84 + skip
        }
        other => {
            warn!("illegal directory header flag: {}", other);
            return Err(Error::BadHeaderFlag(other));
        }
    };

    let (data_submap, _) = parse_extent_table(header_bytes, data_submap_offset)?;

    Ok(DirectoryHeader {
        version,
        id_string,
        cdate,
        self_block,
        data_submap,
    })
}

/// Reads the directory's header extents, decodes the header, then reads the data
/// submap's extents to produce the directory body bytes.
pub fn load_directory_body(
    device: &dyn BlockDevice,
    band_block: u32,
    band_size_blocks: u32,
    header_extents: &[Extent],
) -> Result<(DirectoryHeader, Vec<u8>)> {
    let header = load_header(device, band_block, band_size_blocks, header_extents)?;
    let body = read_extents(device, band_block, band_size_blocks, &header.data_submap)?;
    debug!("directory '{}' body: {} bytes", header.id_string, body.len());
    Ok((header, body))
}

/// Reads and decodes just the directory header (no body), used by the resolver to
/// synthesize the root entry's `id_string`/`cdate` without paying for a body read.
pub fn load_header(
    device: &dyn BlockDevice,
    band_block: u32,
    band_size_blocks: u32,
    header_extents: &[Extent],
) -> Result<DirectoryHeader> {
    debug!("loading directory header from {} extent(s)", header_extents.len());
    let header_bytes = read_extents(device, band_block, band_size_blocks, header_extents)?;
    decode_header(&header_bytes)
}

fn read_until_return(bytes: &[u8], pos: usize) -> Result<(String, usize)> {
    let rel = bytes[pos..]
        .iter()
        .position(|&b| b == RETURN)
        .ok_or(Error::BadDirectoryHeaderId)?;
    let s = ascii_lossy(&bytes[pos..pos + rel]);
    Ok((s, pos + rel + 1))
}

/// Parses one packed directory entry starting at `pos`, returning the entry and the
/// number of bytes consumed (`spec.md` §4.6).
pub fn parse_entry(body: &[u8], pos: usize) -> Result<(DirectoryEntry, usize)> {
    let start = pos;
    let (name, pos) = read_until_return(body, pos)?;
    let (file_type, pos) = read_until_return(body, pos)?;

    let version = read_u24_be(&body[pos..pos + 3]);
    let pos = pos + 3;
    let byte_size = body[pos];
    let pos = pos + 1;

    let (author, pos) = read_until_return(body, pos)?;

    let cdate = u32::from_be_bytes(body[pos..pos + 4].try_into().unwrap());
    let pos = pos + 4;

    let (map, map_len) = parse_extent_table(body, pos)?;
    let pos = pos + map_len;
    let total_bytes: u32 = map
        .iter()
        .map(|e| e.bit_size / 8)
        .fold(0u32, |a, b| a + b);

    let attributes = DirAttributes(u16::from_be_bytes([body[pos], body[pos + 1]]));
    let pos = pos + 2;

    let proplist_len = body[pos];
    let mut pos = pos + 1;
    let mut proplist = Vec::with_capacity(proplist_len as usize);
    for _ in 0..proplist_len {
        let name_len = body[pos] as usize;
        pos += 1;
        let name = ascii_lossy(&body[pos..pos + name_len]);
        pos += name_len;
        let opcode = body[pos];
        pos += 1;
        let value = match opcode {
            0 => PropValue::False,
            1 => PropValue::True,
            4 => {
                let v = read_u24_be(&body[pos..pos + 3]);
                pos += 3;
                PropValue::Int(v)
            }
            5 => {
                let len = body[pos] as usize;
                pos += 1;
                let s = ascii_lossy(&body[pos..pos + len]);
                pos += len;
                PropValue::Str(s)
            }
            other => {
                warn!("unsupported proplist opcode: {}", other);
                return Err(Error::Unsupported(other));
            }
        };
        proplist.push(PropItem { name, opcode, value });
    }

    let entry = DirectoryEntry {
        name,
        file_type,
        version,
        byte_size,
        author,
        cdate,
        map,
        total_bytes,
        attributes,
        proplist,
    };
    trace!("parsed entry '{}.{}#{}' ({} bytes)", entry.name, entry.file_type, entry.version, pos - start);
    Ok((entry, pos - start))
}

/// Parses every entry in the directory body, in on-disk order.
pub fn parse_entries(body: &[u8]) -> Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < body.len() {
        let (entry, consumed) = parse_entry(body, pos)?;
        entries.push(entry);
        pos += consumed;
    }
    Ok(entries)
}

fn ascii_trimmed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    ascii_lossy(&bytes[..end])
}

fn ascii_lossy(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| (b & 0x7f) as char).collect()
}
