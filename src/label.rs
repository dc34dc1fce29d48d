//! True Mini Label / Main Label / partition table decoding.
//!
//! Both labels are little-endian, fixed-offset structures, which is exactly the shape
//! `binrw` derive structs are for -- see `spec.md` §6.1 and §9 ("pointer-cast struct
//! overlays ... explicit byte decoders ... declared endianness").

use crate::device::BlockDevice;
use crate::error::{Error, Result};
use binrw::{BinRead, BinReaderExt};
use log::{debug, error, trace, warn};
use std::io::Cursor;

const TRUE_MINI_LABEL_BLOCK: u32 = 10;
const MINI_MAGIC: u32 = 0x494E_494D; // 'MINI' little-endian
const LABL_MAGIC: u32 = 0x4C42_414C; // 'LABL' little-endian
const PARTSIZE_WORDS: u32 = 7;
const NUM_PARTITION_ENTRIES: usize = 29;

#[derive(BinRead, Debug, Clone, Copy)]
#[br(little)]
struct TrueMiniLabelHeader {
    magic: u32,
    #[allow(dead_code)]
    length: u32,
    label_block: u32,
}

#[derive(BinRead, Debug, Clone, Copy)]
#[br(little)]
pub struct PartitionEntry {
    pub name: [u8; 4],
    pub start: u32,
    pub size: u32,
    pub comment: [u8; 16],
}

impl PartitionEntry {
    /// Case-sensitive exact match over all 4 bytes, per `spec.md` §4.3.
    pub fn name_matches(&self, key: &[u8; 4]) -> bool {
        &self.name == key
    }

    pub fn comment_str(&self) -> String {
        ascii_trimmed(&self.comment)
    }
}

/// Geometry located by the two-level label: where the Main Label lives, and where the
/// requested band starts (once a partition has been located).
#[derive(Debug, Clone)]
pub struct DiskGeometry {
    pub label_block: u32,
    pub band_block: u32,
    pub band_size_blocks: u32,
    pub comment: String,
}

fn ascii_trimmed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/// Reads block 10 (True Mini Label), follows it to the Main Label, validates both,
/// and returns the partition table. Corresponds to `spec.md` §4.2.
pub fn load_label(device: &dyn BlockDevice) -> Result<(u32, Vec<PartitionEntry>)> {
    debug!("loading true mini label from block {}", TRUE_MINI_LABEL_BLOCK);
    let mini_block = device.read_block(TRUE_MINI_LABEL_BLOCK)?;
    let mut cur = Cursor::new(&mini_block[..]);
    let mini: TrueMiniLabelHeader = cur.read_le().map_err(binrw_to_io)?;
    if mini.magic != MINI_MAGIC {
        warn!("true mini label magic mismatch: expected {:#010x}, got {:#010x}", MINI_MAGIC, mini.magic);
        error!("raw true mini label bytes: {}", hex::encode(&mini_block[..32]));
        return Err(Error::MagicMismatch {
            expected: MINI_MAGIC,
            got: mini.magic,
        });
    }

    let label_block = mini.label_block;
    debug!("main label at block {}", label_block);
    let main_block = device.read_block(label_block)?;
    let magic = u32::from_le_bytes(main_block[0..4].try_into().unwrap());
    if magic != LABL_MAGIC {
        warn!("main label magic mismatch: expected {:#010x}, got {:#010x}", LABL_MAGIC, magic);
        error!("raw main label bytes: {}", hex::encode(&main_block[..32]));
        return Err(Error::MagicMismatch {
            expected: LABL_MAGIC,
            got: magic,
        });
    }

    let partitions_count = u32::from_le_bytes(main_block[552..556].try_into().unwrap());
    let partsize = u32::from_le_bytes(main_block[556..560].try_into().unwrap());
    if partsize != PARTSIZE_WORDS {
        warn!("partition entry size mismatch: expected {} words, got {}", PARTSIZE_WORDS, partsize);
        return Err(Error::BadPartitionSize(partsize));
    }
    trace!("partition table: {} entries declared", partitions_count);

    let mut cur = Cursor::new(&main_block[560..]);
    let mut entries = Vec::with_capacity(NUM_PARTITION_ENTRIES);
    for _ in 0..NUM_PARTITION_ENTRIES {
        let entry: PartitionEntry = cur.read_le().map_err(binrw_to_io)?;
        entries.push(entry);
    }
    entries.truncate(partitions_count as usize);

    Ok((label_block, entries))
}

/// Finds the partition whose 4-byte name matches `name`. Corresponds to `spec.md` §4.3.
pub fn find_band<'a>(partitions: &'a [PartitionEntry], name: &[u8; 4]) -> Result<&'a PartitionEntry> {
    let found = partitions.iter().find(|p| p.name_matches(name));
    if found.is_none() {
        warn!("no partition named {:?} among {} entries", name, partitions.len());
    }
    found.ok_or(Error::BandNotFound(*name))
}

fn binrw_to_io(e: binrw::Error) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
