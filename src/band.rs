//! LMFS band configuration block (band-relative block 0). Corresponds to `spec.md`
//! §3 (`BandHeader`) and §4.4 (`BandConfig`).

use crate::device::BlockDevice;
use crate::error::{Error, Result};
use crate::extent::{read_u24_be, Extent};
use log::{debug, trace, warn};

const LMFS_VERSION: u32 = 5;
const MAX_ROOT_MAP_LEN: u32 = 31;

#[derive(Debug, Clone)]
pub struct BandHeader {
    pub version: u32,
    pub checkword: u32,
    pub fs_size_blocks: u32,
    pub put: Extent,
    pub put_size: u32,
    pub root_map: Vec<Extent>,
}

/// Decodes band-relative block 0 and validates it against `band_size_blocks`
/// (the partition's declared size). See `spec.md` §4.4 and §6.1.
pub fn load_band_header(
    device: &dyn BlockDevice,
    band_block: u32,
    band_size_blocks: u32,
) -> Result<BandHeader> {
    debug!("loading band config block at {}", band_block);
    let block = device.read_block(band_block)?;

    let version = read_u24_be(&block[0..3]);
    let checkword = read_u24_be(&block[3..6]);
    let fs_size_blocks = read_u24_be(&block[6..9]);
    let put_base = read_u24_be(&block[9..12]);
    let put_size_blocks = read_u24_be(&block[12..15]);
    let root_nblks = u16::from_be_bytes([block[15], block[16]]) as u32;
    trace!(
        "band header: version {}, checkword {}, fs_size {}, root_nblks {}",
        version, checkword, fs_size_blocks, root_nblks
    );

    if version != LMFS_VERSION {
        warn!("unexpected LMFS version: expected {}, got {}", LMFS_VERSION, version);
        return Err(Error::UnexpectedVersion(version));
    }
    if checkword != 0 {
        warn!("non-zero LMFS checkword: {:#08x}", checkword);
        return Err(Error::BadCheckword(checkword));
    }
    if fs_size_blocks != band_size_blocks {
        warn!("LMFS size mismatch: header says {}, partition says {}", fs_size_blocks, band_size_blocks);
        return Err(Error::SizeMismatch {
            header: fs_size_blocks,
            partition: band_size_blocks,
        });
    }
    if root_nblks > MAX_ROOT_MAP_LEN {
        warn!("root directory map too large: {} entries (max {})", root_nblks, MAX_ROOT_MAP_LEN);
        return Err(Error::RootMapTooLarge(root_nblks));
    }

    let mut root_map = Vec::with_capacity(root_nblks as usize);
    for i in 0..root_nblks as usize {
        let off = 17 + i * 6;
        let entry_block = read_u24_be(&block[off..off + 3]);
        let entry_bit_size = read_u24_be(&block[off + 3..off + 6]);
        root_map.push(Extent {
            block: entry_block,
            bit_size: entry_bit_size,
        });
    }

    Ok(BandHeader {
        version,
        checkword,
        fs_size_blocks,
        put: Extent {
            block: put_base,
            bit_size: put_size_blocks,
        },
        put_size: put_size_blocks,
        root_map,
    })
}
