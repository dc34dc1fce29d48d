//! Mount-time initialization: wires `LabelReader` → `BandLocator` → `BandConfig`
//! into one immutable, freely shareable handle. Corresponds to `spec.md` §9's
//! "global mutable state → init-once configuration" note.

use crate::band::{self, BandHeader};
use crate::device::{BlockDevice, FileBlockDevice};
use crate::error::{Error, Result};
use crate::label::{self, DiskGeometry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_DISK: &str = "disk.img";
const DEFAULT_BAND: &[u8; 4] = b"LMFS";

/// Mount options the host passes through (`spec.md` §6.2).
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub disk: PathBuf,
    pub band: [u8; 4],
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            disk: PathBuf::from(DEFAULT_DISK),
            band: *DEFAULT_BAND,
        }
    }
}

impl MountConfig {
    pub fn new(disk: impl AsRef<Path>, band: [u8; 4]) -> Self {
        Self {
            disk: disk.as_ref().to_path_buf(),
            band,
        }
    }

    pub fn open(&self) -> Result<LmfsVolume> {
        let device = FileBlockDevice::open(&self.disk)?;
        LmfsVolume::from_device(Arc::new(device), &self.band)
    }
}

/// Immutable, `Send + Sync`, cheaply `Clone`-able mounted-filesystem handle. Safe to
/// share across worker threads per `spec.md` §5.
#[derive(Clone)]
pub struct LmfsVolume {
    pub(crate) device: Arc<dyn BlockDevice>,
    pub(crate) geometry: DiskGeometry,
    pub(crate) band_header: BandHeader,
}

impl LmfsVolume {
    pub fn from_device(device: Arc<dyn BlockDevice>, band: &[u8; 4]) -> Result<Self> {
        let (label_block, partitions) = label::load_label(device.as_ref())?;
        let partition = label::find_band(&partitions, band)?;
        let band_block = partition.start + label_block;
        let band_size_blocks = partition.size;

        if band_block as u64 + band_size_blocks as u64 > device.block_count() as u64 {
            return Err(Error::BoundsExceeded {
                block: band_block + band_size_blocks,
                band_size: device.block_count(),
            });
        }

        let band_header = band::load_band_header(device.as_ref(), band_block, band_size_blocks)?;

        Ok(Self {
            device,
            geometry: DiskGeometry {
                label_block,
                band_block,
                band_size_blocks,
                comment: partition.comment_str(),
            },
            band_header,
        })
    }

    pub fn geometry(&self) -> &DiskGeometry {
        &self.geometry
    }

    pub fn band_header(&self) -> &BandHeader {
        &self.band_header
    }
}
