//! Synthetic in-memory disk images for unit tests. No real Lambda disk image is
//! available in this workspace, so every module builds its own fixture bytes; this
//! one assembles a complete label + band + root directory for tests that need a
//! fully wired `LmfsVolume`.

use crate::device::BLOCK_SIZE;

const MINI_MAGIC: u32 = 0x494E_494D;
const LABL_MAGIC: u32 = 0x4C42_414C;
const PARTSIZE_WORDS: u32 = 7;
const HEADER_ID: &[u8; 28] = b"_THIS_IS_A_DIRECTORY_HEADER_";
const RETURN: u8 = 0x8D;

const LABEL_BLOCK: u32 = 20;
const PARTITION_START: u32 = 5;
pub const BAND_BLOCK: u32 = LABEL_BLOCK + PARTITION_START;
pub const BAND_SIZE_BLOCKS: u32 = 20;
const TOTAL_BLOCKS: usize = 64;

fn put_u24(buf: &mut [u8], off: usize, val: u32) {
    buf[off] = ((val >> 16) & 0xFF) as u8;
    buf[off + 1] = ((val >> 8) & 0xFF) as u8;
    buf[off + 2] = (val & 0xFF) as u8;
}

fn push_name(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(RETURN);
}

/// One packed directory entry, matching the grammar in `directory.rs`. `body`, when
/// non-empty, is written to its own band block and referenced by a one-extent map.
pub struct SyntheticEntry {
    pub name: &'static str,
    pub file_type: &'static str,
    pub version: u32,
    pub body: &'static [u8],
    pub attributes: u16,
}

fn build_entry_bytes(entry: &SyntheticEntry, map: &[(u32, u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    push_name(&mut buf, entry.name);
    push_name(&mut buf, entry.file_type);
    buf.push((entry.version >> 16) as u8);
    buf.push((entry.version >> 8) as u8);
    buf.push(entry.version as u8);
    buf.push(1); // byte_size, unused by the adapter
    push_name(&mut buf, "LISPM");
    buf.extend_from_slice(&2_786_122_897u32.to_be_bytes());
    buf.extend_from_slice(&(map.len() as u16).to_be_bytes());
    for (block, bits) in map {
        let mut tmp = [0u8; 3];
        put_u24(&mut tmp, 0, *block);
        buf.extend_from_slice(&tmp);
        put_u24(&mut tmp, 0, *bits);
        buf.extend_from_slice(&tmp);
    }
    buf.extend_from_slice(&entry.attributes.to_be_bytes());
    buf.push(0); // proplist_len
    buf
}

/// A fully assembled synthetic disk image: True Mini Label at block 10, Main Label
/// at block 20 with a single `LMFS` partition, and a band whose root directory holds
/// whatever entries are supplied.
pub struct SyntheticImage {
    pub bytes: Vec<u8>,
}

impl SyntheticImage {
    /// One band, one root directory, no entries.
    pub fn minimal() -> Self {
        Self::with_root_entries(&[])
    }

    pub fn with_root_entries(entries: &[SyntheticEntry]) -> Self {
        let mut data = vec![0u8; BLOCK_SIZE * TOTAL_BLOCKS];

        let tml_off = 10 * BLOCK_SIZE;
        data[tml_off..tml_off + 4].copy_from_slice(&MINI_MAGIC.to_le_bytes());
        data[tml_off + 4..tml_off + 8].copy_from_slice(&1024u32.to_le_bytes());
        data[tml_off + 8..tml_off + 12].copy_from_slice(&LABEL_BLOCK.to_le_bytes());

        let lbl_off = LABEL_BLOCK as usize * BLOCK_SIZE;
        data[lbl_off..lbl_off + 4].copy_from_slice(&LABL_MAGIC.to_le_bytes());
        data[lbl_off + 552..lbl_off + 556].copy_from_slice(&1u32.to_le_bytes());
        data[lbl_off + 556..lbl_off + 560].copy_from_slice(&PARTSIZE_WORDS.to_le_bytes());
        let entry_off = lbl_off + 560;
        data[entry_off..entry_off + 4].copy_from_slice(b"LMFS");
        data[entry_off + 4..entry_off + 8].copy_from_slice(&PARTITION_START.to_le_bytes());
        data[entry_off + 8..entry_off + 12].copy_from_slice(&BAND_SIZE_BLOCKS.to_le_bytes());

        // Band config block (band-relative block 0). Root map points at band-relative
        // block 1, where the directory header lives.
        let band_off = BAND_BLOCK as usize * BLOCK_SIZE;
        put_u24(&mut data[band_off..band_off + 3], 0, 5); // version
        put_u24(&mut data[band_off + 3..band_off + 6], 0, 0); // checkword
        put_u24(&mut data[band_off + 6..band_off + 9], 0, BAND_SIZE_BLOCKS);
        put_u24(&mut data[band_off + 9..band_off + 12], 0, 0); // put base
        put_u24(&mut data[band_off + 12..band_off + 15], 0, 0); // put size
        data[band_off + 15..band_off + 17].copy_from_slice(&1u16.to_be_bytes());
        put_u24(&mut data[band_off + 17..band_off + 20], 0, 1);
        put_u24(&mut data[band_off + 20..band_off + 23], 0, BLOCK_SIZE as u32 * 8);

        // Entry payload blocks start at band-relative block 3; block 2 holds the
        // root directory body itself.
        let mut next_payload_block = 3u32;
        let mut root_body = Vec::new();
        for e in entries {
            let map = if e.body.is_empty() {
                vec![]
            } else {
                let abs = (BAND_BLOCK + next_payload_block) as usize * BLOCK_SIZE;
                data[abs..abs + e.body.len()].copy_from_slice(e.body);
                let m = vec![(next_payload_block, (e.body.len() * 8) as u32)];
                next_payload_block += 1;
                m
            };
            root_body.extend_from_slice(&build_entry_bytes(e, &map));
        }

        // Root directory header (band-relative block 1): flag 0, data submap is a
        // single extent at band-relative block 2 sized to hold `root_body`.
        let header_off = (BAND_BLOCK + 1) as usize * BLOCK_SIZE;
        let mut header = vec![0u8; 84];
        header[0..28].copy_from_slice(HEADER_ID);
        header[28..32].copy_from_slice(&1u32.to_le_bytes());
        let id = b"ROOT-DIRECTORY";
        header[32..32 + id.len()].copy_from_slice(id);
        header[72..76].copy_from_slice(&2_786_122_897u32.to_le_bytes());
        header[76..80].copy_from_slice(&0u32.to_le_bytes());
        header[80..84].copy_from_slice(&0u32.to_le_bytes());
        header.extend_from_slice(&1u16.to_be_bytes());
        let mut tmp = [0u8; 3];
        put_u24(&mut tmp, 0, 2);
        header.extend_from_slice(&tmp);
        put_u24(&mut tmp, 0, (root_body.len() * 8) as u32);
        header.extend_from_slice(&tmp);
        header.resize(BLOCK_SIZE, 0);
        data[header_off..header_off + BLOCK_SIZE].copy_from_slice(&header);

        let body_off = (BAND_BLOCK + 2) as usize * BLOCK_SIZE;
        data[body_off..body_off + root_body.len()].copy_from_slice(&root_body);

        Self { bytes: data }
    }
}
