//! ICO container reading
//!
//! ICO Structure (all integers little-endian):
//! ```text
//! ICONDIR        (6 bytes)   reserved=0, type=1, count
//! ICONDIRENTRY   (16 bytes)  x count
//!   width, height, colours, reserved   (u8 each)
//!   planes, bits per pixel             (u16 each)
//!   bytes in resource, image offset    (u32 each)
//! image data     anywhere in the file, addressed by the entries
//! ```

use tracing::{debug, warn};

use crate::error::PolyglotError;

/// Size of the ICONDIR header
pub const ICO_HEADER_LEN: usize = 6;

/// Size of one ICONDIRENTRY
pub const ICO_DIR_ENTRY_LEN: usize = 16;

/// Resource type value for icons (cursors use 2)
pub const ICO_TYPE_ICON: u16 = 1;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// ICONDIR header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoHeader {
    pub reserved: u16,
    pub image_type: u16,
    pub count: u16,
}

impl IcoHeader {
    pub fn to_bytes(&self) -> [u8; ICO_HEADER_LEN] {
        let mut out = [0u8; ICO_HEADER_LEN];
        out[0..2].copy_from_slice(&self.reserved.to_le_bytes());
        out[2..4].copy_from_slice(&self.image_type.to_le_bytes());
        out[4..6].copy_from_slice(&self.count.to_le_bytes());
        out
    }
}

/// One ICONDIRENTRY
///
/// Everything except `image_offset` is passed through to the output untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub bytes_in_res: u32,
    pub image_offset: u32,
}

impl IcoDirEntry {
    fn parse(raw: &[u8]) -> Self {
        IcoDirEntry {
            width: raw[0],
            height: raw[1],
            color_count: raw[2],
            reserved: raw[3],
            planes: read_u16(raw, 4),
            bit_count: read_u16(raw, 6),
            bytes_in_res: read_u32(raw, 8),
            image_offset: read_u32(raw, 12),
        }
    }

    pub fn to_bytes(&self) -> [u8; ICO_DIR_ENTRY_LEN] {
        let mut out = [0u8; ICO_DIR_ENTRY_LEN];
        out[0] = self.width;
        out[1] = self.height;
        out[2] = self.color_count;
        out[3] = self.reserved;
        out[4..6].copy_from_slice(&self.planes.to_le_bytes());
        out[6..8].copy_from_slice(&self.bit_count.to_le_bytes());
        out[8..12].copy_from_slice(&self.bytes_in_res.to_le_bytes());
        out[12..16].copy_from_slice(&self.image_offset.to_le_bytes());
        out
    }

    /// Copy of this entry pointing at a new image offset
    pub fn relocated(&self, image_offset: u32) -> Self {
        IcoDirEntry {
            image_offset,
            ..*self
        }
    }
}

/// Parsed ICO file: header, ordered directory and one owned blob per entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoFile {
    pub header: IcoHeader,
    pub entries: Vec<IcoDirEntry>,
    pub blobs: Vec<Vec<u8>>,
}

impl IcoFile {
    /// Parse an ICO buffer, copying out every sub-image
    pub fn parse(bytes: &[u8]) -> Result<Self, PolyglotError> {
        if bytes.len() < ICO_HEADER_LEN {
            return Err(PolyglotError::Format(format!(
                "ICO header truncated ({} bytes)",
                bytes.len()
            )));
        }

        let header = IcoHeader {
            reserved: read_u16(bytes, 0),
            image_type: read_u16(bytes, 2),
            count: read_u16(bytes, 4),
        };
        debug!(?header, "ICO header");

        if header.reserved != 0 {
            return Err(PolyglotError::Format(format!(
                "ICONDIR.idReserved is {}, expected 0",
                header.reserved
            )));
        }
        if header.image_type != ICO_TYPE_ICON {
            return Err(PolyglotError::Format(format!(
                "ICONDIR.idType is {}, expected {}",
                header.image_type, ICO_TYPE_ICON
            )));
        }
        if header.count == 0 {
            return Err(PolyglotError::Format("ICO contains no images".into()));
        }

        let count = header.count as usize;
        let dir_end = ICO_HEADER_LEN + count * ICO_DIR_ENTRY_LEN;
        if dir_end > bytes.len() {
            return Err(PolyglotError::Format(format!(
                "ICO directory of {} entries needs {} bytes, file has {}",
                count,
                dir_end,
                bytes.len()
            )));
        }

        let mut entries = Vec::with_capacity(count);
        let mut blobs = Vec::with_capacity(count);

        for (i, raw) in bytes[ICO_HEADER_LEN..dir_end]
            .chunks_exact(ICO_DIR_ENTRY_LEN)
            .enumerate()
        {
            let entry = IcoDirEntry::parse(raw);
            check_entry(i, &entry);

            let start = entry.image_offset as u64;
            let end = start + entry.bytes_in_res as u64;
            if end > bytes.len() as u64 {
                return Err(PolyglotError::Format(format!(
                    "image {} at {}+{} exceeds file size {}",
                    i,
                    entry.image_offset,
                    entry.bytes_in_res,
                    bytes.len()
                )));
            }

            let blob = bytes[start as usize..end as usize].to_vec();
            if blob.starts_with(PNG_SIGNATURE) {
                debug!(index = i, "image is PNG compressed");
            }
            debug!(index = i, ?entry, "ICO directory entry");

            entries.push(entry);
            blobs.push(blob);
        }

        Ok(IcoFile {
            header,
            entries,
            blobs,
        })
    }

    /// Bytes taken by the header plus the directory
    pub fn prefix_len(&self) -> usize {
        ICO_HEADER_LEN + self.entries.len() * ICO_DIR_ENTRY_LEN
    }

    pub fn blob_lens(&self) -> Vec<usize> {
        self.blobs.iter().map(Vec::len).collect()
    }
}

/// Oddities that are accepted but worth a warning
fn check_entry(index: usize, entry: &IcoDirEntry) {
    if entry.reserved != 0 && entry.reserved != 255 {
        warn!(index, reserved = entry.reserved, "bReserved should be 0 or 255");
    }
    if entry.planes > 1 {
        warn!(index, planes = entry.planes, "unexpected wPlanes value, is this a CUR file?");
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
