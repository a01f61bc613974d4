//! Raw local-header inspection of an archive's first entries

use serde::Serialize;

const LOCAL_HEADER_SIGNATURE: &[u8; 4] = b"PK\x03\x04";
const LOCAL_HEADER_LEN: usize = 30;
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Compression method "stored" in the ZIP format
pub const METHOD_STORED: u16 = 0;

/// Fields of one local file header, read straight from the archive bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryHeader {
    /// Offset of the header in the archive
    pub offset: usize,

    /// Entry name as stored
    pub name: String,

    /// ZIP compression method (0 = stored, 8 = deflated)
    pub method: u16,

    /// Compressed size declared in the header
    pub compressed_size: u32,
}

impl EntryHeader {
    pub fn is_stored(&self) -> bool {
        self.method == METHOD_STORED
    }
}

fn u16_at(bytes: &[u8], at: usize) -> Option<u16> {
    bytes.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn u32_at(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read up to `count` local file headers from the start of `bytes`.
///
/// Stops early at anything that is not a local header, or at an entry
/// whose sizes live in a trailing data descriptor (the next header cannot
/// be located without decompressing).
pub fn leading_entries(bytes: &[u8], count: usize) -> Vec<EntryHeader> {
    let mut entries = Vec::new();
    let mut offset = 0usize;

    while entries.len() < count {
        if bytes.get(offset..offset + 4) != Some(&LOCAL_HEADER_SIGNATURE[..]) {
            break;
        }
        let (Some(flags), Some(method), Some(compressed_size), Some(name_len), Some(extra_len)) = (
            u16_at(bytes, offset + 6),
            u16_at(bytes, offset + 8),
            u32_at(bytes, offset + 18),
            u16_at(bytes, offset + 26),
            u16_at(bytes, offset + 28),
        ) else {
            break;
        };

        let name_start = offset + LOCAL_HEADER_LEN;
        let Some(name) = bytes.get(name_start..name_start + name_len as usize) else {
            break;
        };

        entries.push(EntryHeader {
            offset,
            name: String::from_utf8_lossy(name).into_owned(),
            method,
            compressed_size,
        });

        if flags & FLAG_DATA_DESCRIPTOR != 0 {
            break;
        }
        offset = name_start + name_len as usize + extra_len as usize + compressed_size as usize;
    }

    entries
}
