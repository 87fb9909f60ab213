//! Binary bundle container format.
//!
//! A bundle packages many named byte blobs plus lightweight metadata into one
//! self-describing buffer:
//!
//! ```text
//! magic | u32 total length | u32 checksum | entry*
//! entry = u16 name len | name | u8 type len | type | u32 mtime (s) | u32 size | content
//! ```
//!
//! All fixed-width fields are big-endian. Two header families exist, differing
//! only in magic length; the header size is derived from the magic, never
//! hard-coded. The checksum is a streaming CRC-32 accumulated over every
//! entry's name, type, (mtime, size) pair, and content, in insertion order.
//! It exists so a consumer can ask "did this bundle change"; decoding does
//! not re-verify it (see [`Bundle::verify`]).

mod decode;
mod encode;

pub use decode::Bundle;
pub use encode::encode;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// The observed header families. The header is `magic.len() + 8` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicFamily {
    /// 11-byte magic, 19-byte header.
    Archive,
    /// 10-byte magic, 18-byte header.
    Hot,
}

impl MagicFamily {
    /// The magic literal that opens a bundle of this family.
    pub fn magic(self) -> &'static [u8] {
        match self {
            MagicFamily::Archive => b"ESM_ARCHIVE",
            MagicFamily::Hot => b"HOT_BUNDLE",
        }
    }

    /// Header length: magic + u32 total length + u32 checksum.
    pub fn header_len(self) -> usize {
        self.magic().len() + 8
    }

    /// Detect the family from the start of a buffer.
    pub fn detect(buf: &[u8]) -> Option<Self> {
        [MagicFamily::Archive, MagicFamily::Hot]
            .into_iter()
            .find(|family| buf.starts_with(family.magic()))
    }
}

/// One named blob inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique key within the bundle; at most 65535 UTF-8 bytes.
    pub name: String,
    /// Media type of the content; at most 255 UTF-8 bytes.
    pub media_type: String,
    /// Modification time, truncated to second resolution on encode.
    pub last_modified: Option<DateTime<Utc>>,
    /// Raw content bytes; at most `u32::MAX` bytes.
    pub content: Bytes,
}

impl Entry {
    /// Convenience constructor for an entry without a modification time.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self { name: name.into(), media_type: media_type.into(), last_modified: None, content: content.into() }
    }
}
