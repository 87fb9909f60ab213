//! Bundle parsing and zero-copy reads.

use super::{Entry, MagicFamily};
use crate::Error;
use bytes::Bytes;
use chrono::DateTime;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct EntryMeta {
    media_type: String,
    mtime: u32,
    offset: usize,
    size: usize,
}

/// An immutable decoded bundle.
///
/// Holds the raw buffer and a name→metadata index; entry content is never
/// copied out of the buffer. A repeated name overwrites the earlier one
/// (last-write-wins).
#[derive(Debug, Clone)]
pub struct Bundle {
    buf: Bytes,
    family: MagicFamily,
    checksum: u32,
    index: HashMap<String, EntryMeta>,
}

impl Bundle {
    /// Parse a bundle buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` if the buffer is shorter than the header, the
    /// magic matches no known family, the declared total length disagrees with
    /// the buffer length, or any record is truncated.
    pub fn decode(buf: Bytes) -> Result<Self, Error> {
        let family = MagicFamily::detect(&buf).ok_or_else(|| Error::Format("unknown magic".to_string()))?;
        let header = family.header_len();
        if buf.len() < header {
            return Err(Error::Format(format!("buffer shorter than {header}-byte header")));
        }
        let magic_len = family.magic().len();
        let declared = read_u32(&buf, magic_len)?;
        if declared as usize != buf.len() {
            return Err(Error::Format(format!("declared length {declared} != buffer length {}", buf.len())));
        }
        let checksum = read_u32(&buf, magic_len + 4)?;

        let mut index = HashMap::new();
        let mut offset = header;
        while offset < buf.len() {
            let name_len = read_u16(&buf, offset)? as usize;
            offset += 2;
            let name = read_str(&buf, offset, name_len)?;
            offset += name_len;
            let type_len = *buf.get(offset).ok_or_else(truncated)? as usize;
            offset += 1;
            let media_type = read_str(&buf, offset, type_len)?;
            offset += type_len;
            let mtime = read_u32(&buf, offset)?;
            offset += 4;
            let size = read_u32(&buf, offset)? as usize;
            offset += 4;
            // offset <= buf.len() after the reads above; phrased as a
            // subtraction so a huge declared size cannot overflow the check
            if size > buf.len() - offset {
                return Err(truncated());
            }
            index.insert(name, EntryMeta { media_type, mtime, offset, size });
            offset += size;
        }

        Ok(Self { buf, family, checksum, index })
    }

    /// The header family this bundle was encoded with.
    pub fn family(&self) -> MagicFamily {
        self.family
    }

    /// The checksum stored at encode time, for external comparison only.
    /// Decoding never recomputes it; callers needing integrity verification
    /// must call [`Bundle::verify`].
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Zero-copy content lookup by name.
    pub fn read_file(&self, name: &str) -> Option<Bytes> {
        let meta = self.index.get(name)?;
        Some(self.buf.slice(meta.offset..meta.offset + meta.size))
    }

    /// Materialize a full entry; the content remains a zero-copy slice.
    pub fn entry(&self, name: &str) -> Option<Entry> {
        let meta = self.index.get(name)?;
        Some(Entry {
            name: name.to_string(),
            media_type: meta.media_type.clone(),
            last_modified: (meta.mtime != 0).then(|| DateTime::from_timestamp(i64::from(meta.mtime), 0)).flatten(),
            content: self.buf.slice(meta.offset..meta.offset + meta.size),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entry names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Recompute the checksum over the raw records and compare it with the
    /// stored value. Opt-in: the fast path trusts the producer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` on mismatch.
    pub fn verify(&self) -> Result<(), Error> {
        let mut hasher = crc32fast::Hasher::new();
        let mut offset = self.family.header_len();
        // The buffer already parsed once, so the walk cannot run out of bounds.
        while offset < self.buf.len() {
            let name_len = read_u16(&self.buf, offset)? as usize;
            offset += 2;
            hasher.update(&self.buf[offset..offset + name_len]);
            offset += name_len;
            let type_len = self.buf[offset] as usize;
            offset += 1;
            hasher.update(&self.buf[offset..offset + type_len]);
            offset += type_len;
            hasher.update(&self.buf[offset..offset + 8]);
            let size = read_u32(&self.buf, offset + 4)? as usize;
            offset += 8;
            hasher.update(&self.buf[offset..offset + size]);
            offset += size;
        }
        let computed = hasher.finalize();
        if computed != self.checksum {
            return Err(Error::Format(format!("checksum mismatch: stored {:#010x}, computed {computed:#010x}", self.checksum)));
        }
        Ok(())
    }
}

fn truncated() -> Error {
    Error::Format("truncated record".to_string())
}

fn read_u16(buf: &[u8], offset: usize) -> Result<u16, Error> {
    let bytes = buf.get(offset..offset + 2).ok_or_else(truncated)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, Error> {
    let bytes = buf.get(offset..offset + 4).ok_or_else(truncated)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_str(buf: &[u8], offset: usize, len: usize) -> Result<String, Error> {
    let bytes = buf.get(offset..offset + len).ok_or_else(truncated)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::Format("invalid utf-8 in header field".to_string()))
}
