//! Bundle serialization.

use super::{Entry, MagicFamily};
use crate::Error;
use bytes::Bytes;

const MAX_NAME_LEN: usize = u16::MAX as usize;
const MAX_TYPE_LEN: usize = u8::MAX as usize;
const MAX_CONTENT_LEN: usize = u32::MAX as usize;

/// Encode entries into a self-describing bundle buffer.
///
/// The checksum is accumulated in the same linear pass that serializes the
/// entries, over each entry's name bytes, type bytes, the 8-byte
/// (mtime, content length) pair, and content bytes, in insertion order.
/// A repeated name is written as-is; decoding applies last-write-wins.
///
/// # Errors
///
/// Returns `Error::Encode` if an entry's name, media type, or content exceeds
/// its field width, or if the total length does not fit in a u32.
pub fn encode(entries: &[Entry], family: MagicFamily) -> Result<Bytes, Error> {
    let magic = family.magic();
    let mut total = family.header_len();
    for entry in entries {
        if entry.name.len() > MAX_NAME_LEN {
            return Err(Error::Encode(format!("entry name exceeds {MAX_NAME_LEN} bytes: {}", entry.name.len())));
        }
        if entry.media_type.len() > MAX_TYPE_LEN {
            return Err(Error::Encode(format!(
                "entry media type exceeds {MAX_TYPE_LEN} bytes: {}",
                entry.media_type.len()
            )));
        }
        if entry.content.len() > MAX_CONTENT_LEN {
            return Err(Error::Encode(format!("entry content exceeds {MAX_CONTENT_LEN} bytes")));
        }
        total += 2 + entry.name.len() + 1 + entry.media_type.len() + 8 + entry.content.len();
    }
    let declared =
        u32::try_from(total).map_err(|_| Error::Encode(format!("total bundle length exceeds u32: {total}")))?;

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(magic);
    buf.extend_from_slice(&declared.to_be_bytes());
    buf.extend_from_slice(&[0u8; 4]); // checksum, patched below

    let mut hasher = crc32fast::Hasher::new();
    for entry in entries {
        let name = entry.name.as_bytes();
        let media_type = entry.media_type.as_bytes();
        let mtime = entry.last_modified.map_or(0, |t| t.timestamp().clamp(0, i64::from(u32::MAX)) as u32);
        let size = entry.content.len() as u32;
        let mut meta = [0u8; 8];
        meta[..4].copy_from_slice(&mtime.to_be_bytes());
        meta[4..].copy_from_slice(&size.to_be_bytes());

        buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
        buf.extend_from_slice(name);
        buf.push(media_type.len() as u8);
        buf.extend_from_slice(media_type);
        buf.extend_from_slice(&meta);
        buf.extend_from_slice(&entry.content);

        hasher.update(name);
        hasher.update(media_type);
        hasher.update(&meta);
        hasher.update(&entry.content);
    }

    let checksum = hasher.finalize();
    buf[magic.len() + 4..magic.len() + 8].copy_from_slice(&checksum.to_be_bytes());
    Ok(Bytes::from(buf))
}
