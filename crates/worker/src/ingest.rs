//! The page-to-controller ingestion envelope and its payload schema.
//!
//! Pages deliver bundles as a tuple of a fixed sentinel header plus a raw
//! byte buffer of UTF-8 JSON: a flat mapping from lookup key to module
//! source text. This is deliberately simpler than the binary bundle codec,
//! which is the build-to-server packaging format.

use bytes::Bytes;
use hotpack_core::Error;
use std::collections::HashMap;

/// Sentinel header that marks an ingestion message; anything else on the
/// message channel is ignored without a reply.
pub const INGEST_HEAD: u32 = 0x127;

/// One message posted by a page.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub head: u32,
    pub payload: Bytes,
}

impl Envelope {
    /// Wrap a raw payload with the ingestion sentinel.
    pub fn ingest(payload: impl Into<Bytes>) -> Self {
        Self { head: INGEST_HEAD, payload: payload.into() }
    }
}

/// Outcome of one ingestion, broadcast to every open page.
///
/// The wire form is a single integer on the fixed update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    /// Payload was malformed or the store rejected it; nothing changed.
    Failed,
    /// Payload was accepted but identical to the loaded bundle.
    Unchanged,
    /// The module cache was replaced.
    Updated,
}

impl IngestStatus {
    /// The integer broadcast to pages.
    pub fn code(self) -> u8 {
        match self {
            IngestStatus::Failed => 0,
            IngestStatus::Unchanged => 1,
            IngestStatus::Updated => 2,
        }
    }

    /// Decode a broadcast integer on the page side.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(IngestStatus::Failed),
            1 => Some(IngestStatus::Unchanged),
            2 => Some(IngestStatus::Updated),
            _ => None,
        }
    }
}

/// Decode an ingestion payload into the module mapping.
///
/// The payload must be UTF-8 JSON whose top level is an object with string
/// values only; any other shape is rejected.
///
/// # Errors
///
/// Returns `Error::IngestParse` for invalid JSON, a non-object top level,
/// or any non-string value.
pub fn parse_modules(payload: &[u8]) -> Result<HashMap<String, String>, Error> {
    serde_json::from_slice(payload).map_err(|e| Error::IngestParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_mapping() {
        let modules = parse_modules(br#"{"/app.js":"x=1","https://other.example/lib.js":"y=2"}"#).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules["/app.js"], "x=1");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(parse_modules(b"not json"), Err(Error::IngestParse(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(parse_modules(b"[1,2,3]"), Err(Error::IngestParse(_))));
        assert!(matches!(parse_modules(b"\"just a string\""), Err(Error::IngestParse(_))));
    }

    #[test]
    fn test_parse_rejects_non_string_values() {
        assert!(matches!(parse_modules(br#"{"/app.js":1}"#), Err(Error::IngestParse(_))));
        assert!(matches!(parse_modules(br#"{"/app.js":{"nested":"x"}}"#), Err(Error::IngestParse(_))));
    }

    #[test]
    fn test_status_codes() {
        for status in [IngestStatus::Failed, IngestStatus::Unchanged, IngestStatus::Updated] {
            assert_eq!(IngestStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(IngestStatus::from_code(3), None);
    }
}
