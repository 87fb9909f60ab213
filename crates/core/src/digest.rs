//! Content digests for staleness detection.
//!
//! A digest answers one question cheaply: "did this payload change since the
//! last one we accepted?". It is compared, never re-verified against content.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

/// Compute the digest of a raw ingestion payload: base64(SHA-256(bytes)).
pub fn payload_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_stability() {
        let a = payload_digest(b"{\"/app.js\":\"x=1\"}");
        let b = payload_digest(b"{\"/app.js\":\"x=1\"}");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_sensitivity() {
        let a = payload_digest(b"{\"/app.js\":\"x=1\"}");
        let b = payload_digest(b"{\"/app.js\":\"x=2\"}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_is_base64_sha256() {
        // 32 bytes of SHA-256 encode to 44 base64 characters with padding.
        let d = payload_digest(b"");
        assert_eq!(d.len(), 44);
        assert_eq!(d, "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }
}
