//! Fetch interception types and lookup-key derivation.

use url::Url;

/// Content type used for every module served from the in-memory index.
pub const MODULE_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
}

/// A response answered synchronously from the in-memory index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: String,
    pub content_type: &'static str,
}

/// Derive the module index lookup key for a request: the URL path when the
/// request is same-origin with the controller, the full URL otherwise.
pub fn lookup_key(url: &Url, origin: &Url) -> String {
    if url.origin() == origin.origin() {
        url.path().to_string()
    } else {
        url.as_str().to_string()
    }
}
