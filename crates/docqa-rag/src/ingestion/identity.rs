//! Content-derived document identity

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a document ID (128 bits)
const ID_BYTES: usize = 16;

/// Length of a document ID in hex characters
pub const DOC_ID_LEN: usize = ID_BYTES * 2;

/// Compute the document ID for raw file bytes
///
/// SHA-256 truncated to 128 bits, lowercase hex. Same bytes always give the same ID.
pub fn identify(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..ID_BYTES])
}

/// Whether `id` has the shape of a document ID
pub fn is_doc_id(id: &str) -> bool {
    id.len() == DOC_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
