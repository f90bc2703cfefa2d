//! Document fingerprinting — deterministic identity of a compiled symphony.
//!
//! Compiling the same strategy twice must produce field-for-field identical
//! documents; the fingerprint makes that property checkable and lets batch
//! records detect identical re-deploys. The platform-assigned identifier is
//! never part of the hash because the compiler never emits one.

use serde_json::Value;

/// BLAKE3 hex digest of the canonical JSON serialization.
///
/// `serde_json::Value` objects keep sorted keys, so equal documents hash
/// equally regardless of construction order.
pub fn document_fingerprint(document: &Value) -> String {
    let canonical = document.to_string();
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}
