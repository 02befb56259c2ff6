//! Helpers for sanitizing data before it enters log lines and span attributes.
//!
//! Mail content is personal: these functions keep sender addresses, history
//! paths and message bodies out of traces while still allowing correlation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Keeps the domain of an email address and masks the local part.
///
/// - `"Jet Blue" <reservations@jetblue.com>` → `****@jetblue.com`
/// - `not-an-address` → `****`
pub fn redact_address(address: &str) -> String {
    let bare = match (address.rfind('<'), address.rfind('>')) {
        (Some(start), Some(end)) if start < end => &address[start + 1..end],
        _ => address,
    };
    match bare.rsplit_once('@') {
        Some((_, domain)) if !domain.trim().is_empty() => {
            format!("****@{}", domain.trim().to_lowercase())
        }
        _ => "****".to_string(),
    }
}

/// Returns a short deterministic hash of a value for correlation without
/// exposing the value itself.
pub fn short_hash(value: &str) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
