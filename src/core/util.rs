//! Common utilities

use xxhash_rust::xxh3::xxh3_64;

/// Stable 64-bit hex digest of bytes
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// File-name-safe form of a free-text label (spaces and symbols become '_')
pub fn slugify(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "_".to_string()
    } else {
        slug
    }
}
