use sha2::{Digest, Sha256};

/// Deterministic fingerprint for a piece of content, derived from its
/// source name and URL. Used to deduplicate cross-source URL collisions
/// and to give sample content a stable identity across cycles.
#[must_use]
pub fn content_fingerprint(source: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    // First 16 bytes are plenty for collision resistance at this scale.
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
