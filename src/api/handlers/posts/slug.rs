//! Slug derivation for posts and topics.
//!
//! Slugs are normalized to lowercase `a-z0-9-`; uniqueness is enforced by
//! the database index, with callers retrying under a random suffix on
//! collision.

use rand::Rng;

/// Normalizes user input into a URL-safe slug (`a-z0-9-`) within the provided length bounds.
/// Returns `None` when the normalized result is empty or outside `min..=max`.
/// Caller must still enforce uniqueness.
pub(crate) fn normalize_slug(input: &str, min: usize, max: usize) -> Option<String> {
    let mut slug = String::new();
    let mut prev_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-').to_string();
    if trimmed.is_empty() {
        return None;
    }
    let truncated: String = trimmed.chars().take(max).collect();
    let normalized = truncated.trim_matches('-').to_string();
    if normalized.len() < min || normalized.len() > max {
        return None;
    }
    Some(normalized)
}

const SLUG_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase alphanumeric suffix used to resolve slug collisions.
pub(crate) fn rand_slug_str(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SLUG_SUFFIX_CHARS[rng.gen_range(0..SLUG_SUFFIX_CHARS.len())] as char)
        .collect()
}

/// `base-xxxx` collision candidate; the suffix grows with each attempt.
pub(crate) fn with_rand_suffix(base: &str, attempt: usize) -> String {
    format!("{base}-{}", rand_slug_str(attempt))
}
