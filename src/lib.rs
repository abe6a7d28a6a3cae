//! # Skribo (Blogging Platform Backend)
//!
//! `skribo` is the backend for a blogging platform: user registration and
//! authentication, posts, topics, comments with embedded replies, and
//! reactions, backed by MongoDB.
//!
//! ## Authentication & Sessions
//!
//! Authentication uses signed, self-contained bearer tokens (HMAC JWT).
//! Every token embeds the user's current *session epoch* (`random_str`); a
//! "logout from all devices" request rotates the epoch and permanently
//! invalidates every previously issued token without any revocation list.
//!
//! - **Access tokens** are short-lived (minutes) and are the only kind the
//!   authorization guard accepts.
//! - **Refresh tokens** are long-lived (days) and can only be exchanged for
//!   a fresh access token.
//!
//! ## Authorization
//!
//! Handlers resolve the acting identity explicitly through the guard and
//! consult the resource ownership policy before any mutation. Posts with a
//! future `publish_at` are visible only to their author; comments and
//! replies are mutable only by the user who wrote them.
//!
//! ## Storage Model
//!
//! Replies live embedded inside their comment document and reactions are a
//! per-post set of user ids. Both lists are capped, and the caps are
//! enforced with single conditional updates inside MongoDB so concurrent
//! requests cannot overshoot them.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
