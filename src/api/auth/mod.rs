//! Authentication: credential hashing, token lifecycle, and request guards.
//!
//! The pieces are layered the way requests flow through them:
//!
//! - [`credentials`] owns password hashing and verification (bcrypt).
//! - [`token`] issues and validates the signed access/refresh tokens. Every
//!   token embeds the user's session epoch; a token whose epoch no longer
//!   matches the user's current value is permanently invalid even while its
//!   signature and expiry are fine.
//! - [`guard`] extracts the bearer token from a request, validates it, and
//!   resolves the acting [`crate::api::models::User`] for handlers.
//!   Identity is always passed explicitly, never through ambient state.

pub mod credentials;
pub mod guard;
pub mod state;
pub mod token;

pub use guard::{optional_user, require_user};
pub use state::AuthConfig;
pub use token::{TokenClaims, TokenKind};
