//! Token signing configuration.

use anyhow::{Context, Result};
use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use std::str::FromStr;

const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;
const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Externally supplied signing material and token lifetimes.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    secret: SecretString,
    algorithm: Algorithm,
    access_token_ttl_minutes: i64,
    refresh_token_ttl_days: i64,
}

impl AuthConfig {
    /// Build a config from the raw secret and an algorithm identifier like `HS256`.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm identifier is unknown.
    pub fn new(secret: SecretString, algorithm: &str) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .with_context(|| format!("Unknown token algorithm: {algorithm}"))?;

        Ok(Self {
            secret,
            algorithm,
            access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
        })
    }

    #[must_use]
    pub fn with_access_token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_days = days;
        self
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn access_token_ttl_minutes(&self) -> i64 {
        self.access_token_ttl_minutes
    }

    #[must_use]
    pub const fn refresh_token_ttl_days(&self) -> i64 {
        self.refresh_token_ttl_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let config = AuthConfig::new(SecretString::from("secret".to_string()), "HS256")
            .expect("config")
            .with_access_token_ttl_minutes(15)
            .with_refresh_token_ttl_days(30);

        assert_eq!(config.algorithm(), Algorithm::HS256);
        assert_eq!(config.access_token_ttl_minutes(), 15);
        assert_eq!(config.refresh_token_ttl_days(), 30);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let result = AuthConfig::new(SecretString::from("secret".to_string()), "none");
        assert!(result.is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let config =
            AuthConfig::new(SecretString::from("super-secret".to_string()), "HS256").expect("config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
