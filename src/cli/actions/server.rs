use crate::{
    api::{self, auth::AuthConfig, policy::PolicyLimits},
    cli::actions::Action,
};
use anyhow::{bail, Context, Result};
use url::Url;

/// Execute the server action.
/// # Errors
/// Returns an error if the token configuration is invalid, the database is
/// unreachable, or the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            database,
            secret_key,
            token_algorithm,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            reply_cap,
            reaction_cap,
        } => {
            let parsed = Url::parse(&dsn).context("Invalid MongoDB connection string")?;
            if !matches!(parsed.scheme(), "mongodb" | "mongodb+srv") {
                bail!("Unsupported DSN scheme: {}", parsed.scheme());
            }

            let auth_config = AuthConfig::new(secret_key, &token_algorithm)?
                .with_access_token_ttl_minutes(access_token_ttl_minutes)
                .with_refresh_token_ttl_days(refresh_token_ttl_days);

            let limits = PolicyLimits::new()
                .with_reply_cap(reply_cap)
                .with_reaction_cap(reaction_cap);

            api::new(port, &dsn, &database, auth_config, limits).await
        }
    }
}
