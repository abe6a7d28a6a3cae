pub mod server;

use secrecy::SecretString;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        database: String,
        secret_key: SecretString,
        token_algorithm: String,
        access_token_ttl_minutes: i64,
        refresh_token_ttl_days: i64,
        reply_cap: u32,
        reaction_cap: u32,
    },
}
