use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        database: matches
            .get_one("database")
            .map(|s: &String| s.to_string())
            .unwrap_or_else(|| "skribo".to_string()),
        secret_key: matches
            .get_one("secret-key")
            .map(|s: &String| SecretString::from(s.to_string()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --secret-key"))?,
        token_algorithm: matches
            .get_one("token-algorithm")
            .map(|s: &String| s.to_string())
            .unwrap_or_else(|| "HS256".to_string()),
        access_token_ttl_minutes: matches
            .get_one::<i64>("access-token-ttl-minutes")
            .copied()
            .unwrap_or(60),
        refresh_token_ttl_days: matches
            .get_one::<i64>("refresh-token-ttl-days")
            .copied()
            .unwrap_or(7),
        reply_cap: matches.get_one::<u32>("reply-cap").copied().unwrap_or(100),
        reaction_cap: matches
            .get_one::<u32>("reaction-cap")
            .copied()
            .unwrap_or(100),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "skribo",
            "--dsn",
            "mongodb://localhost:27017",
            "--secret-key",
            "long-long-long-secret-key",
            "--reply-cap",
            "50",
        ]);

        let action = handler(&matches).expect("action");
        let Action::Server {
            port,
            dsn,
            database,
            secret_key,
            token_algorithm,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            reply_cap,
            reaction_cap,
        } = action;

        assert_eq!(port, 8080);
        assert_eq!(dsn, "mongodb://localhost:27017");
        assert_eq!(database, "skribo");
        assert_eq!(secret_key.expose_secret(), "long-long-long-secret-key");
        assert_eq!(token_algorithm, "HS256");
        assert_eq!(access_token_ttl_minutes, 60);
        assert_eq!(refresh_token_ttl_days, 7);
        assert_eq!(reply_cap, 50);
        assert_eq!(reaction_cap, 100);
    }
}
