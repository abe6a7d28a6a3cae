pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub use logging::ARG_VERBOSITY;

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("skribo")
        .about("Blogging platform backend")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("SKRIBO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("MongoDB connection string")
                .env("SKRIBO_DSN")
                .required(true),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .help("MongoDB database name")
                .default_value("skribo")
                .env("SKRIBO_DATABASE"),
        )
        .arg(
            Arg::new("secret-key")
                .long("secret-key")
                .help("Secret used to sign access and refresh tokens")
                .env("SKRIBO_SECRET_KEY")
                .required(true),
        )
        .arg(
            Arg::new("token-algorithm")
                .long("token-algorithm")
                .help("Token signing algorithm, example: HS256")
                .default_value("HS256")
                .env("SKRIBO_TOKEN_ALGORITHM"),
        )
        .arg(
            Arg::new("access-token-ttl-minutes")
                .long("access-token-ttl-minutes")
                .help("Access token lifetime in minutes")
                .default_value("60")
                .env("SKRIBO_ACCESS_TOKEN_TTL_MINUTES")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("refresh-token-ttl-days")
                .long("refresh-token-ttl-days")
                .help("Refresh token lifetime in days")
                .default_value("7")
                .env("SKRIBO_REFRESH_TOKEN_TTL_DAYS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("reply-cap")
                .long("reply-cap")
                .help("Maximum number of embedded replies per comment")
                .default_value("100")
                .env("SKRIBO_REPLY_CAP")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("reaction-cap")
                .long("reaction-cap")
                .help("Maximum number of distinct reacting users per post")
                .default_value("100")
                .env("SKRIBO_REACTION_CAP")
                .value_parser(clap::value_parser!(u32).range(1..)),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "skribo");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Blogging platform backend"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_dsn() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "skribo",
            "--port",
            "8080",
            "--dsn",
            "mongodb://localhost:27017",
            "--secret-key",
            "long-long-long-secret-key",
        ]);

        assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(8080));
        assert_eq!(
            matches.get_one::<String>("dsn").map(|s| s.to_string()),
            Some("mongodb://localhost:27017".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("database").map(|s| s.to_string()),
            Some("skribo".to_string())
        );
        assert_eq!(
            matches
                .get_one::<String>("token-algorithm")
                .map(|s| s.to_string()),
            Some("HS256".to_string())
        );
        assert_eq!(
            matches.get_one::<i64>("access-token-ttl-minutes").copied(),
            Some(60)
        );
        assert_eq!(
            matches.get_one::<i64>("refresh-token-ttl-days").copied(),
            Some(7)
        );
        assert_eq!(matches.get_one::<u32>("reply-cap").copied(), Some(100));
        assert_eq!(matches.get_one::<u32>("reaction-cap").copied(), Some(100));
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("SKRIBO_PORT", Some("443")),
                ("SKRIBO_DSN", Some("mongodb://localhost:27017/skribo")),
                ("SKRIBO_SECRET_KEY", Some("secret")),
                ("SKRIBO_DATABASE", Some("blog")),
                ("SKRIBO_ACCESS_TOKEN_TTL_MINUTES", Some("15")),
                ("SKRIBO_REFRESH_TOKEN_TTL_DAYS", Some("30")),
                ("SKRIBO_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["skribo"]);
                assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(443));
                assert_eq!(
                    matches.get_one::<String>("dsn").map(|s| s.to_string()),
                    Some("mongodb://localhost:27017/skribo".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("database").map(|s| s.to_string()),
                    Some("blog".to_string())
                );
                assert_eq!(
                    matches.get_one::<i64>("access-token-ttl-minutes").copied(),
                    Some(15)
                );
                assert_eq!(
                    matches.get_one::<i64>("refresh-token-ttl-days").copied(),
                    Some(30)
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("SKRIBO_LOG_LEVEL", Some(level)),
                    ("SKRIBO_DSN", Some("mongodb://localhost:27017")),
                    ("SKRIBO_SECRET_KEY", Some("secret")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["skribo"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").map(|s| *s),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("SKRIBO_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "skribo".to_string(),
                    "--dsn".to_string(),
                    "mongodb://localhost:27017".to_string(),
                    "--secret-key".to_string(),
                    "secret".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
