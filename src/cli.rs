use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use marketplace::Config;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "gigboard", version)]
#[command(about = "Serve the users, orders and offers API")]
pub struct Cli {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8000")]
    bind_address: String,

    /// Directory holding users.json, orders.json and offers.json
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Start with empty collections
    #[arg(long, env = "SKIP_FIXTURES")]
    skip_fixtures: bool,

    /// Pool size for file-backed databases
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            database_url: self.database_url,
            bind_address: self.bind_address,
            data_dir: self.data_dir,
            seed_fixtures: !self.skip_fixtures,
            max_connections: self.max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    /// Parses `args` with every env fallback unset, so the result does not
    /// depend on the shell the tests run in.
    fn parse_without_env(args: &[&str]) -> Cli {
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args.iter().copied())
            .unwrap();
        Cli::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = parse_without_env(&["gigboard"]);
        assert_eq!(cli.log_format, LogFormat::Text);

        let config = cli.into_config();
        let expected = Config::default();
        assert_eq!(config.database_url, expected.database_url);
        assert_eq!(config.bind_address, expected.bind_address);
        assert_eq!(config.data_dir, expected.data_dir);
        assert_eq!(config.seed_fixtures, expected.seed_fixtures);
        assert_eq!(config.max_connections, expected.max_connections);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse_without_env(&[
            "gigboard",
            "--database-url",
            "sqlite://gigboard.db",
            "--skip-fixtures",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);

        let config = cli.into_config();
        assert_eq!(config.database_url, "sqlite://gigboard.db");
        assert!(!config.seed_fixtures);
        assert!(!config.is_in_memory());
    }
}
