//! Settings of the `balance` binary.
//!
//! Values are layered: built-in defaults, then the TOML file passed with
//! `--config` (default `config/balance.toml`, optional), then environment
//! variables such as `BALANCE__SERVER__PORT=9000`.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/balance.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level applied to the workspace crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    /// CORS allow-list; `"*"` allows any origin.
    pub allow_origins: Vec<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            allow_origins: vec!["*".to_string()],
        }
    }
}

/// Either `database = "memory"` or `[database] sqlite = "<path>"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("balance.db".to_string())
    }
}

impl Database {
    /// Connection URL; file databases are created when missing.
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

#[derive(Debug, Parser)]
#[command(name = "balance", version, about = "Shared-expense debt ledger server")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long, env = "BALANCE_CONFIG")]
    config: Option<String>,
    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,
}

fn environment() -> Environment {
    Environment::with_prefix("BALANCE")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.allow_origins")
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let config = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(environment())
            .build()?;
        let mut settings = Self::from_config(config)?;

        if let Some(bind) = args.bind {
            settings.server.bind = bind;
        }
        if let Some(port) = args.port {
            settings.server.port = port;
        }

        Ok(settings)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}
