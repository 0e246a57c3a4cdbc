use clap::Parser;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings.toml";
/// One year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;
/// One week.
const MAX_PURGE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Where the ledger lives.
///
/// In TOML: `database = "memory"` or `database = { sqlite = "ledger.db" }`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::Sqlite("ledger.db".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    /// Run the revoked-token purge every N minutes; disabled when absent.
    pub purge_interval_minutes: Option<u64>,
}

impl Default for Auth {
    fn default() -> Self {
        let defaults = server::AuthSettings::default();
        Self {
            jwt_secret: defaults.jwt_secret,
            token_ttl_hours: defaults.token_ttl_hours,
            bcrypt_cost: defaults.bcrypt_cost,
            purge_interval_minutes: None,
        }
    }
}

impl From<&Auth> for server::AuthSettings {
    fn from(value: &Auth) -> Self {
        Self {
            jwt_secret: value.jwt_secret.clone(),
            token_ttl_hours: value.token_ttl_hours,
            bcrypt_cost: value.bcrypt_cost,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

#[derive(Debug, Parser)]
#[command(name = "ledger", version, about = "Personal finance ledger server")]
struct Args {
    /// Optional settings file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

impl Settings {
    /// Layers, lowest priority first: defaults, settings file, `LEDGER__*`
    /// environment variables, command line flags.
    pub fn new() -> Result<Self, config::ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings = Self::load(config_path)?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }
        if let Some(port) = args.port {
            settings.server.port = port;
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            return Err(config::ConfigError::Message(format!(
                "auth.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {}",
                self.auth.token_ttl_hours
            )));
        }
        if let Some(minutes) = self.auth.purge_interval_minutes
            && !(1..=MAX_PURGE_INTERVAL_MINUTES).contains(&minutes)
        {
            return Err(config::ConfigError::Message(format!(
                "auth.purge_interval_minutes must be between 1 and {MAX_PURGE_INTERVAL_MINUTES}, got {minutes}"
            )));
        }
        Ok(())
    }

    fn load(config_path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
