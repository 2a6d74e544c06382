//! Application settings, loaded from `khayr.toml` plus `KHAYR__*`
//! environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (trace|debug|info|warn|error).
    pub level: String,
}

/// Database backend.
///
/// TOML: `database = "memory"` or `database = { sqlite = "khayr.db" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("khayr").required(false))
            .add_source(Environment::with_prefix("KHAYR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
