use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_storage() -> StorageKind {
    StorageKind::Postgres
}

fn default_port() -> u16 {
    5000
}

fn default_telemetry_service_name() -> String {
    "song-recommendations".to_string()
}

fn default_telemetry_service_version() -> String {
    "1.0.0".to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_max_connections", 5)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
