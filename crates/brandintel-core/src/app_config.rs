use std::net::SocketAddr;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Origins the dashboard runs on during local work; always allowed.
pub const LOCAL_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3000",
];

/// Immutable process configuration, built once in `main` and passed down.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Url,
    pub database_key: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub db_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url.as_str())
            .field("database_key", &"[redacted]")
            .field("allowed_origins", &self.allowed_origins)
            .field("db_timeout_secs", &self.db_timeout_secs)
            .finish()
    }
}
