use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// bearer token -> user id
    pub api_tokens: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://taskboard.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            Err(_) => 5,
        };

        let api_tokens = match env::var("API_TOKENS") {
            Ok(raw) => parse_token_map(&raw)?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            api_tokens,
        })
    }
}

/// Parses `token:user_id` pairs separated by commas.
pub fn parse_token_map(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (token, user_id) = entry.split_once(':').ok_or_else(|| ConfigError::Invalid {
            name: "API_TOKENS",
            reason: format!("expected token:user_id, got '{}'", entry),
        })?;

        let (token, user_id) = (token.trim(), user_id.trim());
        if token.is_empty() || user_id.is_empty() {
            return Err(ConfigError::Invalid {
                name: "API_TOKENS",
                reason: format!("empty token or user id in '{}'", entry),
            });
        }

        tokens.insert(token.to_string(), user_id.to_string());
    }

    Ok(tokens)
}
