use dotenv::dotenv;
use log::info;
use std::env;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{0} is not a valid number: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| {
            info!("BIND_ADDRESS not set, using default: {}", DEFAULT_BIND_ADDRESS);
            DEFAULT_BIND_ADDRESS.to_string()
        });

        let token_ttl_hours = match env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("TOKEN_TTL_HOURS", raw))?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            token_ttl_hours,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}
