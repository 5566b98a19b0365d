//! Process configuration, read once from the environment at startup.

use std::str::FromStr;

use crate::api::ApiServerConfig;
use crate::delivery::DEFAULT_API_BASE;
use crate::{Error, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:hookrelay.db?mode=rwc";
const DEFAULT_AUDIT_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub discord_token: String,
    pub discord_api_base: String,
    pub server: ApiServerConfig,
    /// Base URL used in "View logs at" links.
    pub public_url: String,
    pub log_dir: Option<String>,
    /// 0 keeps audit entries forever.
    pub audit_retention_days: u32,
    pub admin_token: Option<String>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN")
            .ok_or_else(|| Error::config("DISCORD_TOKEN must be set"))?;

        let defaults = ApiServerConfig::default();
        let port = parse_or(get("API_PORT"), "API_PORT", defaults.port)?;
        let server = ApiServerConfig {
            bind_address: get("API_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            body_limit: parse_or(get("BODY_LIMIT_BYTES"), "BODY_LIMIT_BYTES", defaults.body_limit)?,
        };

        let public_url = get("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            discord_token,
            discord_api_base: get("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            server,
            public_url,
            log_dir: get("LOG_DIR"),
            audit_retention_days: parse_or(
                get("AUDIT_RETENTION_DAYS"),
                "AUDIT_RETENTION_DAYS",
                DEFAULT_AUDIT_RETENTION_DAYS,
            )?,
            admin_token: get("ADMIN_TOKEN"),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("{key}: invalid value {raw:?}: {e}"))),
    }
}
