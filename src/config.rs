use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::ClassCalendar;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub jwt_secret: String,

    // Rate limiting
    pub rate_read_per_min: u32,
    pub rate_write_per_min: u32,
    pub rate_auth_per_min: u32,

    pub api_prefix: String,
    pub auth_prefix: String,
    pub log_dir: String,

    /// Term schedule used by the attendance overview
    pub class_calendar: ClassCalendar,
}

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Read before the subscriber exists, so nothing here may log.
pub fn log_dir_from_env() -> String {
    env_or("LOG_DIR", DEFAULT_LOG_DIR)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let class_calendar = match env::var("CLASS_DATES") {
            Ok(raw) => ClassCalendar::parse(&raw).context("CLASS_DATES is invalid")?,
            Err(_) => ClassCalendar::default(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            server_addr: load_or("SERVER_ADDR", "127.0.0.1:8080")?,
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, instructor sessions will not survive a restart");
                Uuid::new_v4().to_string()
            }),

            rate_read_per_min: load_or("RATE_READ_PER_MIN", "600")?,
            rate_write_per_min: load_or("RATE_WRITE_PER_MIN", "120")?,
            rate_auth_per_min: load_or("RATE_AUTH_PER_MIN", "30")?,

            api_prefix: load_or("API_PREFIX", "/api")?,
            auth_prefix: load_or("AUTH_PREFIX", "/auth")?,
            log_dir: log_dir_from_env(),

            class_calendar,
        })
    }
}

fn load_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {key} value {raw:?}: {e}"))
}
