use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Redis URL for the notification topic. Unset means in-process.
    pub redis_url: Option<String>,
    pub topic: String,
    pub static_dir: PathBuf,
    pub keepalive: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: load("BOARD_HOST", "0.0.0.0")?,
            port: load("BOARD_PORT", "8080")?,
            db_path: load::<String>("BOARD_DB_PATH", "board.db")?.into(),
            redis_url: env::var("BOARD_REDIS_URL").ok().filter(|s| !s.is_empty()),
            topic: load("BOARD_TOPIC", "notifications")?,
            static_dir: load::<String>("BOARD_STATIC_DIR", "static")?.into(),
            keepalive: keepalive_interval(load("BOARD_KEEPALIVE_SECS", "30")?)?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}

/// A zero interval would make every relay's ticker panic.
fn keepalive_interval(secs: u64) -> Result<Duration> {
    if secs == 0 {
        anyhow::bail!("Invalid BOARD_KEEPALIVE_SECS value '0': must be at least 1");
    }
    Ok(Duration::from_secs(secs))
}
