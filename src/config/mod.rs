use anyhow::Result;
use chrono::FixedOffset;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Seed data generated at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Fixed RNG seed for reproducible data; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_transaction_count")]
    pub transaction_count: usize,

    #[serde(default = "default_history_months")]
    pub history_months: u32,
}

/// Mock login
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

/// Time zone used for day boundaries and hour-of-day buckets.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LocaleConfig {
    /// IANA zone name (e.g. "Europe/Prague"). Takes precedence over the offset.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Fixed UTC offset in minutes (e.g. 60 for CET). System local time when
    /// neither is set.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Resolved dashboard time zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
    Local,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_transaction_count() -> usize {
    500
}
fn default_history_months() -> u32 {
    3
}
fn default_min_password_len() -> usize {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed: None,
            transaction_count: default_transaction_count(),
            history_months: default_history_months(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

impl LocaleConfig {
    /// Named zone, then fixed offset, then the system zone. Unparseable values
    /// are skipped with a warning.
    pub fn zone(&self) -> Zone {
        if let Some(name) = &self.timezone {
            match name.trim().parse::<Tz>() {
                Ok(tz) => return Zone::Named(tz),
                Err(e) => warn!("Ignoring invalid locale.timezone = {:?}: {}", name, e),
            }
        }
        if let Some(minutes) = self.utc_offset_minutes {
            match minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
                Some(offset) => return Zone::Fixed(offset),
                None => warn!("Ignoring invalid locale.utc_offset_minutes = {}", minutes),
            }
        }
        Zone::Local
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
