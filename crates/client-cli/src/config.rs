use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Accepted pickup lead times, up to one week
pub const LEAD_MINUTES_RANGE: RangeInclusive<i64> = 0..=10_080;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

/// How status lookups are sent to the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMethod {
    /// `GET /bookings/{id}/status?booking_id=..&phone=..`
    #[default]
    Get,
    /// `POST /bookings/status` with a JSON body
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub lookup_method: LookupMethod,
    /// Ping `/health` before every status update
    #[serde(default = "default_true")]
    pub preflight_health: bool,
}

/// Credential pair for the client-side admin check.
///
/// This check is not a security boundary: anyone holding the client holds
/// the credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Minimum distance between now and the requested pickup time
    #[serde(default = "default_min_lead_minutes")]
    pub min_lead_minutes: i64,
}

fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_timeout_secs() -> u64 { 15 }
fn default_true() -> bool { true }
fn default_min_lead_minutes() -> i64 { 30 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            lookup_method: LookupMethod::default(),
            preflight_health: true,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_lead_minutes: default_min_lead_minutes(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "taxi", "taxi")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        check_lead_minutes(config.booking.min_lead_minutes)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set a value by its dotted key, as used by `taxi config set`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" | "api_url" => self.api.base_url = value.trim_end_matches('/').to_string(),
            "api.timeout_secs" => self.api.timeout_secs = value.parse()?,
            "api.lookup_method" => {
                self.api.lookup_method = match value {
                    "get" => LookupMethod::Get,
                    "post" => LookupMethod::Post,
                    _ => anyhow::bail!("lookup_method must be 'get' or 'post'"),
                }
            }
            "api.preflight_health" => self.api.preflight_health = value.parse()?,
            "admin.username" => self.admin.username = value.to_string(),
            "admin.password" => self.admin.password = value.to_string(),
            "booking.min_lead_minutes" => {
                let minutes = value.parse()?;
                check_lead_minutes(minutes)?;
                self.booking.min_lead_minutes = minutes;
            }
            _ => anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, Self::KEYS.join(", ")),
        }
        Ok(())
    }

    /// Read a value by its dotted key; the admin password is masked
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api.base_url" | "api_url" => self.api.base_url.clone(),
            "api.timeout_secs" => self.api.timeout_secs.to_string(),
            "api.lookup_method" => match self.api.lookup_method {
                LookupMethod::Get => "get".to_string(),
                LookupMethod::Post => "post".to_string(),
            },
            "api.preflight_health" => self.api.preflight_health.to_string(),
            "admin.username" => self.admin.username.clone(),
            "admin.password" => "****".to_string(),
            "booking.min_lead_minutes" => self.booking.min_lead_minutes.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        };
        Ok(value)
    }

    pub const KEYS: [&'static str; 7] = [
        "api.base_url",
        "api.timeout_secs",
        "api.lookup_method",
        "api.preflight_health",
        "admin.username",
        "admin.password",
        "booking.min_lead_minutes",
    ];
}

fn check_lead_minutes(minutes: i64) -> Result<()> {
    if !LEAD_MINUTES_RANGE.contains(&minutes) {
        anyhow::bail!(
            "booking.min_lead_minutes must be between {} and {}",
            LEAD_MINUTES_RANGE.start(),
            LEAD_MINUTES_RANGE.end()
        );
    }
    Ok(())
}
