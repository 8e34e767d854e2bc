//! Configuration types, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "./data/profile-intake.db";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Service configuration.
#[derive(Debug)]
pub struct AppConfig {
    /// Port the HTTP server binds on all interfaces.
    pub port: u16,
    /// libSQL database file holding the wizard slot and submissions.
    pub db_path: PathBuf,
    /// Directory for the daily-rolling log file. Console only when unset.
    pub log_dir: Option<PathBuf>,
    /// Outbound mail. `None` means confirmations are only logged.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings for confirmation mail.
#[derive(Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_port(&lookup, "PROFILE_INTAKE_PORT", DEFAULT_PORT)?;
        let db_path = lookup("PROFILE_INTAKE_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let log_dir = lookup("PROFILE_INTAKE_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let smtp = SmtpConfig::from_lookup(&lookup)?;

        Ok(Self {
            port,
            db_path,
            log_dir,
            smtp,
        })
    }
}

impl SmtpConfig {
    /// Returns `Ok(None)` when `SMTP_HOST` is not set.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(host) = lookup("SMTP_HOST").filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };

        let port = parse_port(lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let username = lookup("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(lookup("SMTP_PASSWORD").unwrap_or_default());
        let from_address = match lookup("SMTP_FROM_ADDRESS") {
            Some(addr) if !addr.trim().is_empty() => addr,
            _ if !username.is_empty() => username.clone(),
            _ => return Err(ConfigError::MissingEnvVar("SMTP_FROM_ADDRESS".into())),
        };

        Ok(Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        }))
    }
}

fn parse_port(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u16,
) -> Result<u16, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?} is not a port number: {e}"),
            }),
    }
}
