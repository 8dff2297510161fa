use std::path::PathBuf;

use thiserror::Error;

/// Placeholder session secrets that MUST NOT be used outside dev mode.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_SESSION_SECRET: &str = "dev-secret-change-me";
const DEFAULT_CLUB_SECRET: &str = "supersecret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("MEMBERS_SESSION_SECRET is unset or still a placeholder")]
    PlaceholderSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub session_days: i64,
    /// Shared code that unlocks membership.
    pub club_secret: String,
    /// Accounts promoted to admin at startup.
    pub admin_emails: Vec<String>,
    /// Allows the placeholder secret and drops the `Secure` cookie attribute.
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = parse("MEMBERS_PORT", get("MEMBERS_PORT", "3000"))?;
        let session_days: i64 = parse("MEMBERS_SESSION_DAYS", get("MEMBERS_SESSION_DAYS", "30"))?;
        if !(1..=3650).contains(&session_days) {
            return Err(ConfigError::Invalid {
                key: "MEMBERS_SESSION_DAYS",
                value: session_days.to_string(),
            });
        }

        let admin_emails = lookup("MEMBERS_ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let dev_mode = matches!(
            lookup("MEMBERS_DEV_MODE").as_deref(),
            Some("1") | Some("true") | Some("yes")
        );

        let config = Self {
            host: get("MEMBERS_HOST", "0.0.0.0"),
            port,
            db_path: get("MEMBERS_DB_PATH", "members.db").into(),
            session_secret: get("MEMBERS_SESSION_SECRET", DEFAULT_SESSION_SECRET),
            session_days,
            club_secret: get("MEMBERS_CLUB_SECRET", DEFAULT_CLUB_SECRET),
            admin_emails,
            dev_mode,
        };

        if !config.dev_mode && config.has_placeholder_secret() {
            return Err(ConfigError::PlaceholderSecret);
        }

        Ok(config)
    }

    /// Settings for tests and local runs.
    pub fn development() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            db_path: "members.db".into(),
            session_secret: DEFAULT_SESSION_SECRET.into(),
            session_days: 30,
            club_secret: DEFAULT_CLUB_SECRET.into(),
            admin_emails: Vec::new(),
            dev_mode: true,
        }
    }

    pub fn has_placeholder_secret(&self) -> bool {
        self.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session_secret.as_str())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
