use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use std::{env, time::Duration};

/// Application server keys used to sign push requests.
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// Uncompressed P-256 public key, base64url
    pub public_key: String,
    /// Raw 32-byte P-256 private scalar, base64url
    pub private_key: String,
    /// `mailto:` or `https:` contact for the push service
    pub subject: String,
}

/// Configuration for the scheduled notification jobs.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Database connection URL (required)
    pub database_url: String,
    /// `None` disables push delivery; the jobs still run
    pub vapid: Option<VapidConfig>,
    /// Wall clock for users without their own timezone preference
    pub timezone: Tz,
    pub reminder_interval: Duration,
    pub hydration_interval: Duration,
    /// How often profiles are checked for a local date change
    pub rollover_interval: Duration,
    /// Whether the `orbit` server binary should run the jobs in-process
    pub enabled: bool,
}

pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:admin@orbit.local";

impl NotifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| eyre!("DATABASE_URL environment variable not set"))?;

        let vapid = match (env::var("VAPID_PUBLIC_KEY"), env::var("VAPID_PRIVATE_KEY")) {
            (Ok(public_key), Ok(private_key)) if !public_key.is_empty() && !private_key.is_empty() => {
                Some(VapidConfig {
                    public_key,
                    private_key,
                    subject: env::var("VAPID_SUBJECT")
                        .unwrap_or_else(|_| DEFAULT_VAPID_SUBJECT.to_string()),
                })
            }
            _ => None,
        };

        let timezone = parse_timezone(&env::var("ORBIT_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()))?;

        let enabled = env::var("NOTIFIER_ENABLED")
            .map(|value| parse_flag(&value))
            .unwrap_or(Ok(true))
            .wrap_err("Invalid NOTIFIER_ENABLED value")?;

        Ok(Self {
            database_url,
            vapid,
            timezone,
            reminder_interval: Duration::from_secs(60),
            hydration_interval: Duration::from_secs(2 * 60 * 60),
            rollover_interval: Duration::from_secs(5 * 60),
            enabled,
        })
    }
}

/// Parses an IANA timezone name such as "Asia/Kolkata".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| eyre!("Invalid timezone {}: {}", name, e))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(eyre!("expected a boolean, got {}", other)),
    }
}
