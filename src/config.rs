use phonenumber::country::Id as CountryId;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Seed for metric series when a request does not pass one.
    pub metrics_seed: u64,
    /// Length of the dashboard's default date range, ending today.
    pub default_range_days: u32,
    /// Longest date range a request may ask for, in days.
    pub max_range_days: u32,
    /// Reject status changes that move a lead backwards or out of a closed stage.
    pub enforce_forward_transitions: bool,
    /// Where session preferences are persisted. `None` keeps them in memory.
    pub preferences_path: Option<PathBuf>,
    /// Region used to read phone numbers written without a country code.
    pub phone_region: CountryId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            metrics_seed: 42,
            default_range_days: 30,
            max_range_days: 731,
            enforce_forward_transitions: false,
            preferences_path: None,
            phone_region: CountryId::US,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            metrics_seed: std::env::var("METRICS_SEED")
                .unwrap_or_else(|_| defaults.metrics_seed.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("METRICS_SEED must be an unsigned 64-bit integer"))?,
            default_range_days: std::env::var("DEFAULT_RANGE_DAYS")
                .unwrap_or_else(|_| defaults.default_range_days.to_string())
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("DEFAULT_RANGE_DAYS must be a number"))
                .and_then(|days| {
                    if !(1..=366).contains(&days) {
                        anyhow::bail!("DEFAULT_RANGE_DAYS must be between 1 and 366");
                    }
                    Ok(days)
                })?,
            max_range_days: std::env::var("MAX_RANGE_DAYS")
                .unwrap_or_else(|_| defaults.max_range_days.to_string())
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("MAX_RANGE_DAYS must be a number"))
                .and_then(|days| {
                    if !(1..=3660).contains(&days) {
                        anyhow::bail!("MAX_RANGE_DAYS must be between 1 and 3660");
                    }
                    Ok(days)
                })?,
            enforce_forward_transitions: std::env::var("ENFORCE_FORWARD_TRANSITIONS")
                .ok()
                .map(|raw| parse_flag(&raw))
                .transpose()?
                .unwrap_or(defaults.enforce_forward_transitions),
            preferences_path: std::env::var("PREFERENCES_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            phone_region: match std::env::var("PHONE_DEFAULT_REGION") {
                Ok(raw) => raw.trim().to_uppercase().parse::<CountryId>().map_err(|_| {
                    anyhow::anyhow!("PHONE_DEFAULT_REGION must be an ISO 3166 country code")
                })?,
                Err(_) => defaults.phone_region,
            },
        };

        if config.default_range_days > config.max_range_days {
            anyhow::bail!(
                "DEFAULT_RANGE_DAYS ({}) cannot exceed MAX_RANGE_DAYS ({})",
                config.default_range_days,
                config.max_range_days
            );
        }

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Metrics seed: {}", config.metrics_seed);
        tracing::debug!(
            "Default range: {} days (max {})",
            config.default_range_days,
            config.max_range_days
        );
        if config.enforce_forward_transitions {
            tracing::info!("Forward-only status transitions enforced");
        }
        if let Some(ref path) = config.preferences_path {
            tracing::info!("Preferences persisted to {}", path.display());
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean flag, got '{}'", other),
    }
}
