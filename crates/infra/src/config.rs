use eventhub_domain::Tz;
use eventhub_utils::create_random_secret;
use std::{convert::TryFrom, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret used to verify the json web tokens sent by clients
    pub jwt_secret: String,
    /// Origins allowed to call the api from a browser. When empty any
    /// origin is allowed.
    pub cors_origins: Vec<String>,
    /// How often the reminder scheduler checks for due reminders
    pub reminder_tick_interval_secs: u64,
    /// How far back from now the reminder scheduler looks for unsent reminders.
    /// Reminders that became due while the scheduler was paused for less
    /// than this are still delivered, older ones are skipped.
    pub reminder_lookback_secs: u64,
    /// Upper bound on a single notification delivery
    pub notifier_timeout_secs: u64,
    /// Settings for the http email gateway, notifications are only
    /// logged when this is missing
    pub email_gateway: Option<EmailGatewayConfig>,
    /// Timezone used when rendering times in notifications
    pub notification_timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct EmailGatewayConfig {
    pub url: String,
    pub api_key: String,
    pub from: String,
}

fn parse_env_or_default<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, val, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Longest supported pause between two reminder ticks
const MAX_TICK_INTERVAL_SECS: u64 = 60 * 60 * 24;

fn clamp_tick_interval(secs: u64) -> u64 {
    if secs == 0 || secs > MAX_TICK_INTERVAL_SECS {
        let clamped = secs.max(1).min(MAX_TICK_INTERVAL_SECS);
        warn!(
            "The given REMINDER_TICK_SECS: {} is out of range, using {}.",
            secs, clamped
        );
        clamped
    } else {
        secs
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

impl Config {
    pub fn new() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                info!("Did not find JWT_SECRET environment variable. Going to create one.");
                create_random_secret(32)
            }
        };

        let port = parse_env_or_default("PORT", 5001);

        let cors_origins = std::env::var("CORS_ORIGIN")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        let email_gateway = match std::env::var("EMAIL_GATEWAY_URL") {
            Ok(url) if !url.is_empty() => Some(EmailGatewayConfig {
                url,
                api_key: std::env::var("EMAIL_GATEWAY_API_KEY").unwrap_or_default(),
                from: std::env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@eventhub.local".into()),
            }),
            _ => {
                warn!("Did not find EMAIL_GATEWAY_URL environment variable. Reminder emails will only be logged.");
                None
            }
        };

        let notification_timezone = match std::env::var("NOTIFICATION_TIMEZONE") {
            Ok(tz) => tz.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    "The given NOTIFICATION_TIMEZONE: {} is not valid, falling back to UTC.",
                    tz
                );
                Tz::UTC
            }),
            Err(_) => Tz::UTC,
        };

        Self {
            port,
            jwt_secret,
            cors_origins,
            reminder_tick_interval_secs: clamp_tick_interval(parse_env_or_default(
                "REMINDER_TICK_SECS",
                60,
            )),
            reminder_lookback_secs: parse_env_or_default("REMINDER_LOOKBACK_SECS", 120),
            notifier_timeout_secs: parse_env_or_default("NOTIFIER_TIMEOUT_SECS", 10),
            email_gateway,
            notification_timezone,
        }
    }

    pub fn reminder_lookback_millis(&self) -> i64 {
        let millis = self.reminder_lookback_secs.saturating_mul(1000);
        i64::try_from(millis).unwrap_or(i64::MAX)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
