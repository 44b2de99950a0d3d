//! Runtime configuration for the sign-up coordinator.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Width of the anti-spam window (seconds).
    pub rate_limit_window_secs: i64,
    /// How many recent attempts the limiter looks back over.
    pub rate_limit_lookback: u32,
    /// Seconds before a pending secondary-controller request counts as
    /// denied. Unset = wait for the primary controller indefinitely.
    pub approval_timeout_secs: Option<u64>,
}

impl Settings {
    fn from_env() -> Self {
        let rate_limit_window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(300); // 5 min default

        let rate_limit_lookback = env::var("RATE_LIMIT_LOOKBACK")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let approval_timeout_secs = env::var("APPROVAL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        Settings {
            rate_limit_window_secs,
            rate_limit_lookback,
            approval_timeout_secs,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
