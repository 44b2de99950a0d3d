//! Time source abstraction and the fixed timestamp wire format.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};

/// Textual format of every stored timestamp (attempts, records).
/// Six-digit subsecond precision; parsing is exact-format, never
/// locale-dependent.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Injected time source. Workflows never call `Utc::now()` directly so
/// tests can pin the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock implementation used by real deployments.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed stored timestamp {raw:?}"))
}
