use chrono::{DateTime, NaiveDateTime};

use crate::error::{ExporterError, Result};

/// Converts a GitLab ISO-8601 timestamp into milliseconds since the Unix epoch.
///
/// The wall-clock reading is always taken as UTC: a trailing `Z` or an explicit
/// offset is dropped, not applied.
pub fn to_epoch_millis(value: &str) -> Result<f64> {
    let normalized = value.replace('Z', "+00:00");

    let instant = DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.naive_local().and_utc())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .map_err(|_| ExporterError::Timestamp {
            value: value.to_string(),
        })?;

    #[allow(clippy::cast_precision_loss)]
    Ok(instant.timestamp_micros() as f64 / 1000.0)
}
