//! Time handling for hive telemetry
//!
//! Gateways deliver timestamps in whatever shape their backend stored them:
//! RFC 3339 strings, naive ISO strings without an offset, or epoch
//! milliseconds. Everything is normalized to `DateTime<Utc>` at the edge of
//! the engine so the forecasters only ever see one clock.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wall-clock timestamp of a reading
pub type Timestamp = DateTime<Utc>;

/// Naive formats accepted when a string carries no UTC offset
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp string, assuming UTC when no offset is present
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Convert epoch milliseconds to a timestamp
pub fn from_epoch_millis(millis: i64) -> Option<Timestamp> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Serde adapter for optional timestamps in telemetry payloads.
///
/// Undecodable values become `None` rather than failing the whole
/// request: an undated reading is still a usable reading for everything
/// except the time-feature table.
pub mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => ts.to_rfc3339().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<RawTimestamp>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let decoded = match raw {
            RawTimestamp::Millis(ms) => from_epoch_millis(ms),
            RawTimestamp::FractionalMillis(ms) if ms.is_finite() => from_epoch_millis(ms as i64),
            RawTimestamp::Text(text) => parse_timestamp(&text),
            _ => None,
        };
        if decoded.is_none() {
            debug!("Undecodable timestamp treated as missing");
        }
        Ok(decoded)
    }
}

/// Calendar decomposition used by the time-feature table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week, Monday = 0
    pub day_of_week: u32,
    /// Day of year (1-366)
    pub day_of_year: u32,
    /// Month (1-12)
    pub month: u32,
}

impl CalendarFeatures {
    /// Decompose a timestamp
    pub fn from_timestamp(ts: &Timestamp) -> Self {
        Self {
            hour: ts.hour(),
            day_of_week: ts.weekday().num_days_from_monday(),
            day_of_year: ts.ordinal(),
            month: ts.month(),
        }
    }
}
