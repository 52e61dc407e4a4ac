//! Lenient field parsing for form-driven payloads and query strings.
//!
//! HTML forms post ids as strings and leave unselected options as `""`,
//! and date inputs produce `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`. The helpers
//! here narrow those shapes into typed values, and [`Required`] collects
//! missing required fields so a single validation error can name them all.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::{self, Deserializer, Visitor};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

/// Naive formats accepted for timestamps without an offset (read as UTC).
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp from RFC 3339, a naive date-time (UTC), or a bare date
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Parse a calendar date from `YYYY-MM-DD` or the date part of a timestamp.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Serde adapters
// ---------------------------------------------------------------------------

struct OptionalIdVisitor;

impl<'de> Visitor<'de> for OptionalIdVisitor {
    type Value = Option<DbId>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer id, a numeric string, an empty string, or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        DbId::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Deserialize an optional id from a number, a numeric string, `""` or `null`.
///
/// Use with `#[serde(default, deserialize_with = "parse::optional_id")]`.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<DbId>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptionalIdVisitor)
}

/// Deserialize an optional string, mapping blank values to `None`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(non_blank(value))
}

/// Deserialize an optional timestamp bound (query filters).
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_text(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw).map(Some).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Str(&raw), &"a date or timestamp")
        }),
    }
}

// ---------------------------------------------------------------------------
// Required field collection
// ---------------------------------------------------------------------------

/// Accumulates missing and malformed fields while a payload is narrowed.
///
/// Accessors return a placeholder when a field is missing so narrowing can
/// continue and report every problem at once; [`Required::finish`] must be
/// called before the narrowed value is used.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
    malformed: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, field: &'static str, value: Option<String>) -> String {
        match non_blank(value) {
            Some(v) => v,
            None => {
                self.missing.push(field);
                String::new()
            }
        }
    }

    pub fn id(&mut self, field: &'static str, value: Option<DbId>) -> DbId {
        match value {
            Some(v) => v,
            None => {
                self.missing.push(field);
                0
            }
        }
    }

    pub fn timestamp(&mut self, field: &'static str, value: Option<String>) -> Timestamp {
        match non_blank(value) {
            None => {
                self.missing.push(field);
                Timestamp::default()
            }
            Some(raw) => parse_timestamp(&raw).unwrap_or_else(|| {
                self.malformed.push(field);
                Timestamp::default()
            }),
        }
    }

    /// Parse an optional date; only a present-but-unparseable value is an error.
    pub fn optional_date(&mut self, field: &'static str, value: Option<String>) -> Option<Date> {
        let raw = non_blank(value)?;
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            self.malformed.push(field);
        }
        parsed
    }

    pub fn finish(self) -> Result<(), CoreError> {
        if !self.missing.is_empty() {
            let verb = if self.missing.len() == 1 { "is" } else { "are" };
            return Err(CoreError::Validation(format!(
                "{} {verb} required",
                join_fields(&self.missing)
            )));
        }
        if !self.malformed.is_empty() {
            return Err(CoreError::Validation(format!(
                "{} must be a valid date or timestamp",
                join_fields(&self.malformed)
            )));
        }
        Ok(())
    }
}

/// `a`, `a and b`, `a, b, and c`.
fn join_fields(fields: &[&str]) -> String {
    match fields {
        [] => String::new(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct IdHolder {
        #[serde(default, deserialize_with = "optional_id")]
        id: Option<DbId>,
    }

    fn id_from(json: &str) -> Option<DbId> {
        serde_json::from_str::<IdHolder>(json).unwrap().id
    }

    #[test]
    fn optional_id_accepts_form_shapes() {
        assert_eq!(id_from(r#"{"id": 7}"#), Some(7));
        assert_eq!(id_from(r#"{"id": "7"}"#), Some(7));
        assert_eq!(id_from(r#"{"id": ""}"#), None);
        assert_eq!(id_from(r#"{"id": null}"#), None);
        assert_eq!(id_from(r#"{}"#), None);
    }

    #[test]
    fn optional_id_rejects_garbage() {
        assert!(serde_json::from_str::<IdHolder>(r#"{"id": "seven"}"#).is_err());
        assert!(serde_json::from_str::<IdHolder>(r#"{"id": true}"#).is_err());
    }

    #[test]
    fn timestamps_parse_from_every_accepted_shape() {
        let rfc = parse_timestamp("2024-05-01T10:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 8);

        let local = parse_timestamp("2024-05-01T10:30").unwrap();
        assert_eq!((local.hour(), local.minute()), (10, 30));

        let date_only = parse_timestamp("2024-05-01").unwrap();
        assert_eq!((date_only.day(), date_only.hour()), (1, 0));

        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn dates_accept_timestamps() {
        let date = parse_date("2024-05-01T23:00:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn required_reports_all_missing_fields() {
        let mut required = Required::new();
        required.id("project_id", None);
        required.text("title", Some("   ".into()));
        required.timestamp("start_date", None);
        required.timestamp("end_date", None);
        assert_matches!(
            required.finish(),
            Err(CoreError::Validation(msg))
                if msg == "project_id, title, start_date, and end_date are required"
        );
    }

    #[test]
    fn required_reports_malformed_dates() {
        let mut required = Required::new();
        required.optional_date("due_date", Some("soon".into()));
        assert_matches!(
            required.finish(),
            Err(CoreError::Validation(msg)) if msg == "due_date must be a valid date or timestamp"
        );
    }

    #[test]
    fn required_single_field_message() {
        let mut required = Required::new();
        required.text("name", None);
        assert_matches!(
            required.finish(),
            Err(CoreError::Validation(msg)) if msg == "name is required"
        );
    }
}
