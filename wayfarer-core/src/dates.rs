//! Calendar date and time-of-day handling shared by the wire models.
//!
//! The backend echoes dates either as plain `YYYY-MM-DD` strings or as
//! RFC 3339 timestamps. Both are normalised to [`NaiveDate`] on the way in;
//! dates always leave the client as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveTime};
use thiserror::Error;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for times of day.
pub const TIME_FORMAT: &str = "%H:%M";

/// Errors raised while parsing dates and times.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// Input was neither `YYYY-MM-DD` nor an RFC 3339 timestamp.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    Date {
        /// Rejected input.
        input: String,
    },
    /// Input was not a `HH:MM` time.
    #[error("invalid time '{input}': expected HH:MM")]
    Time {
        /// Rejected input.
        input: String,
    },
}

/// Parse a calendar date from either accepted wire form.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wayfarer_core::dates::parse_date;
///
/// # fn main() -> Result<(), wayfarer_core::dates::DateParseError> {
/// let plain = parse_date("2024-03-01")?;
/// let stamped = parse_date("2024-03-01T00:00:00.000Z")?;
/// assert_eq!(plain, stamped);
/// assert_eq!(Some(plain), NaiveDate::from_ymd_opt(2024, 3, 1));
/// # Ok(())
/// # }
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|stamp| stamp.date_naive()))
        .map_err(|_| DateParseError::Date {
            input: input.to_owned(),
        })
}

/// Parse a time of day written as `HH:MM` (seconds are tolerated).
pub fn parse_time(input: &str) -> Result<NaiveTime, DateParseError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| DateParseError::Time {
            input: input.to_owned(),
        })
}

/// Render a date in wire form.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serde adapter for [`NaiveDate`] fields.
pub mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*value))
    }

    /// Deserialize from `YYYY-MM-DD` or RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter for optional [`NaiveDate`] fields; blank strings map to `None`.
pub mod option_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize as `YYYY-MM-DD` or `null`.
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from `YYYY-MM-DD`, RFC 3339, blank or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_date(text).map(Some).map_err(D::Error::custom),
        }
    }
}

/// Serde adapter for `HH:MM` [`NaiveTime`] fields.
pub mod time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize as `HH:MM`.
    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(super::TIME_FORMAT).to_string())
    }

    /// Deserialize from `HH:MM` or `HH:MM:SS`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter for optional `HH:MM` [`NaiveTime`] fields; blank maps to `None`.
pub mod option_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serialize as `HH:MM` or `null`.
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from `HH:MM`, `HH:MM:SS`, blank or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_time(text).map(Some).map_err(D::Error::custom),
        }
    }
}
