use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar date keyed by its canonical `YYYYMMDD` form.
///
/// Field order matters: the derived ordering compares year, then month, then
/// day, which matches the lexicographic order of the canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    year: u16,
    month: u8,
    day: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateKeyError {
    #[error("invalid date format '{0}': expected YYYYMMDD or a separated YYYY-MM-DD form")]
    InvalidFormat(String),
    #[error("invalid date values: month {month} must be 1-12 and day {day} must be 1-31")]
    InvalidValues { month: u32, day: u32 },
    #[error("year {0} cannot be represented as a four digit date key")]
    YearOutOfRange(i32),
    #[error("timestamp {0}ms does not map to a local calendar date")]
    InvalidTimestamp(i64),
}

impl DateKey {
    /// Parses an unseparated `YYYYMMDD` string or a separated date whose
    /// separator is the first non-digit character (`2024-11-05`, `2024/11/05`).
    pub fn parse(input: &str) -> Result<Self, DateKeyError> {
        let trimmed = input.trim();
        if trimmed.len() > 8 {
            return match trimmed.chars().find(|c| !c.is_ascii_digit()) {
                Some(separator) => {
                    Self::parse_with_separator(trimmed, separator.encode_utf8(&mut [0; 4]))
                }
                None => Err(DateKeyError::InvalidFormat(input.to_string())),
            };
        }
        Self::from_digits(trimmed, input)
    }

    pub fn parse_with_separator(input: &str, separator: &str) -> Result<Self, DateKeyError> {
        let trimmed = input.trim();
        if separator.is_empty() {
            return Self::from_digits(trimmed, input);
        }

        let parts: Vec<&str> = trimmed.split(separator).collect();
        match parts.as_slice() {
            [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
                Self::from_digits(&parts.concat(), input)
            }
            _ => Err(DateKeyError::InvalidFormat(input.to_string())),
        }
    }

    /// Builds a key from the local calendar fields of a millisecond timestamp.
    pub fn from_timestamp_millis(millis: i64) -> Result<Self, DateKeyError> {
        let local = Local
            .timestamp_millis_opt(millis)
            .earliest()
            .ok_or(DateKeyError::InvalidTimestamp(millis))?;
        Self::try_from(local.date_naive())
    }

    pub fn today() -> Result<Self, DateKeyError> {
        Self::try_from(Local::now().date_naive())
    }

    pub fn to_canonical(&self) -> String {
        self.to_separated("")
    }

    pub fn to_separated(&self, separator: &str) -> String {
        format!(
            "{:04}{sep}{:02}{sep}{:02}",
            self.year,
            self.month,
            self.day,
            sep = separator
        )
    }

    /// Calendar date this key falls on. Range-valid but calendar-invalid keys
    /// (e.g. `20230231`) roll forward into the following month.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), 1)?
            .checked_add_signed(Duration::days(i64::from(self.day) - 1))
    }

    /// Shifts the key by `days` calendar days. Returns `None` when the result
    /// leaves the four digit year range.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        let shifted = self
            .to_naive_date()?
            .checked_add_signed(Duration::days(days))?;
        Self::try_from(shifted).ok()
    }

    fn from_digits(digits: &str, original: &str) -> Result<Self, DateKeyError> {
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateKeyError::InvalidFormat(original.to_string()));
        }

        let field = |range: std::ops::Range<usize>| {
            digits[range]
                .parse::<u16>()
                .map_err(|_| DateKeyError::InvalidFormat(original.to_string()))
        };
        let year = field(0..4)?;
        let month = field(4..6)?;
        let day = field(6..8)?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(DateKeyError::InvalidValues {
                month: u32::from(month),
                day: u32::from(day),
            });
        }

        Ok(Self {
            year,
            month: month as u8,
            day: day as u8,
        })
    }
}

impl TryFrom<NaiveDate> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        let year = u16::try_from(value.year())
            .ok()
            .filter(|year| *year <= 9999)
            .ok_or(DateKeyError::YearOutOfRange(value.year()))?;
        Ok(Self {
            year,
            month: value.month() as u8,
            day: value.day() as u8,
        })
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn key(raw: &str) -> DateKey {
        DateKey::parse(raw).expect("valid date key")
    }

    #[test]
    fn separated_and_unseparated_forms_round_trip() {
        let separated = DateKey::parse_with_separator("2024-11-05", "-").expect("parses");
        assert_eq!(separated.to_canonical(), "20241105");
        assert_eq!(key("20241105").to_separated("-"), "2024-11-05");
        assert_eq!(key("2024/11/05"), key("20241105"));
        assert_eq!(key("2024.11.05").to_string(), "20241105");
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["2024115", "2024-1-05", "2024-11-05-01", "abcdefgh", "", "202411051"] {
            assert!(
                matches!(DateKey::parse(raw), Err(DateKeyError::InvalidFormat(_))),
                "{raw} should be rejected"
            );
        }
        assert!(matches!(
            DateKey::parse_with_separator("2024-11-05", "/"),
            Err(DateKeyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_month_and_day() {
        assert_eq!(
            DateKey::parse("20241305"),
            Err(DateKeyError::InvalidValues { month: 13, day: 5 })
        );
        assert_eq!(
            DateKey::parse("20241100"),
            Err(DateKeyError::InvalidValues { month: 11, day: 0 })
        );
        assert!(DateKey::parse("20240231").is_ok());
    }

    #[test]
    fn ordering_is_chronological() {
        assert_eq!(key("20241105").cmp(&key("20241104")), Ordering::Greater);
        assert_eq!(key("20231231").cmp(&key("20240101")), Ordering::Less);
        assert_eq!(key("2024-11-05").cmp(&key("20241105")), Ordering::Equal);
    }

    #[test]
    fn add_days_crosses_month_and_year_boundaries() {
        assert_eq!(key("20240301").add_days(-1), Some(key("20240229")));
        assert_eq!(key("20230301").add_days(-1), Some(key("20230228")));
        assert_eq!(key("20240101").add_days(-1), Some(key("20231231")));
        assert_eq!(key("20241231").add_days(1), Some(key("20250101")));
        assert_eq!(key("99991231").add_days(1), None);
    }

    #[test]
    fn naive_dates_and_timestamps_convert_through_local_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 5).expect("valid date");
        assert_eq!(DateKey::try_from(date), Ok(key("20241105")));

        let noon = Local
            .with_ymd_and_hms(2024, 11, 5, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        assert_eq!(
            DateKey::from_timestamp_millis(noon.timestamp_millis()),
            Ok(key("20241105"))
        );
    }

    #[test]
    fn serializes_as_canonical_string() {
        let json = serde_json::to_string(&key("2024-11-05")).expect("serializes");
        assert_eq!(json, "\"20241105\"");
        let parsed: DateKey = serde_json::from_str("\"2024-11-05\"").expect("deserializes");
        assert_eq!(parsed, key("20241105"));
    }
}
