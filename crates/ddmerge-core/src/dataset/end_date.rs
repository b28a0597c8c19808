//! End-of-affiliation marker shared by company entries and releases.
//!
//! The default data uses two literals for "still ongoing": `0` (written by
//! the normalizer for baseline users) and `null` (written for synthesized CI
//! identities). Both are kept distinct so a dump round-trips byte-for-byte;
//! callers test [`EndDate::is_current`] instead of comparing literals.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Date format used by hand-written default data, e.g. `2013-Jan-01`.
pub const DATE_FORMAT: &str = "%Y-%b-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndDate {
    /// Ongoing, serialized as `0`.
    Present,
    /// Ongoing, serialized as `null`.
    #[default]
    Open,
    /// Ended at the given UNIX timestamp (seconds).
    Ended(i64),
}

impl EndDate {
    /// True for both ongoing literals.
    pub fn is_current(&self) -> bool {
        !matches!(self, EndDate::Ended(_))
    }

    /// Chronological key: ended entries by timestamp, ongoing entries last.
    pub fn sort_key(&self) -> (bool, i64) {
        match self {
            EndDate::Ended(ts) => (false, *ts),
            EndDate::Present | EndDate::Open => (true, 0),
        }
    }

    /// Parse a `YYYY-Mon-DD` date into an [`EndDate::Ended`] at midnight UTC.
    ///
    /// `now` is accepted as the still-open marker used for in-progress
    /// releases; an empty string means "no end date".
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(EndDate::Open);
        }
        if text.eq_ignore_ascii_case("now") {
            return Ok(EndDate::Present);
        }
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT)?;
        let ts = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        Ok(EndDate::Ended(ts))
    }

    fn from_timestamp(ts: i64) -> Self {
        if ts == 0 {
            EndDate::Present
        } else {
            EndDate::Ended(ts)
        }
    }
}

impl Serialize for EndDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EndDate::Present => serializer.serialize_i64(0),
            EndDate::Open => serializer.serialize_none(),
            EndDate::Ended(ts) => serializer.serialize_i64(*ts),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEndDate {
    Timestamp(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawEndDate>::deserialize(deserializer)? {
            None => Ok(EndDate::Open),
            Some(RawEndDate::Timestamp(ts)) => Ok(EndDate::from_timestamp(ts)),
            Some(RawEndDate::Text(text)) => EndDate::parse(&text)
                .map_err(|e| de::Error::custom(format!("invalid end date '{text}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_and_null_are_both_current() {
        let present: EndDate = serde_json::from_value(json!(0)).unwrap();
        let open: EndDate = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(present, EndDate::Present);
        assert_eq!(open, EndDate::Open);
        assert!(present.is_current());
        assert!(open.is_current());
    }

    #[test]
    fn test_literals_round_trip_unchanged() {
        assert_eq!(serde_json::to_value(EndDate::Present).unwrap(), json!(0));
        assert_eq!(serde_json::to_value(EndDate::Open).unwrap(), json!(null));
        assert_eq!(
            serde_json::to_value(EndDate::Ended(1357000000)).unwrap(),
            json!(1357000000)
        );
    }

    #[test]
    fn test_parse_date_string() {
        let d: EndDate = serde_json::from_value(json!("2013-Jan-01")).unwrap();
        assert_eq!(d, EndDate::Ended(1356998400));
        assert!(!d.is_current());
    }

    #[test]
    fn test_parse_now_and_empty() {
        assert_eq!(EndDate::parse("now").unwrap(), EndDate::Present);
        assert_eq!(EndDate::parse("").unwrap(), EndDate::Open);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let res: Result<EndDate, _> = serde_json::from_value(json!("01/01/2013"));
        assert!(res.is_err());
    }

    #[test]
    fn test_sort_key_puts_current_last() {
        let mut dates = vec![EndDate::Present, EndDate::Ended(20), EndDate::Ended(10)];
        dates.sort_by_key(EndDate::sort_key);
        assert_eq!(
            dates,
            vec![EndDate::Ended(10), EndDate::Ended(20), EndDate::Present]
        );
    }
}
