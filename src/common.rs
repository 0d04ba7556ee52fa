/// Common types and utilities shared across handlers and services
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Parses either a calendar date (`2024-10-15`) or an RFC 3339 timestamp
/// (`2024-10-15T08:00:00Z`), keeping only the date part.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Serde adapter for date fields that accept a date or a datetime
pub mod flexible_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_flexible_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_flexible_date(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

/// Trims an optional string, mapping blank input to `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-10-15")]
    #[case("2024-10-15T08:30:00Z")]
    #[case("2024-10-15T23:30:00+02:00")]
    #[case("2024-10-15T08:30:00.000")]
    fn accepts_dates_and_datetimes(#[case] raw: &str) {
        assert_eq!(
            parse_flexible_date(raw),
            NaiveDate::from_ymd_opt(2024, 10, 15)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_flexible_date("next tuesday"), None);
    }

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" Riga ".into())), Some("Riga".into()));
    }
}
