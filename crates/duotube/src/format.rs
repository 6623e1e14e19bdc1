//! Presentation helpers shared by both sources.
//!
//! Every function here is pure; callers pass `now` explicitly where time matters.

use chrono::{DateTime, TimeZone, Utc};

/// Formats a count as `999 views`, `1.5K views`, `2.3M views`.
///
/// Rounding is half-up on the first decimal.
pub fn format_count(count: u64, unit: &str) -> String {
    if count >= 1_000_000 {
        format!("{}M {unit}", one_decimal(count, 1_000_000))
    } else if count >= 1_000 {
        format!("{}K {unit}", one_decimal(count, 1_000))
    } else {
        format!("{count} {unit}")
    }
}

pub fn format_views(count: u64) -> String {
    format_count(count, "views")
}

fn one_decimal(value: u64, divisor: u64) -> String {
    let tenths = (u128::from(value) * 10 + u128::from(divisor) / 2) / u128::from(divisor);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// `H:MM:SS` from one hour up, `M:SS` below, `0:00` for zero.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0:00".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Publication time as delivered by either backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedAt<'a> {
    /// RFC 3339 timestamp, e.g. `2024-03-01T12:00:00Z`.
    Iso(&'a str),
    /// Seconds since the Unix epoch.
    EpochSeconds(i64),
}

impl PublishedAt<'_> {
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            PublishedAt::Iso(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            PublishedAt::EpochSeconds(secs) => Utc.timestamp_opt(secs, 0).single(),
        }
    }
}

impl From<DateTime<Utc>> for PublishedAt<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        PublishedAt::EpochSeconds(value.timestamp())
    }
}

/// Relative age label: `Today`, `Yesterday`, `3 days ago`, `2 weeks ago`,
/// `5 months ago`, `1 years ago`.
///
/// Unparsable input yields an empty string.
pub fn format_relative_date<'a>(published: impl Into<PublishedAt<'a>>, now: DateTime<Utc>) -> String {
    let Some(published) = published.into().to_datetime() else {
        return String::new();
    };
    let days = (now - published).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 365 => format!("{} months ago", d / 30),
        d => format!("{} years ago", d / 365),
    }
}

/// Parses ISO 8601 durations of the `PT#H#M#S` family into seconds.
///
/// A leading day component (`P1DT2H`) is honored; anything else returns `None`.
pub fn parse_iso8601_duration(input: &str) -> Option<u64> {
    let rest = input.trim().strip_prefix('P')?;
    let (days_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut seconds = 0u64;
    if !days_part.is_empty() {
        let days = days_part.strip_suffix('D')?.parse::<u64>().ok()?;
        seconds += days * 86_400;
    }

    let mut digits = String::new();
    for c in time_part.chars() {
        match c {
            '0'..='9' => digits.push(c),
            'H' | 'M' | 'S' => {
                let value: u64 = digits.parse().ok()?;
                digits.clear();
                seconds += match c {
                    'H' => value * 3600,
                    'M' => value * 60,
                    _ => value,
                };
            }
            _ => return None,
        }
    }
    if !digits.is_empty() {
        return None;
    }
    Some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0 views")]
    #[case(999, "999 views")]
    #[case(1_000, "1.0K views")]
    #[case(1_500, "1.5K views")]
    #[case(999_999, "1000.0K views")]
    #[case(1_000_000, "1.0M views")]
    #[case(1_500_000, "1.5M views")]
    #[case(12_345_678, "12.3M views")]
    fn views(#[case] count: u64, #[case] expected: &str) {
        assert_eq!(format_views(count), expected);
    }

    #[rstest]
    #[case(0, "0:00")]
    #[case(9, "0:09")]
    #[case(65, "1:05")]
    #[case(600, "10:00")]
    #[case(3600, "1:00:00")]
    #[case(3725, "1:02:05")]
    fn durations(#[case] seconds: u64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[rstest]
    #[case(Duration::hours(3), "Today")]
    #[case(Duration::hours(30), "Yesterday")]
    #[case(Duration::days(4), "4 days ago")]
    #[case(Duration::days(15), "2 weeks ago")]
    #[case(Duration::days(95), "3 months ago")]
    #[case(Duration::days(800), "2 years ago")]
    fn relative_dates(#[case] age: Duration, #[case] expected: &str) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative_date(now - age, now), expected);
    }

    #[test]
    fn relative_dates_accept_both_inputs() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let iso = PublishedAt::Iso("2025-05-29T12:00:00Z");
        let epoch = PublishedAt::EpochSeconds((now - Duration::days(3)).timestamp());
        assert_eq!(format_relative_date(iso, now), "3 days ago");
        assert_eq!(format_relative_date(epoch, now), "3 days ago");
        assert_eq!(format_relative_date(PublishedAt::Iso("yesterday"), now), "");
    }

    #[rstest]
    #[case("PT4M13S", Some(253))]
    #[case("PT1H2M5S", Some(3725))]
    #[case("PT45S", Some(45))]
    #[case("P1DT1S", Some(86_401))]
    #[case("P0D", Some(0))]
    #[case("4:13", None)]
    #[case("PT4X", None)]
    fn iso_durations(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_iso8601_duration(input), expected);
    }
}
