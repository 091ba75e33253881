//! Time utilities: timestamp parsing policies and the clock used for "now".

use std::sync::OnceLock;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::error::ReportError;

/// Layout of operation timestamps in the bank export.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
/// Layout of reference timestamps handed in by callers.
pub const REFERENCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// How raw operation timestamps are normalized before window comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// Exactly `DD.MM.YYYY HH:MM:SS`.
    Strict,
    /// Mixed layouts (`YYYY-MM-DD`, `DD.MM.YYYY`, `DD/MM/YY HH:MM`, ...), day-first.
    Lenient,
}

impl TimestampStyle {
    pub fn parse(self, raw: &str) -> Option<NaiveDateTime> {
        match self {
            Self::Strict => parse_export_timestamp(raw),
            Self::Lenient => parse_lenient(raw),
        }
    }
}

/// Parse `DD.MM.YYYY HH:MM:SS`; anything else is `None`.
pub fn parse_export_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, EXPORT_TIMESTAMP_FORMAT).ok()
}

/// Parse a reference timestamp like "2020-04-27 19:30:30". No fallback layouts.
pub fn parse_reference_timestamp(raw: &str) -> Result<NaiveDateTime, ReportError> {
    NaiveDateTime::parse_from_str(raw, REFERENCE_TIMESTAMP_FORMAT).map_err(|_| {
        ReportError::invalid_date("reference timestamp", raw, "'YYYY-MM-DD HH:MM:SS'")
    })
}

fn lenient_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?P<a>\d{1,4})[./-](?P<b>\d{1,2})[./-](?P<c>\d{1,4})",
            r"(?:[T\s]+(?P<h>\d{1,2}):(?P<m>\d{2})(?::(?P<s>\d{2})(?:\.(?P<frac>\d{1,9}))?)?)?\s*$"
        ))
        .expect("lenient timestamp regex")
    })
}

/// Parse a timestamp in any of the layouts seen across exports.
///
/// A four-digit leading field means year-first. Otherwise the value is read
/// day-first, falling back to month-first only when the day-first reading is
/// not a real calendar date.
pub fn parse_lenient(raw: &str) -> Option<NaiveDateTime> {
    let caps = lenient_re().captures(raw)?;
    let (a, b, c) = (&caps["a"], &caps["b"], &caps["c"]);

    let date = if a.len() == 4 {
        if c.len() > 2 {
            return None;
        }
        NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?)?
    } else {
        if a.len() > 2 {
            return None;
        }
        let year = expand_year(c)?;
        let first: u32 = a.parse().ok()?;
        let second: u32 = b.parse().ok()?;
        NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))?
    };

    let time = match caps.name("h") {
        None => NaiveTime::MIN,
        Some(hour) => {
            let hour: u32 = hour.as_str().parse().ok()?;
            let minute: u32 = caps["m"].parse().ok()?;
            let second: u32 = match caps.name("s") {
                Some(s) => s.as_str().parse().ok()?,
                None => 0,
            };
            let nanos = match caps.name("frac") {
                Some(frac) => format!("{:0<9}", frac.as_str()).parse().ok()?,
                None => 0,
            };
            NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?
        }
    };

    Some(date.and_time(time))
}

fn expand_year(field: &str) -> Option<i32> {
    let value: i32 = field.parse().ok()?;
    match field.len() {
        4 => Some(value),
        // Same pivot as chrono's %y
        2 if value < 70 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

/// Source of "now" for operations whose reference point may be omitted.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock, either in the machine's local zone or a named IANA zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: Option<Tz>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { zone: None }
    }

    /// Clock reading wall time in an IANA zone like "Europe/Moscow".
    pub fn in_zone(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))?;
        Ok(Self { zone: Some(tz) })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.zone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_export_timestamp_is_strict() {
        assert_eq!(
            parse_export_timestamp("27.04.2020 19:30:30"),
            Some(dt(2020, 4, 27, 19, 30, 30))
        );
        assert_eq!(parse_export_timestamp("2020-04-27 19:30:30"), None);
        assert_eq!(parse_export_timestamp("27.04.2020"), None);
        assert_eq!(parse_export_timestamp("garbage"), None);
    }

    #[test]
    fn test_reference_timestamp() {
        assert_eq!(
            parse_reference_timestamp("2020-04-27 19:30:30").unwrap(),
            dt(2020, 4, 27, 19, 30, 30)
        );
        let err = parse_reference_timestamp("27.04.2020 19:30:30").unwrap_err();
        assert!(matches!(err, ReportError::InvalidDateFormat { .. }));
        assert!(parse_reference_timestamp("2020-04-27").is_err());
    }

    #[test]
    fn test_lenient_year_first() {
        assert_eq!(parse_lenient("2023-01-01"), Some(dt(2023, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_lenient("2023-04-01 12:34:56"),
            Some(dt(2023, 4, 1, 12, 34, 56))
        );
        assert_eq!(
            parse_lenient("2023-04-01T08:15"),
            Some(dt(2023, 4, 1, 8, 15, 0))
        );
    }

    #[test]
    fn test_lenient_day_first() {
        assert_eq!(
            parse_lenient("03.02.2021 10:00:00"),
            Some(dt(2021, 2, 3, 10, 0, 0))
        );
        assert_eq!(parse_lenient("03/02/2021"), Some(dt(2021, 2, 3, 0, 0, 0)));
        assert_eq!(parse_lenient("03-02-21"), Some(dt(2021, 2, 3, 0, 0, 0)));
    }

    #[test]
    fn test_lenient_swaps_when_day_first_is_impossible() {
        // 25 cannot be a month, so the reading swaps to month-first
        assert_eq!(parse_lenient("12/25/2021"), Some(dt(2021, 12, 25, 0, 0, 0)));
        assert_eq!(parse_lenient("32/13/2021"), None);
    }

    #[test]
    fn test_lenient_fractional_seconds() {
        use chrono::Timelike;
        let parsed = parse_lenient("2021-12-31 23:59:59.5").unwrap();
        assert_eq!(parsed.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_lenient_rejects_text() {
        assert_eq!(parse_lenient(""), None);
        assert_eq!(parse_lenient("yesterday"), None);
        assert_eq!(parse_lenient("2021-12-31 25:00"), None);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(dt(2021, 12, 31, 12, 0, 0));
        assert_eq!(clock.now(), dt(2021, 12, 31, 12, 0, 0));
    }

    #[test]
    fn test_invalid_zone() {
        assert!(SystemClock::in_zone("Mars/Olympus").is_err());
        assert!(SystemClock::in_zone("Europe/Moscow").is_ok());
    }
}
