//! Shared utility functions for WBD crates.

/// Date utility functions
pub mod dates {
    use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

    const MILLIS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse a timestamp. Accepts RFC 3339, "YYYY-MM-DD HH:MM:SS" (taken as UTC)
    /// and a bare "YYYY-MM-DD" (midnight UTC).
    pub fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        if let Ok(date) = parse_date(s) {
            return Ok(day_start(&date));
        }
        anyhow::bail!("unrecognized timestamp: {}", s)
    }

    /// 00:00 UTC of the given day.
    pub fn day_start(date: &NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }

    /// `now - days`, the earliest instant of a lookback window.
    pub fn window_start(now: &DateTime<Utc>, days: u32) -> anyhow::Result<DateTime<Utc>> {
        TimeDelta::try_days(days as i64)
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or_else(|| anyhow::anyhow!("window of {} days is out of range", days))
    }

    /// `now - hours`.
    pub fn hours_before(now: &DateTime<Utc>, hours: u32) -> anyhow::Result<DateTime<Utc>> {
        TimeDelta::try_hours(hours as i64)
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or_else(|| anyhow::anyhow!("{} hours before {} is out of range", hours, now))
    }

    /// The day `offset_days` after `now`, in UTC.
    pub fn target_date(now: &DateTime<Utc>, offset_days: i64) -> anyhow::Result<NaiveDate> {
        TimeDelta::try_days(offset_days)
            .and_then(|delta| now.checked_add_signed(delta))
            .map(|ts| ts.date_naive())
            .ok_or_else(|| anyhow::anyhow!("target offset of {} days is out of range", offset_days))
    }

    /// Fractional hours from `earlier` to `later`.
    pub fn hours_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> f64 {
        (*later - *earlier).num_milliseconds() as f64 / MILLIS_PER_HOUR
    }

    /// Month of the year, 0-based (January = 0).
    pub fn month_index(ts: &DateTime<Utc>) -> u32 {
        ts.month0()
    }

    /// Convert epoch milliseconds back to a timestamp.
    pub fn from_millis(ms: i64) -> anyhow::Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {}", ms))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_timestamp_formats() {
            let expected = Utc.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();
            assert_eq!(parse_timestamp("2024-07-15T06:30:00Z").unwrap(), expected);
            assert_eq!(parse_timestamp("2024-07-15T12:00:00+05:30").unwrap(), expected);
            assert_eq!(parse_timestamp("2024-07-15 06:30:00").unwrap(), expected);
            assert_eq!(
                parse_timestamp("2024-07-15").unwrap(),
                Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap()
            );
            assert!(parse_timestamp("15/07/2024").is_err());
        }

        #[test]
        fn test_target_date() {
            let now = Utc.with_ymd_and_hms(2024, 12, 31, 22, 15, 0).unwrap();
            assert_eq!(
                target_date(&now, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            );
            assert_eq!(
                target_date(&now, -1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
            );
        }

        #[test]
        fn test_out_of_range_offsets_are_errors() {
            let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
            assert!(window_start(&now, 100_000_000).is_err());
            assert!(window_start(&now, u32::MAX).is_err());
            assert!(target_date(&now, 200_000_000).is_err());
            assert!(target_date(&now, i64::MAX).is_err());
            assert!(target_date(&now, i64::MIN).is_err());
            assert!(hours_before(&now, u32::MAX).is_err());
        }

        #[test]
        fn test_hours_before() {
            let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
            assert_eq!(
                hours_before(&now, 24).unwrap(),
                Utc.with_ymd_and_hms(2024, 7, 14, 12, 0, 0).unwrap()
            );
        }

        #[test]
        fn test_window_and_hours() {
            let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
            let start = window_start(&now, 14).unwrap();
            assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
            assert!((hours_between(&start, &now) - 336.0).abs() < 1e-9);
            assert_eq!(month_index(&now), 2);
        }

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_from_millis() {
            let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
            assert_eq!(from_millis(ts.timestamp_millis()).unwrap(), ts);
        }
    }
}
