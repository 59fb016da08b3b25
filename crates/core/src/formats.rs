//! Fixed text formats of the datetime family.
//!
//! | tag                         | format                               |
//! |-----------------------------|--------------------------------------|
//! | `date`                      | `YYYY-MM-DD`                         |
//! | `time`                      | `HH:MM:SS.ffffff`                    |
//! | `datetime_with_timezone`    | `YYYY-MM-DDTHH:MM:SS.ffffff+HHMM`    |
//! | `datetime_without_timezone` | `YYYY-MM-DDTHH:MM:SS.ffffff`         |
//! | `timedelta`                 | total seconds as a float             |
//!
//! Sub-second precision is microseconds; finer digits are truncated.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

pub fn format_date(value: Date) -> Result<String, time::error::Format> {
    value.format(format_description!("[year]-[month]-[day]"))
}

pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

pub fn format_time(value: Time) -> Result<String, time::error::Format> {
    value.format(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:6]"
    ))
}

pub fn parse_time(text: &str) -> Result<Time, time::error::Parse> {
    Time::parse(
        text,
        format_description!("[hour]:[minute]:[second].[subsecond digits:6]"),
    )
}

pub fn format_datetime(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
    value.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
    ))
}

pub fn parse_datetime(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"),
    )
}

pub fn format_datetime_tz(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6][offset_hour sign:mandatory][offset_minute]"
    ))
}

pub fn parse_datetime_tz(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(
        text,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6][offset_hour sign:mandatory][offset_minute]"
        ),
    )
}

pub fn duration_to_seconds(value: Duration) -> f64 {
    value.as_seconds_f64()
}

/// Rounds to whole microseconds.
pub fn duration_from_seconds(seconds: f64) -> Duration {
    Duration::microseconds((seconds * 1e6).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset, time};

    #[test]
    fn test_date_format() {
        assert_eq!(format_date(date!(2020 - 08 - 09)).unwrap(), "2020-08-09");
        assert_eq!(parse_date("2020-08-09").unwrap(), date!(2020 - 08 - 09));
    }

    #[test]
    fn test_time_format() {
        let t = time!(10:11:12.000013);
        assert_eq!(format_time(t).unwrap(), "10:11:12.000013");
        assert_eq!(parse_time("10:11:12.000013").unwrap(), t);
    }

    #[test]
    fn test_datetime_formats() {
        let naive = datetime!(2020-08-09 10:11:12.000013);
        assert_eq!(
            format_datetime(naive).unwrap(),
            "2020-08-09T10:11:12.000013"
        );
        let aware = naive.assume_offset(offset!(UTC));
        assert_eq!(
            format_datetime_tz(aware).unwrap(),
            "2020-08-09T10:11:12.000013+0000"
        );
        assert_eq!(
            parse_datetime_tz("2020-08-09T10:11:12.000013-0530")
                .unwrap()
                .offset(),
            offset!(-5:30)
        );
    }

    #[test]
    fn test_duration_seconds() {
        let d = Duration::seconds(12) + Duration::microseconds(13);
        assert!((duration_to_seconds(d) - 12.000013).abs() < 1e-12);
        assert_eq!(duration_from_seconds(12.000013), d);
    }
}
