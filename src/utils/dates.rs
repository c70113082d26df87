//! Calendar-day boundaries for list filters and daily counters.
//! Days are taken in the server's local time zone.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

/// First instant of `date` in local time, as UTC
pub fn start_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => midnight.and_utc(),
    }
}

/// Exclusive upper bound for an inclusive `date_to` filter
pub fn end_of_local_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_local_day(date + Duration::days(1))
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_spans_24_hours() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let span = end_of_local_day(d) - start_of_local_day(d);
        // DST transitions shift this by an hour at most
        assert!((23..=25).contains(&span.num_hours()));
        assert!(start_of_local_day(d) < end_of_local_day(d));
    }
}
