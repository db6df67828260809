use chrono::{Datelike, Days, NaiveDate};

/// Target day of a booking, as the API wants it plus the weekday used for
/// exclusion matching (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDate {
    pub day: String,
    pub weekday: u8,
}

/// Adds `offset_days` calendar days to `today` and renders it as `YYYYMMDD`.
/// Returns `None` when the result is outside chrono's calendar.
pub fn booking_date(today: NaiveDate, offset_days: u64) -> Option<BookingDate> {
    let target = today.checked_add_days(Days::new(offset_days))?;
    Some(BookingDate {
        day: target.format("%Y%m%d").to_string(),
        weekday: target.weekday().num_days_from_sunday() as u8,
    })
}

/// True when `weekday` is one of the user's excluded days.
/// Values outside 0..=6 never match.
pub fn is_excluded(weekday: u8, excluding_days: &[i32]) -> bool {
    excluding_days.iter().any(|&d| d == i32::from(weekday))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_date_next_day() {
        assert_eq!(booking_date(date(2021, 2, 9), 1).unwrap().day, "20210210");
    }

    #[test]
    fn test_booking_date_year_rollover() {
        assert_eq!(booking_date(date(1999, 12, 31), 1).unwrap().day, "20000101");
    }

    #[test]
    fn test_booking_date_zero_padding() {
        assert_eq!(booking_date(date(2021, 1, 5), 1).unwrap().day, "20210106");
    }

    #[test]
    fn test_booking_date_leap_day() {
        assert_eq!(booking_date(date(2024, 2, 28), 1).unwrap().day, "20240229");
        assert_eq!(booking_date(date(2024, 2, 29), 1).unwrap().day, "20240301");
    }

    #[test]
    fn test_booking_date_weekday() {
        // 2024-01-06 is a Saturday, so tomorrow is Sunday
        assert_eq!(booking_date(date(2024, 1, 6), 1).unwrap().weekday, 0);
        // 2024-01-05 is a Friday
        assert_eq!(booking_date(date(2024, 1, 5), 1).unwrap().weekday, 6);
        assert_eq!(booking_date(date(2024, 1, 5), 3).unwrap().weekday, 1);
    }

    #[test]
    fn test_booking_date_out_of_range() {
        assert_eq!(booking_date(NaiveDate::MAX, 1), None);
        assert_eq!(booking_date(date(2021, 2, 9), u64::MAX), None);
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(0, &[0, 6]));
        assert!(is_excluded(6, &[0, 6]));
        assert!(!is_excluded(3, &[0, 6]));
        assert!(!is_excluded(3, &[]));
        assert!(!is_excluded(0, &[7, -1, 14]));
    }
}
