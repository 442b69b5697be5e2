use chrono::{Datelike, NaiveDate, NaiveDateTime};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The standard way of turning a date into a ledger key.
pub fn canonical_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn display_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!("{}.{}.{} ({})", date.year(), date.month(), date.day(), weekday)
}

pub fn is_same_calendar_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    canonical_key(a.date()) == canonical_key(b.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn canonical_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(canonical_key(date), "2024-03-05");
    }

    #[test]
    fn display_label_uses_unpadded_fields_and_weekday() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(display_label(date), "2024.3.5 (Tue)");

        let sunday = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(display_label(sunday), "2026.1.4 (Sun)");
    }

    #[test]
    fn same_calendar_day_ignores_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let morning = date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        let evening = date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        let next = date.succ_opt().unwrap().and_time(NaiveTime::MIN);

        assert!(is_same_calendar_day(morning, evening));
        assert!(!is_same_calendar_day(evening, next));
    }
}
