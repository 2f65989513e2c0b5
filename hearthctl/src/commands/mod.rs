//! Subcommand definitions and their handlers, one module per area.

use chrono::{Datelike, Duration, NaiveDate};

pub mod auth;
pub mod budget;
pub mod connect;
pub mod db;
pub mod expense;
pub mod family;
pub mod list;
pub mod meal;
pub mod recipe;
pub mod recurring;
pub mod voice;

/// Monday of the week containing `day`.
pub(crate) fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weeks_start_on_monday() {
        let friday = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(week_start(friday), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(week_start(monday), monday);
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(week_start(sunday), monday);
    }
}
