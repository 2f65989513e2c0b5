use chrono::NaiveDate;
use hearth_core::recurrence::{
    next_due_date, next_due_date_or_today, next_due_date_str, occurrences_between, period_window,
    Frequency, RecurrenceError, RecurrenceRule, MAX_OCCURRENCES,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn monthly_clamps_to_month_end() {
    assert_eq!(next_due_date(date(2024, 1, 31), Frequency::Monthly), date(2024, 2, 29));
    assert_eq!(next_due_date(date(2023, 1, 31), Frequency::Monthly), date(2023, 2, 28));
    assert_eq!(next_due_date(date(2024, 3, 31), Frequency::Monthly), date(2024, 4, 30));
}

#[test]
fn monthly_rolls_into_next_year() {
    assert_eq!(next_due_date(date(2024, 12, 15), Frequency::Monthly), date(2025, 1, 15));
}

#[test]
fn daily_weekly_yearly_steps() {
    let start = date(2024, 3, 10);
    assert_eq!(next_due_date(start, Frequency::Daily), date(2024, 3, 11));
    assert_eq!(next_due_date(start, Frequency::Weekly), date(2024, 3, 17));
    assert_eq!(next_due_date(start, Frequency::Yearly), date(2025, 3, 10));
    assert_eq!(next_due_date(date(2024, 2, 29), Frequency::Yearly), date(2025, 2, 28));
}

#[test]
fn string_input_is_validated() {
    assert_eq!(
        next_due_date_str("2024-01-31", Frequency::Monthly),
        Ok(date(2024, 2, 29))
    );
    assert!(matches!(
        next_due_date_str("31/01/2024", Frequency::Monthly),
        Err(RecurrenceError::Malformed(_))
    ));
    assert!(matches!(
        next_due_date_str("2023-02-30", Frequency::Monthly),
        Err(RecurrenceError::InvalidDate(_))
    ));
}

#[test]
fn lenient_variant_falls_back_to_today() {
    let today = date(2025, 6, 1);
    assert_eq!(next_due_date_or_today("garbage", Frequency::Weekly, today), today);
    assert_eq!(
        next_due_date_or_today("2025-06-01", Frequency::Weekly, today),
        date(2025, 6, 8)
    );
}

#[test]
fn monthly_chain_steps_from_previous_occurrence() {
    let dates = occurrences_between(Frequency::Monthly, date(2024, 1, 31), date(2024, 4, 30));
    assert_eq!(
        dates,
        vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 29), date(2024, 4, 29)]
    );
}

#[test]
fn occurrences_are_capped() {
    let dates = occurrences_between(Frequency::Daily, date(2000, 1, 1), date(2010, 1, 1));
    assert_eq!(dates.len(), MAX_OCCURRENCES);
}

#[test]
fn first_occurrence_in_later_year() {
    let weekly = RecurrenceRule::new(Frequency::Weekly, date(2024, 12, 30));
    assert_eq!(weekly.first_occurrence_in_year(2025), date(2025, 1, 6));

    let monthly = RecurrenceRule::new(Frequency::Monthly, date(2024, 5, 31));
    assert_eq!(monthly.first_occurrence_in_year(2025), date(2025, 1, 31));

    let yearly = RecurrenceRule::new(Frequency::Yearly, date(2020, 2, 29));
    assert_eq!(yearly.first_occurrence_in_year(2025), date(2025, 2, 28));

    let daily = RecurrenceRule::new(Frequency::Daily, date(2024, 7, 1));
    assert_eq!(daily.first_occurrence_in_year(2025), date(2025, 1, 1));

    let current = RecurrenceRule::new(Frequency::Monthly, date(2025, 3, 3));
    assert_eq!(current.first_occurrence_in_year(2025), date(2025, 3, 3));
}

#[test]
fn period_windows() {
    let wednesday = date(2025, 3, 12);
    assert_eq!(period_window(Frequency::Daily, wednesday), (wednesday, wednesday));
    assert_eq!(
        period_window(Frequency::Weekly, wednesday),
        (date(2025, 3, 10), date(2025, 3, 16))
    );
    assert_eq!(
        period_window(Frequency::Monthly, date(2024, 2, 10)),
        (date(2024, 2, 1), date(2024, 2, 29))
    );
    assert_eq!(
        period_window(Frequency::Yearly, wednesday),
        (date(2025, 1, 1), date(2025, 12, 31))
    );
}

#[test]
fn frequency_parses_case_insensitively() {
    assert_eq!("Monthly".parse::<Frequency>(), Ok(Frequency::Monthly));
    assert!("fortnightly".parse::<Frequency>().is_err());
}
