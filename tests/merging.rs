use chrono::{NaiveDate, NaiveTime};

use fieldrule::calendrical::{FieldMap, FieldValues};
use fieldrule::error::FieldRuleError;
use fieldrule::iso;
use fieldrule::merge::{FieldMerger, TimeOverflow};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap()
}

#[test]
fn am_pm_merges_into_hour_of_day() {
    let fields = FieldValues::new()
        .with(iso::ampm_of_day(), 1)
        .with(iso::hour_of_ampm(), 3)
        .with(iso::minute_of_hour(), 30);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.time, Some(time(15, 30, 0)));
    assert_eq!(outcome.date, None);
    assert_eq!(outcome.overflow_days, 0);
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn hour_without_minute_stays_unresolved() {
    let fields = FieldValues::new()
        .with(iso::ampm_of_day(), 0)
        .with(iso::hour_of_ampm(), 11);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.time, None);
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved.get_if_present(iso::hour_of_day()), Some(11));
}

#[test]
fn full_time_of_day() {
    let fields = FieldValues::new()
        .with(iso::hour_of_day(), 23)
        .with(iso::minute_of_hour(), 59)
        .with(iso::second_of_minute(), 58)
        .with(iso::nano_of_second(), 1_000);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.time, NaiveTime::from_hms_nano_opt(23, 59, 58, 1_000));
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn year_month_day_merge_into_date() {
    let fields = FieldValues::new()
        .with(iso::year(), 2009)
        .with(iso::month_of_year(), 12)
        .with(iso::day_of_month(), 26)
        .with(iso::day_of_week(), 6);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.date, Some(date(2009, 12, 26)));
    // day of week is left for the caller to cross check
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved.get_if_present(iso::day_of_week()), Some(6));
}

#[test]
fn quarter_merges_before_the_date() {
    let fields = FieldValues::new()
        .with(iso::year(), 2009)
        .with(iso::quarter_of_year(), 4)
        .with(iso::month_of_quarter(), 2)
        .with(iso::day_of_month(), 5);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.date, Some(date(2009, 11, 5)));
    assert!(outcome.unresolved.is_empty());
}

#[test]
fn year_and_day_of_year() {
    let fields = FieldValues::new()
        .with(iso::year(), 2008)
        .with(iso::day_of_year(), 60);
    let outcome = FieldMerger::new(fields).merge().unwrap();
    assert_eq!(outcome.date, Some(date(2008, 2, 29)));
}

#[test]
fn impossible_dates_are_not_merged_strictly() {
    let fields = FieldValues::new()
        .with(iso::year(), 2009)
        .with(iso::month_of_year(), 2)
        .with(iso::day_of_month(), 30);
    let outcome = FieldMerger::new(fields.clone()).merge().unwrap();
    assert_eq!(outcome.date, None);
    assert_eq!(outcome.unresolved.len(), 3);

    let lenient = FieldMerger::new(fields).lenient().merge().unwrap();
    assert_eq!(lenient.date, Some(date(2009, 3, 2)));
}

#[test]
fn lenient_merges_roll_over() {
    let fields = FieldValues::new()
        .with(iso::hour_of_day(), 25)
        .with(iso::minute_of_hour(), 0);
    let strict = FieldMerger::new(fields.clone()).merge();
    assert!(matches!(strict, Err(FieldRuleError::OutOfRange { value: 25, .. })));

    let outcome = FieldMerger::new(fields).lenient().merge().unwrap();
    assert_eq!(outcome.time, Some(time(1, 0, 0)));
    assert_eq!(outcome.overflow_days, 1);

    let months = FieldValues::new()
        .with(iso::year(), 2009)
        .with(iso::month_of_year(), 13)
        .with(iso::day_of_month(), 1);
    let outcome = FieldMerger::new(months).lenient().merge().unwrap();
    assert_eq!(outcome.date, Some(date(2010, 1, 1)));
}

#[test]
fn conflicting_merges_fail() {
    let fields = FieldValues::new()
        .with(iso::hour_of_day(), 10)
        .with(iso::ampm_of_day(), 1)
        .with(iso::hour_of_ampm(), 3);
    let result = FieldMerger::new(fields).merge();
    assert_eq!(
        result.unwrap_err(),
        FieldRuleError::MergeConflict {
            id: "ISO.HourOfDay".to_string(),
            existing: 10,
            merged: 15,
        }
    );

    let agreeing = FieldValues::new()
        .with(iso::hour_of_day(), 15)
        .with(iso::ampm_of_day(), 1)
        .with(iso::hour_of_ampm(), 3)
        .with(iso::minute_of_hour(), 0);
    let outcome = FieldMerger::new(agreeing).merge().unwrap();
    assert_eq!(outcome.time, Some(time(15, 0, 0)));
}

#[test]
fn time_overflow() {
    let before = TimeOverflow::from_seconds(-1, 0, 0, 0).unwrap();
    assert_eq!(before.time, time(23, 0, 0));
    assert_eq!(before.overflow_days, -1);
    let after = TimeOverflow::from_seconds(48, 0, 30, 0).unwrap();
    assert_eq!(after.time, time(0, 0, 30));
    assert_eq!(after.overflow_days, 2);
}

#[test]
fn lenient_nanoseconds_roll_over() {
    let fields = FieldValues::new()
        .with(iso::hour_of_day(), 10)
        .with(iso::minute_of_hour(), 0)
        .with(iso::second_of_minute(), 0)
        .with(iso::nano_of_second(), -5);
    let outcome = FieldMerger::new(fields).lenient().merge().unwrap();
    assert_eq!(outcome.time, NaiveTime::from_hms_nano_opt(9, 59, 59, 999_999_995));
    assert_eq!(outcome.overflow_days, 0);
    assert!(outcome.unresolved.is_empty());

    let late = FieldValues::new()
        .with(iso::hour_of_day(), 23)
        .with(iso::minute_of_hour(), 59)
        .with(iso::second_of_minute(), 59)
        .with(iso::nano_of_second(), 2_000_000_000);
    let outcome = FieldMerger::new(late).lenient().merge().unwrap();
    assert_eq!(outcome.time, Some(time(0, 0, 1)));
    assert_eq!(outcome.overflow_days, 1);

    let nanos_only = TimeOverflow::from_seconds(0, 0, 0, -1).unwrap();
    assert_eq!(nanos_only.time, NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap());
    assert_eq!(nanos_only.overflow_days, -1);
}
