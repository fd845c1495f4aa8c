//! Field rules of the ISO-8601 calendar system.
//!
//! The rules are created once per process and shared. Text is provided in
//! English only; any other locale falls back to decimal values.

use std::collections::BTreeMap;
use std::sync::Arc;

// used to compute field values from dates and times
use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Timelike};
use lazy_static::lazy_static;

use crate::cache::TextByStyle;
use crate::calendrical::{Calendrical, FieldMap};
use crate::locale::Locale;
use crate::merge::{Merger, TimeOverflow};
use crate::rule::{FieldBehavior, FieldRule, FieldRuleBuilder};
use crate::text::TextStyle;
use crate::unit::{DAYS, HOURS, MINUTES, MONTHS, NANOS, QUARTERS, SECONDS, TWELVE_HOURS, WEEKS, YEARS};

pub const CHRONOLOGY: &str = "ISO";

pub const MIN_YEAR: i32 = -999_999_999;
pub const MAX_YEAR: i32 = 999_999_999;

fn iso(name: &str) -> FieldRuleBuilder {
    FieldRule::builder(CHRONOLOGY, name)
}

lazy_static! {
    static ref NANO_OF_SECOND: Arc<FieldRule> = Arc::new(
        iso("NanoOfSecond").unit(*NANOS).range(*SECONDS).values(0, 999_999_999).behavior(NanoOfSecond).assemble()
    );
    static ref SECOND_OF_MINUTE: Arc<FieldRule> = Arc::new(
        iso("SecondOfMinute").unit(*SECONDS).range(*MINUTES).values(0, 59).behavior(SecondOfMinute).assemble()
    );
    static ref MINUTE_OF_HOUR: Arc<FieldRule> = Arc::new(
        iso("MinuteOfHour").unit(*MINUTES).range(*HOURS).values(0, 59).behavior(MinuteOfHour).assemble()
    );
    static ref HOUR_OF_AMPM: Arc<FieldRule> = Arc::new(
        iso("HourOfAmPm").unit(*HOURS).range(*TWELVE_HOURS).values(0, 11).behavior(HourOfAmPm).assemble()
    );
    static ref HOUR_OF_DAY: Arc<FieldRule> = Arc::new(
        iso("HourOfDay").unit(*HOURS).range(*DAYS).values(0, 23).behavior(HourOfDay).assemble()
    );
    static ref AMPM_OF_DAY: Arc<FieldRule> = Arc::new(
        iso("AmPmOfDay").unit(*TWELVE_HOURS).range(*DAYS).values(0, 1).with_text().behavior(AmPmOfDay).assemble()
    );
    static ref DAY_OF_WEEK: Arc<FieldRule> = Arc::new(
        iso("DayOfWeek").unit(*DAYS).range(*WEEKS).values(1, 7).with_text().behavior(DayOfWeek).assemble()
    );
    static ref DAY_OF_MONTH: Arc<FieldRule> = Arc::new(
        iso("DayOfMonth").unit(*DAYS).range(*MONTHS).values(1, 31).behavior(DayOfMonth).assemble()
    );
    static ref DAY_OF_YEAR: Arc<FieldRule> = Arc::new(
        iso("DayOfYear").unit(*DAYS).range(*YEARS).values(1, 366).behavior(DayOfYear).assemble()
    );
    static ref MONTH_OF_QUARTER: Arc<FieldRule> = Arc::new(
        iso("MonthOfQuarter").unit(*MONTHS).range(*QUARTERS).values(1, 3).behavior(MonthOfQuarter).assemble()
    );
    static ref MONTH_OF_YEAR: Arc<FieldRule> = Arc::new(
        iso("MonthOfYear").unit(*MONTHS).range(*YEARS).values(1, 12).with_text().behavior(MonthOfYear).assemble()
    );
    static ref QUARTER_OF_YEAR: Arc<FieldRule> = Arc::new(
        iso("QuarterOfYear").unit(*QUARTERS).range(*YEARS).values(1, 4).with_text().behavior(QuarterOfYear).assemble()
    );
    static ref YEAR: Arc<FieldRule> = Arc::new(
        iso("Year").unit(*YEARS).values(MIN_YEAR, MAX_YEAR).behavior(Year).assemble()
    );
}

pub fn nano_of_second() -> &'static Arc<FieldRule> {
    &NANO_OF_SECOND
}
pub fn second_of_minute() -> &'static Arc<FieldRule> {
    &SECOND_OF_MINUTE
}
pub fn minute_of_hour() -> &'static Arc<FieldRule> {
    &MINUTE_OF_HOUR
}
pub fn hour_of_ampm() -> &'static Arc<FieldRule> {
    &HOUR_OF_AMPM
}
pub fn hour_of_day() -> &'static Arc<FieldRule> {
    &HOUR_OF_DAY
}
pub fn ampm_of_day() -> &'static Arc<FieldRule> {
    &AMPM_OF_DAY
}
pub fn day_of_week() -> &'static Arc<FieldRule> {
    &DAY_OF_WEEK
}
pub fn day_of_month() -> &'static Arc<FieldRule> {
    &DAY_OF_MONTH
}
pub fn day_of_year() -> &'static Arc<FieldRule> {
    &DAY_OF_YEAR
}
pub fn month_of_quarter() -> &'static Arc<FieldRule> {
    &MONTH_OF_QUARTER
}
pub fn month_of_year() -> &'static Arc<FieldRule> {
    &MONTH_OF_YEAR
}
pub fn quarter_of_year() -> &'static Arc<FieldRule> {
    &QUARTER_OF_YEAR
}
pub fn year() -> &'static Arc<FieldRule> {
    &YEAR
}

/// Every ISO rule.
pub fn rules() -> Vec<Arc<FieldRule>> {
    [
        nano_of_second(),
        second_of_minute(),
        minute_of_hour(),
        hour_of_ampm(),
        hour_of_day(),
        ampm_of_day(),
        day_of_week(),
        day_of_month(),
        day_of_year(),
        month_of_quarter(),
        month_of_year(),
        quarter_of_year(),
        year(),
    ]
    .into_iter()
    .map(Arc::clone)
    .collect()
}

// ------------- helpers -------------
pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
}

pub fn month_length(month: i32, leap: bool) -> i32 {
    match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// a value from the context's fields, or else its date
fn known(rule: &FieldRule, context: &dyn Calendrical) -> Option<i32> {
    rule.value_quiet(context.fields())
        .or_else(|| rule.value_from_quiet(context.date(), context.time()))
}

fn styled(first: i32, full: &[&str], short: &[&str], narrow: &[&str]) -> TextByStyle {
    let numbered = |texts: &[&str]| -> BTreeMap<i32, String> {
        (first..)
            .zip(texts.iter())
            .map(|(value, text)| (value, text.to_string()))
            .collect()
    };
    let mut text = TextByStyle::new();
    text.insert(TextStyle::Full, numbered(full));
    text.insert(TextStyle::Short, numbered(short));
    text.insert(TextStyle::Narrow, numbered(narrow));
    text
}

fn english(locale: &Locale) -> bool {
    locale.language() == "en"
}

// ------------- time of day -------------
struct NanoOfSecond;
impl FieldBehavior for NanoOfSecond {
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.nanosecond()).ok())
    }
}

struct SecondOfMinute;
impl FieldBehavior for SecondOfMinute {
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.second()).ok())
    }
}

struct MinuteOfHour;
impl FieldBehavior for MinuteOfHour {
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.minute()).ok())
    }
}

struct HourOfAmPm;
impl FieldBehavior for HourOfAmPm {
    fn derive_value(&self, _rule: &FieldRule, fields: &dyn FieldMap) -> Option<i32> {
        hour_of_day().value_quiet(fields).map(|hour| hour.rem_euclid(12))
    }
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.hour() % 12).ok())
    }
}

struct HourOfDay;
impl FieldBehavior for HourOfDay {
    // held values only, AM/PM and hour of AM/PM derive from this field
    fn derive_value(&self, _rule: &FieldRule, fields: &dyn FieldMap) -> Option<i32> {
        let am_pm = fields.get_if_present(ampm_of_day())?;
        let hour = fields.get_if_present(hour_of_ampm())?;
        am_pm.checked_mul(12)?.checked_add(hour)
    }
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.hour()).ok())
    }
    fn merge_date_time(&self, rule: &FieldRule, merger: &mut dyn Merger) {
        let Some(hour) = merger.value(rule) else {
            return;
        };
        let Some(minute) = merger.value(minute_of_hour()) else {
            return;
        };
        let second = merger.value(second_of_minute());
        let nano = merger.value(nano_of_second());
        if merger.is_strict() {
            let (Ok(h), Ok(m), Ok(s), Ok(n)) = (
                u32::try_from(hour),
                u32::try_from(minute),
                u32::try_from(second.unwrap_or(0)),
                u32::try_from(nano.unwrap_or(0)),
            ) else {
                return;
            };
            let Some(time) = NaiveTime::from_hms_nano_opt(h, m, s, n) else {
                return;
            };
            merger.record_merged_time(time);
        } else {
            let overflow = TimeOverflow::from_seconds(
                i64::from(hour),
                i64::from(minute),
                i64::from(second.unwrap_or(0)),
                i64::from(nano.unwrap_or(0)),
            );
            let Some(overflow) = overflow else {
                return;
            };
            merger.record_merged_time_overflow(overflow);
        }
        merger.mark_processed(rule);
        merger.mark_processed(minute_of_hour());
        if second.is_some() {
            merger.mark_processed(second_of_minute());
        }
        if nano.is_some() {
            merger.mark_processed(nano_of_second());
        }
    }
}

struct AmPmOfDay;
impl FieldBehavior for AmPmOfDay {
    fn derive_value(&self, _rule: &FieldRule, fields: &dyn FieldMap) -> Option<i32> {
        hour_of_day().value_quiet(fields).map(|hour| hour.div_euclid(12))
    }
    fn value_from(&self, _date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        time.and_then(|t| i32::try_from(t.hour() / 12).ok())
    }
    fn merge_fields(&self, rule: &FieldRule, merger: &mut dyn Merger) {
        let Some(hour) = merger.value(hour_of_ampm()) else {
            return;
        };
        let Some(am_pm) = merger.value(rule) else {
            return;
        };
        let Some(hour_of_day_value) = am_pm.checked_mul(12).and_then(|h| h.checked_add(hour)) else {
            return;
        };
        merger.record_merged_field(hour_of_day(), hour_of_day_value);
        merger.mark_processed(rule);
        merger.mark_processed(hour_of_ampm());
    }
    fn text(&self, _rule: &FieldRule, locale: &Locale) -> TextByStyle {
        if !english(locale) {
            return TextByStyle::new();
        }
        styled(0, &["AM", "PM"], &["AM", "PM"], &["a", "p"])
    }
}

// ------------- date -------------
struct DayOfWeek;
impl FieldBehavior for DayOfWeek {
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.weekday().number_from_monday()).ok())
    }
    fn text(&self, _rule: &FieldRule, locale: &Locale) -> TextByStyle {
        if !english(locale) {
            return TextByStyle::new();
        }
        styled(
            1,
            &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
            &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            &["M", "T", "W", "T", "F", "S", "S"],
        )
    }
}

struct DayOfMonth;
impl FieldBehavior for DayOfMonth {
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.day()).ok())
    }
    fn smallest_maximum_value(&self, _rule: &FieldRule) -> i32 {
        28
    }
    fn maximum_value_in(&self, rule: &FieldRule, context: &dyn Calendrical) -> i32 {
        let Some(month) = known(month_of_year(), context).filter(|m| month_of_year().is_valid_value(*m)) else {
            return rule.maximum_value();
        };
        match known(year(), context) {
            Some(year) => month_length(month, is_leap_year(year)),
            None => month_length(month, true),
        }
    }
}

struct DayOfYear;
impl FieldBehavior for DayOfYear {
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.ordinal()).ok())
    }
    fn smallest_maximum_value(&self, _rule: &FieldRule) -> i32 {
        365
    }
    fn maximum_value_in(&self, rule: &FieldRule, context: &dyn Calendrical) -> i32 {
        match known(year(), context) {
            Some(year) if is_leap_year(year) => 366,
            Some(_) => 365,
            None => rule.maximum_value(),
        }
    }
}

struct MonthOfQuarter;
impl FieldBehavior for MonthOfQuarter {
    fn derive_value(&self, _rule: &FieldRule, fields: &dyn FieldMap) -> Option<i32> {
        month_of_year().value_quiet(fields).map(|month| (month - 1).rem_euclid(3) + 1)
    }
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.month0() % 3 + 1).ok())
    }
}

struct MonthOfYear;
impl FieldBehavior for MonthOfYear {
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.month()).ok())
    }
    fn text(&self, _rule: &FieldRule, locale: &Locale) -> TextByStyle {
        if !english(locale) {
            return TextByStyle::new();
        }
        styled(
            1,
            &[
                "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
                "November", "December",
            ],
            &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
            &["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"],
        )
    }
}

struct QuarterOfYear;
impl FieldBehavior for QuarterOfYear {
    fn derive_value(&self, _rule: &FieldRule, fields: &dyn FieldMap) -> Option<i32> {
        month_of_year().value_quiet(fields).map(|month| (month - 1).div_euclid(3) + 1)
    }
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.and_then(|d| i32::try_from(d.month0() / 3 + 1).ok())
    }
    fn merge_fields(&self, rule: &FieldRule, merger: &mut dyn Merger) {
        let Some(month) = merger.value(month_of_quarter()) else {
            return;
        };
        let Some(quarter) = merger.value(rule) else {
            return;
        };
        let Some(month_of_year_value) = (quarter - 1).checked_mul(3).and_then(|m| m.checked_add(month)) else {
            return;
        };
        merger.record_merged_field(month_of_year(), month_of_year_value);
        merger.mark_processed(rule);
        merger.mark_processed(month_of_quarter());
    }
    fn text(&self, _rule: &FieldRule, locale: &Locale) -> TextByStyle {
        if !english(locale) {
            return TextByStyle::new();
        }
        styled(
            1,
            &["1st quarter", "2nd quarter", "3rd quarter", "4th quarter"],
            &["Q1", "Q2", "Q3", "Q4"],
            &["1", "2", "3", "4"],
        )
    }
}

struct Year;
impl FieldBehavior for Year {
    fn value_from(&self, date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        date.map(|d| d.year())
    }
    fn merge_date_time(&self, rule: &FieldRule, merger: &mut dyn Merger) {
        let Some(year_value) = merger.value(rule) else {
            return;
        };
        let strict = merger.is_strict();
        if let (Some(month), Some(day)) = (merger.value(month_of_year()), merger.value(day_of_month())) {
            let date = if strict {
                match (u32::try_from(month), u32::try_from(day)) {
                    (Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(year_value, m, d),
                    _ => None,
                }
            } else {
                lenient_date(year_value, month, day)
            };
            if let Some(date) = date {
                merger.record_merged_date(date);
                merger.mark_processed(rule);
                merger.mark_processed(month_of_year());
                merger.mark_processed(day_of_month());
            }
            return;
        }
        if let Some(ordinal) = merger.value(day_of_year()) {
            let date = if strict {
                u32::try_from(ordinal)
                    .ok()
                    .and_then(|o| NaiveDate::from_yo_opt(year_value, o))
            } else {
                NaiveDate::from_yo_opt(year_value, 1)
                    .and_then(|d| d.checked_add_signed(TimeDelta::try_days(i64::from(ordinal) - 1)?))
            };
            if let Some(date) = date {
                merger.record_merged_date(date);
                merger.mark_processed(rule);
                merger.mark_processed(day_of_year());
            }
        }
    }
}

// rolls excess months into years and excess days into months
fn lenient_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let month0 = month.checked_sub(1)?;
    let year = year.checked_add(month0.div_euclid(12))?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(TimeDelta::try_days(i64::from(day) - 1)?)
}
