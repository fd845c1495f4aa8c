// used for the estimated length of a unit, which gives units their natural order
use chrono::TimeDelta;

// custom made ordering for units
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use lazy_static::lazy_static;

// ------------- PeriodUnit -------------
/// A unit of time that a field counts in, or that bounds a field.
///
/// In the phrase 'hour of day' the hour is the unit and the day is the range.
/// Units are ordered by their estimated duration, so that finer units sort first.
#[derive(Clone, Copy, Debug, Eq)]
pub struct PeriodUnit {
    name: &'static str,
    estimated: TimeDelta,
}

impl PeriodUnit {
    pub fn new(name: &'static str, estimated: TimeDelta) -> Self {
        Self { name, estimated }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn estimated_duration(&self) -> TimeDelta {
        self.estimated
    }
}
impl Ord for PeriodUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.estimated, self.name).cmp(&(other.estimated, other.name))
    }
}
impl PartialOrd for PeriodUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for PeriodUnit {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.estimated == other.estimated
    }
}
impl Hash for PeriodUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.estimated.hash(state);
    }
}
impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- ISO units -------------
// a year is 365.2425 days on average in the ISO calendar
const SECONDS_PER_YEAR: i64 = 31_556_952;

lazy_static! {
    pub static ref NANOS: PeriodUnit = PeriodUnit::new("Nanos", TimeDelta::nanoseconds(1));
    pub static ref MICROS: PeriodUnit = PeriodUnit::new("Micros", TimeDelta::microseconds(1));
    pub static ref MILLIS: PeriodUnit = PeriodUnit::new("Millis", TimeDelta::milliseconds(1));
    pub static ref SECONDS: PeriodUnit = PeriodUnit::new("Seconds", TimeDelta::seconds(1));
    pub static ref MINUTES: PeriodUnit = PeriodUnit::new("Minutes", TimeDelta::minutes(1));
    pub static ref HOURS: PeriodUnit = PeriodUnit::new("Hours", TimeDelta::hours(1));
    pub static ref TWELVE_HOURS: PeriodUnit = PeriodUnit::new("12Hours", TimeDelta::hours(12));
    pub static ref DAYS: PeriodUnit = PeriodUnit::new("Days", TimeDelta::days(1));
    pub static ref WEEKS: PeriodUnit = PeriodUnit::new("Weeks", TimeDelta::weeks(1));
    pub static ref MONTHS: PeriodUnit = PeriodUnit::new("Months", TimeDelta::seconds(SECONDS_PER_YEAR / 12));
    pub static ref QUARTERS: PeriodUnit = PeriodUnit::new("Quarters", TimeDelta::seconds(SECONDS_PER_YEAR / 4));
    pub static ref YEARS: PeriodUnit = PeriodUnit::new("Years", TimeDelta::seconds(SECONDS_PER_YEAR));
}
