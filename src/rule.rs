//! The rule defining how a measurable field of time operates.
//!
//! A [`FieldRule`] captures the identity of a field like 'day of month', the
//! units it counts in and is bounded by, and its outer value range. What sets
//! one field apart from another (how it derives its value from other fields,
//! how it merges with them, which text it has) is supplied by a
//! [`FieldBehavior`]. Rules are immutable and meant to be shared through `Arc`.

// used for values computed straight from dates and times
use chrono::{NaiveDate, NaiveTime};

use core::hash::{BuildHasherDefault, Hasher};
use seahash::SeaHasher;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::warn;

use crate::cache::{TextByStyle, TextStoreCache, DEFAULT_CACHE_CAPACITY};
use crate::calendrical::{Calendrical, FieldMap};
use crate::error::{FieldRuleError, Result};
use crate::locale::Locale;
use crate::merge::Merger;
use crate::text::{TextMatch, TextStore, TextStyle};
use crate::unit::PeriodUnit;

pub type RuleHasher = BuildHasherDefault<SeaHasher>;

// ------------- FieldBehavior -------------
/// The field specific parts of a rule. Every method has a default that does
/// nothing or falls back to the rule's absolute bounds.
pub trait FieldBehavior: Send + Sync {
    /// Derives the value of `rule` from other fields in the map.
    ///
    /// Must not look for a value of `rule` itself in the map, that check is
    /// made by [`FieldRule::value_quiet`] before derivation is attempted.
    /// Other fields are obtained through their own `value_quiet`, which makes
    /// derivation recursive.
    fn derive_value(&self, _rule: &FieldRule, _fields: &dyn FieldMap) -> Option<i32> {
        None
    }
    fn value_from(&self, _date: Option<NaiveDate>, _time: Option<NaiveTime>) -> Option<i32> {
        None
    }
    /// Merges with other fields into a more significant field.
    ///
    /// Called only when a value for `rule` is held by the merger. A successful
    /// merge records the merged field and marks every field it used, including
    /// `rule`, as processed.
    fn merge_fields(&self, _rule: &FieldRule, _merger: &mut dyn Merger) {}
    /// Merges with other fields into a date or a time, under the same
    /// obligations as [`FieldBehavior::merge_fields`].
    fn merge_date_time(&self, _rule: &FieldRule, _merger: &mut dyn Merger) {}
    fn largest_minimum_value(&self, rule: &FieldRule) -> i32 {
        rule.minimum_value()
    }
    fn smallest_maximum_value(&self, rule: &FieldRule) -> i32 {
        rule.maximum_value()
    }
    fn minimum_value_in(&self, rule: &FieldRule, _context: &dyn Calendrical) -> i32 {
        rule.minimum_value()
    }
    fn maximum_value_in(&self, rule: &FieldRule, _context: &dyn Calendrical) -> i32 {
        rule.maximum_value()
    }
    /// Supplies the text of every style for the locale. Called again whenever
    /// the cached stores of the locale were reclaimed, so it must be pure.
    fn text(&self, _rule: &FieldRule, _locale: &Locale) -> TextByStyle {
        TextByStyle::new()
    }
}

/// A field with nothing beyond its range.
#[derive(Debug, Default, Clone, Copy)]
pub struct Plain;
impl FieldBehavior for Plain {}

// ------------- FieldRule -------------
pub struct FieldRule {
    chronology: String,
    id: String,
    name: String,
    period_unit: Option<PeriodUnit>,
    period_range: Option<PeriodUnit>,
    minimum: i32,
    maximum: i32,
    text_stores: Option<TextStoreCache>, // only allocated for rules with text
    behavior: Box<dyn FieldBehavior>,
}

impl FieldRule {
    pub fn builder(chronology: &str, name: &str) -> FieldRuleBuilder {
        FieldRuleBuilder::new(chronology, name)
    }
    /// The id is of the form 'ChronologyName.FieldName'.
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn chronology(&self) -> &str {
        &self.chronology
    }
    pub fn period_unit(&self) -> Option<PeriodUnit> {
        self.period_unit
    }
    /// None if the field is unbounded.
    pub fn period_range(&self) -> Option<PeriodUnit> {
        self.period_range
    }
    pub fn has_text(&self) -> bool {
        self.text_stores.is_some()
    }

    // ------------- range -------------
    pub fn minimum_value(&self) -> i32 {
        self.minimum
    }
    pub fn maximum_value(&self) -> i32 {
        self.maximum
    }
    pub fn largest_minimum_value(&self) -> i32 {
        self.behavior.largest_minimum_value(self)
    }
    pub fn smallest_maximum_value(&self) -> i32 {
        self.behavior.smallest_maximum_value(self)
    }
    /// The minimum refined by whatever the context reveals, which may still
    /// be the absolute minimum if the context says too little.
    pub fn minimum_value_in(&self, context: &dyn Calendrical) -> i32 {
        self.behavior.minimum_value_in(self, context)
    }
    pub fn maximum_value_in(&self, context: &dyn Calendrical) -> i32 {
        self.behavior.maximum_value_in(self, context)
    }
    /// True if the set of values never varies with context.
    pub fn is_fixed_value_set(&self) -> bool {
        self.maximum_value() == self.smallest_maximum_value()
            && self.minimum_value() == self.largest_minimum_value()
    }
    /// Checks against the outer range only, for `i32` and `i64` alike.
    pub fn is_valid_value<V: Into<i64>>(&self, value: V) -> bool {
        let value = value.into();
        value >= i64::from(self.minimum_value()) && value <= i64::from(self.maximum_value())
    }
    pub fn check_value<V: Into<i64>>(&self, value: V) -> Result<i32> {
        let value = value.into();
        if self.is_valid_value(value) {
            if let Ok(narrowed) = i32::try_from(value) {
                return Ok(narrowed);
            }
        }
        Err(FieldRuleError::OutOfRange {
            id: self.id.clone(),
            value,
            min: self.minimum_value(),
            max: self.maximum_value(),
        })
    }
    pub(crate) fn unsupported(&self, reason: impl Into<String>) -> FieldRuleError {
        FieldRuleError::Unsupported {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    // ------------- values -------------
    /// Obtains the value from the calendrical, checked against the outer range.
    ///
    /// The field values are consulted first, then derivation, and finally the
    /// date and time of the calendrical.
    pub fn value(&self, calendrical: &dyn Calendrical) -> Result<i32> {
        let value = self
            .value_quiet(calendrical.fields())
            .or_else(|| self.value_from_quiet(calendrical.date(), calendrical.time()))
            .ok_or_else(|| self.unsupported(format!("{} cannot be obtained from the calendrical", self.name)))?;
        self.check_value(value)
    }
    /// The value held by the map, otherwise a derived one.
    pub fn value_quiet(&self, fields: &dyn FieldMap) -> Option<i32> {
        fields
            .get_if_present(self)
            .or_else(|| self.derive_value(fields))
    }
    pub fn derive_value(&self, fields: &dyn FieldMap) -> Option<i32> {
        self.behavior.derive_value(self, fields)
    }
    pub fn value_from_quiet(&self, date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<i32> {
        self.behavior.value_from(date, time)
    }
    pub fn value_from(&self, date: Option<NaiveDate>, time: Option<NaiveTime>) -> Result<i32> {
        self.value_from_quiet(date, time)
            .ok_or_else(|| self.unsupported(format!("{} cannot be obtained from the date and time", self.name)))
    }
    pub fn is_supported(&self, date: Option<NaiveDate>, time: Option<NaiveTime>) -> bool {
        self.value_from_quiet(date, time).is_some()
    }

    // ------------- merging -------------
    pub fn merge_fields(&self, merger: &mut dyn Merger) {
        self.behavior.merge_fields(self, merger);
    }
    pub fn merge_date_time(&self, merger: &mut dyn Merger) {
        self.behavior.merge_date_time(self, merger);
    }

    // ------------- text -------------
    /// The text store for the locale and style, None if there is no text.
    pub fn text_store(&self, locale: &Locale, style: TextStyle) -> Result<Option<Arc<TextStore>>> {
        let Some(cache) = &self.text_stores else {
            return Ok(None);
        };
        cache
            .store(locale, style, |locale| self.behavior.text(self, locale))
            .inspect_err(|e| warn!(rule = %self.id, %locale, error = %e, "text store population failed"))
    }
    /// The text of a value, or the value in decimal when there is none.
    pub fn text(&self, value: i32, locale: &Locale, style: TextStyle) -> Result<String> {
        let store = self.text_store(locale, style)?;
        Ok(store
            .and_then(|store| store.text(value).map(str::to_owned))
            .unwrap_or_else(|| value.to_string()))
    }
    /// Matches text for the locale and style; a rule without a store for them
    /// cannot parse at all.
    pub fn match_text(&self, locale: &Locale, style: TextStyle, ignore_case: bool, input: &str) -> Result<TextMatch> {
        Ok(match self.text_store(locale, style)? {
            Some(store) => store.match_text(ignore_case, input),
            None => TextMatch::Unsupported,
        })
    }
    pub fn text_cache(&self) -> Option<&TextStoreCache> {
        self.text_stores.as_ref()
    }
}

// an absent unit or range sorts after any present one
fn cmp_present_first(a: Option<PeriodUnit>, b: Option<PeriodUnit>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rules order by period unit, then period range, then chronology name, so
/// that MinuteOfHour < HourOfDay < DayOfWeek < DayOfMonth < DayOfYear. The id
/// breaks any remaining tie.
impl Ord for FieldRule {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_present_first(self.period_unit, other.period_unit)
            .then_with(|| cmp_present_first(self.period_range, other.period_range))
            .then_with(|| self.chronology.cmp(&other.chronology))
            .then_with(|| self.id.cmp(&other.id))
    }
}
impl PartialOrd for FieldRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for FieldRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for FieldRule {}
impl Hash for FieldRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("id", &self.id)
            .field("period_unit", &self.period_unit.map(|u| u.name()))
            .field("period_range", &self.period_range.map(|u| u.name()))
            .field("minimum", &self.minimum)
            .field("maximum", &self.maximum)
            .field("has_text", &self.has_text())
            .finish()
    }
}

// ------------- FieldRuleBuilder -------------
pub struct FieldRuleBuilder {
    chronology: String,
    name: String,
    period_unit: Option<PeriodUnit>,
    period_range: Option<PeriodUnit>,
    minimum: i32,
    maximum: i32,
    text_capacity: Option<usize>,
    behavior: Box<dyn FieldBehavior>,
}

impl FieldRuleBuilder {
    fn new(chronology: &str, name: &str) -> Self {
        Self {
            chronology: chronology.to_owned(),
            name: name.to_owned(),
            period_unit: None,
            period_range: None,
            minimum: i32::MIN,
            maximum: i32::MAX,
            text_capacity: None,
            behavior: Box::new(Plain),
        }
    }
    pub fn unit(mut self, unit: PeriodUnit) -> Self {
        self.period_unit = Some(unit);
        self
    }
    pub fn range(mut self, range: PeriodUnit) -> Self {
        self.period_range = Some(range);
        self
    }
    pub fn values(mut self, minimum: i32, maximum: i32) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }
    pub fn with_text(self) -> Self {
        self.text_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }
    /// Gives the rule text, caching the stores of at most `capacity` locales.
    pub fn text_cache_capacity(mut self, capacity: usize) -> Self {
        self.text_capacity = Some(capacity);
        self
    }
    pub fn behavior<B: FieldBehavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Box::new(behavior);
        self
    }
    pub fn build(self) -> Result<FieldRule> {
        if self.chronology.is_empty() || self.chronology.contains('.') {
            return Err(FieldRuleError::InvalidConfiguration(format!(
                "'{}' is not a valid chronology name",
                self.chronology
            )));
        }
        if self.name.is_empty() {
            return Err(FieldRuleError::InvalidConfiguration(
                "The name of a field must not be empty".to_string(),
            ));
        }
        if self.minimum > self.maximum {
            return Err(FieldRuleError::InvalidConfiguration(format!(
                "The minimum {} of {} exceeds its maximum {}",
                self.minimum, self.name, self.maximum
            )));
        }
        Ok(self.assemble())
    }
    // for definitions known to be valid
    pub(crate) fn assemble(self) -> FieldRule {
        FieldRule {
            id: format!("{}.{}", self.chronology, self.name),
            chronology: self.chronology,
            name: self.name,
            period_unit: self.period_unit,
            period_range: self.period_range,
            minimum: self.minimum,
            maximum: self.maximum,
            text_stores: self.text_capacity.map(TextStoreCache::new),
            behavior: self.behavior,
        }
    }
}
