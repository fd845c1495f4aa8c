//! The contracts a rule expects from whatever supplies field values.
//!
//! A [`FieldMap`] answers whether a value is already known for a rule, and a
//! [`Calendrical`] exposes such a map along with the date and time it
//! represents, if any. [`FieldValues`] is a plain container implementing both;
//! the chrono date and time types are calendricals holding no field values.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::rule::{FieldRule, RuleHasher};

pub trait FieldMap {
    /// Quiet lookup, never derives.
    fn get_if_present(&self, rule: &FieldRule) -> Option<i32>;
}

pub trait Calendrical {
    fn fields(&self) -> &dyn FieldMap;
    fn date(&self) -> Option<NaiveDate> {
        None
    }
    fn time(&self) -> Option<NaiveTime> {
        None
    }
}

// ------------- FieldValues -------------
#[derive(Debug, Default, Clone)]
pub struct FieldValues {
    values: HashMap<String, (Arc<FieldRule>, i32), RuleHasher>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, rule: &Arc<FieldRule>, value: i32) -> Self {
        self.set(rule, value);
        self
    }
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }
    /// Stores a value, returning the one it replaced.
    pub fn set(&mut self, rule: &Arc<FieldRule>, value: i32) -> Option<i32> {
        self.values
            .insert(rule.id().to_owned(), (Arc::clone(rule), value))
            .map(|(_, previous)| previous)
    }
    pub fn remove(&mut self, rule: &FieldRule) -> Option<i32> {
        self.values.remove(rule.id()).map(|(_, value)| value)
    }
    pub fn contains(&self, rule: &FieldRule) -> bool {
        self.values.contains_key(rule.id())
    }
    /// The rules held, in rule order.
    pub fn rules(&self) -> Vec<Arc<FieldRule>> {
        let mut rules: Vec<Arc<FieldRule>> = self.values.values().map(|(rule, _)| Arc::clone(rule)).collect();
        rules.sort();
        rules
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FieldMap for FieldValues {
    fn get_if_present(&self, rule: &FieldRule) -> Option<i32> {
        self.values.get(rule.id()).map(|(_, value)| *value)
    }
}
impl Calendrical for FieldValues {
    fn fields(&self) -> &dyn FieldMap {
        self
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

// ------------- chrono -------------
#[derive(Debug, Clone, Copy)]
struct NoFields;
impl FieldMap for NoFields {
    fn get_if_present(&self, _rule: &FieldRule) -> Option<i32> {
        None
    }
}
static NO_FIELDS: NoFields = NoFields;

impl Calendrical for NaiveDate {
    fn fields(&self) -> &dyn FieldMap {
        &NO_FIELDS
    }
    fn date(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}
impl Calendrical for NaiveTime {
    fn fields(&self) -> &dyn FieldMap {
        &NO_FIELDS
    }
    fn time(&self) -> Option<NaiveTime> {
        Some(*self)
    }
}
impl Calendrical for NaiveDateTime {
    fn fields(&self) -> &dyn FieldMap {
        &NO_FIELDS
    }
    fn date(&self) -> Option<NaiveDate> {
        Some(NaiveDateTime::date(self))
    }
    fn time(&self) -> Option<NaiveTime> {
        Some(NaiveDateTime::time(self))
    }
}
