//! Merging fields into more significant fields, dates and times.
//!
//! Rules take part in a merge through [`FieldRule::merge_fields`] and
//! [`FieldRule::merge_date_time`], talking to the [`Merger`] they are handed.
//! [`FieldMerger`] is a straightforward driver: it lets every held field merge
//! into more significant fields until nothing new turns up, then lets the
//! remaining fields merge into a date or time.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::calendrical::{Calendrical, FieldMap, FieldValues};
use crate::error::{FieldRuleError, Result};
use crate::rule::{FieldRule, RuleHasher};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A time that overflowed into neighbouring days during a lenient merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeOverflow {
    pub time: NaiveTime,
    pub overflow_days: i64,
}

impl TimeOverflow {
    /// Normalises a possibly out of range time of day, nanoseconds included.
    pub fn from_seconds(hour: i64, minute: i64, second: i64, nano: i64) -> Option<Self> {
        let total = hour
            .checked_mul(3600)?
            .checked_add(minute.checked_mul(60)?)?
            .checked_add(second)?
            .checked_add(nano.div_euclid(NANOS_PER_SECOND))?;
        let overflow_days = total.div_euclid(86_400);
        let seconds = u32::try_from(total.rem_euclid(86_400)).ok()?;
        let nano = u32::try_from(nano.rem_euclid(NANOS_PER_SECOND)).ok()?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nano)?;
        Some(Self { time, overflow_days })
    }
}

pub trait Merger {
    fn value(&self, rule: &FieldRule) -> Option<i32>;
    fn record_merged_field(&mut self, rule: &Arc<FieldRule>, value: i32);
    fn record_merged_date(&mut self, date: NaiveDate);
    fn record_merged_time(&mut self, time: NaiveTime);
    fn record_merged_time_overflow(&mut self, time: TimeOverflow);
    fn mark_processed(&mut self, rule: &FieldRule);
    /// Lenient merges may accept values outside a field's range.
    fn is_strict(&self) -> bool {
        true
    }
}

// ------------- FieldMerger -------------
#[derive(Debug, Default)]
pub struct FieldMerger {
    fields: FieldValues,
    processed: HashSet<String, RuleHasher>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    overflow_days: i64,
    lenient: bool,
    conflict: Option<FieldRuleError>,
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub overflow_days: i64,
    /// Fields still held, merged ones included, that were not consumed.
    pub unresolved: FieldValues,
}

impl FieldMerger {
    pub fn new(fields: FieldValues) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn merge(mut self) -> Result<MergeOutcome> {
        if !self.lenient {
            for rule in self.fields.rules() {
                if let Some(value) = self.fields.get_if_present(&rule) {
                    rule.check_value(value)?;
                }
            }
        }
        // merging may add fields, which in turn may merge further
        let mut visited = HashSet::<String, RuleHasher>::default();
        loop {
            let pending: Vec<Arc<FieldRule>> = self
                .fields
                .rules()
                .into_iter()
                .filter(|rule| !visited.contains(rule.id()))
                .collect();
            if pending.is_empty() {
                break;
            }
            for rule in pending {
                visited.insert(rule.id().to_owned());
                if self.is_open(&rule) {
                    rule.merge_fields(&mut self);
                }
            }
        }
        for rule in self.fields.rules() {
            if self.is_open(&rule) {
                rule.merge_date_time(&mut self);
            }
        }
        if let Some(conflict) = self.conflict.take() {
            return Err(conflict);
        }
        let mut unresolved = FieldValues::new();
        for rule in self.fields.rules() {
            if !self.is_open(&rule) {
                continue;
            }
            if let Some(value) = self.fields.get_if_present(&rule) {
                unresolved.set(&rule, value);
            }
        }
        debug!(
            date = ?self.date,
            time = ?self.time,
            unresolved = unresolved.len(),
            "merge complete"
        );
        Ok(MergeOutcome {
            date: self.date,
            time: self.time,
            overflow_days: self.overflow_days,
            unresolved,
        })
    }

    fn is_open(&self, rule: &FieldRule) -> bool {
        !self.processed.contains(rule.id()) && self.fields.contains(rule)
    }
}

impl Merger for FieldMerger {
    fn value(&self, rule: &FieldRule) -> Option<i32> {
        self.fields.get_if_present(rule)
    }
    fn record_merged_field(&mut self, rule: &Arc<FieldRule>, value: i32) {
        match self.fields.get_if_present(rule) {
            Some(existing) if existing != value => {
                // the first conflict is the one reported
                if self.conflict.is_none() {
                    self.conflict = Some(FieldRuleError::MergeConflict {
                        id: rule.id().to_owned(),
                        existing,
                        merged: value,
                    });
                }
            }
            Some(_) => {}
            None => {
                self.fields.set(rule, value);
            }
        }
    }
    fn record_merged_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }
    fn record_merged_time(&mut self, time: NaiveTime) {
        self.time = Some(time);
    }
    fn record_merged_time_overflow(&mut self, time: TimeOverflow) {
        self.time = Some(time.time);
        self.overflow_days = time.overflow_days;
    }
    fn mark_processed(&mut self, rule: &FieldRule) {
        self.processed.insert(rule.id().to_owned());
    }
    fn is_strict(&self) -> bool {
        !self.lenient
    }
}

impl Calendrical for FieldMerger {
    fn fields(&self) -> &dyn FieldMap {
        &self.fields
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}
