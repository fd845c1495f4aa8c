// used to keep the one-to-one mapping between values and their text
use bimap::BiMap;

// case insensitive lookups use HashMap with a fast hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;

use crate::error::{FieldRuleError, Result};
use crate::locale::Locale;

pub type TextHasher = BuildHasherDefault<SeaHasher>;

// ------------- TextStyle -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Full,
    Short,
    Narrow,
}

// ------------- TextMatch -------------
/// Outcome of matching input against a text store.
///
/// `length` is measured in bytes of the probed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMatch {
    Matched { length: usize, value: i32 },
    NoMatch,
    /// The store holds duplicate text and can never parse.
    Unsupported,
}

// ------------- TextStore -------------
/// The mapping between integer values and their textual representation for
/// one locale and style.
///
/// Text stores are immutable. When two values share the same text the store
/// remains usable for printing, but text-to-value lookups are disabled since
/// parsing would be ambiguous.
#[derive(Debug)]
pub struct TextStore {
    locale: Locale,
    value_text: BTreeMap<i32, String>,
    exact: BiMap<i32, String>,
    insensitive: HashMap<String, i32, TextHasher>,
    lengths: Option<Vec<usize>>, // ascending, None when parsing is disabled
}

impl TextStore {
    pub fn new<I>(locale: Locale, value_text: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, String)>,
    {
        let value_text: BTreeMap<i32, String> = value_text.into_iter().collect();
        if let Some((value, _)) = value_text.iter().find(|(_, text)| text.is_empty()) {
            return Err(FieldRuleError::InvalidConfiguration(format!(
                "The text for value {value} must not be empty"
            )));
        }
        let mut exact = BiMap::new();
        let mut insensitive = HashMap::<String, i32, TextHasher>::default();
        let mut lengths = BTreeSet::new();
        let mut duplicated = false;
        for (&value, text) in value_text.iter() {
            if exact.insert_no_overwrite(value, text.clone()).is_err() {
                duplicated = true;
                break;
            }
            lengths.insert(text.len());
            let lower = locale.to_lower(text);
            lengths.insert(lower.len());
            insensitive.insert(lower, value);
            let upper = locale.to_upper(text);
            lengths.insert(upper.len());
            insensitive.insert(upper, value);
        }
        if duplicated {
            return Ok(Self {
                locale,
                value_text,
                exact: BiMap::new(),
                insensitive: HashMap::default(),
                lengths: None,
            });
        }
        Ok(Self {
            locale,
            value_text,
            exact,
            insensitive,
            lengths: Some(lengths.into_iter().collect()),
        })
    }
    pub fn locale(&self) -> &Locale {
        &self.locale
    }
    pub fn value_text_map(&self) -> &BTreeMap<i32, String> {
        &self.value_text
    }
    pub fn text(&self, value: i32) -> Option<&str> {
        self.value_text.get(&value).map(String::as_str)
    }
    /// The reverse mapping, empty if the store holds duplicate text.
    pub fn text_value_map(&self) -> impl Iterator<Item = (&str, i32)> {
        self.exact.iter().map(|(value, text)| (text.as_str(), *value))
    }
    pub fn is_parseable(&self) -> bool {
        self.lengths.is_some()
    }
    /// Matches the longest stored text that prefixes `input`.
    ///
    /// Only the distinct lengths of stored texts are probed, from the longest
    /// one that fits the probed text downwards. Ignoring case tries the upper
    /// and then the lower cased input before the input as given. The reported
    /// length is always that of the matched prefix of `input` itself, so it
    /// can be used to slice `input` even when case folding changed its size.
    pub fn match_text(&self, ignore_case: bool, input: &str) -> TextMatch {
        let lengths = match &self.lengths {
            Some(lengths) => lengths,
            None => return TextMatch::Unsupported,
        };
        if ignore_case {
            let upper = |text: &str| self.locale.to_upper(text);
            let lower = |text: &str| self.locale.to_lower(text);
            let folds: [&dyn Fn(&str) -> String; 2] = [&upper, &lower];
            for fold in folds {
                let folded = fold(input);
                let found = probe(
                    fitting(lengths, folded.len()),
                    &folded,
                    |prefix| self.insensitive.get(prefix).copied(),
                    |length| unfolded_length(input, length, fold),
                );
                if let Some(found) = found {
                    return found;
                }
            }
        }
        probe(
            fitting(lengths, input.len()),
            input,
            |prefix| self.exact.get_by_right(prefix).copied(),
            Some,
        )
        .unwrap_or(TextMatch::NoMatch)
    }
}

// the lengths no longer than the probed text
fn fitting(lengths: &[usize], available: usize) -> &[usize] {
    let end = match lengths.binary_search(&available) {
        Ok(found) => found + 1,
        Err(insertion) => insertion,
    };
    &lengths[..end]
}

// walks the candidate lengths from longest to shortest
fn probe<F, M>(lengths: &[usize], text: &str, lookup: F, measure: M) -> Option<TextMatch>
where
    F: Fn(&str) -> Option<i32>,
    M: Fn(usize) -> Option<usize>,
{
    lengths.iter().rev().find_map(|&length| {
        // prefixes that do not end on a char boundary cannot be stored text
        let prefix = text.get(..length)?;
        let value = lookup(prefix)?;
        let length = measure(length)?;
        Some(TextMatch::Matched { length, value })
    })
}

// the length of the prefix of `input` that folds into `folded_length` bytes,
// None when that falls inside the folding of a single char
fn unfolded_length(input: &str, folded_length: usize, fold: &dyn Fn(&str) -> String) -> Option<usize> {
    let mut folded = 0;
    let mut buffer = [0u8; 4];
    for (at, c) in input.char_indices() {
        if folded >= folded_length {
            return (folded == folded_length).then_some(at);
        }
        folded += fold(c.encode_utf8(&mut buffer)).len();
    }
    (folded == folded_length).then_some(input.len())
}
