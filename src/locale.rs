//! Locales identify which text a text store holds and steer case folding.
//!
//! Only the language and an optional region are kept. Case folding follows the
//! Unicode default mapping except for the languages where the dotted and
//! dotless i form separate letters (Turkish and Azeri).

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FieldRuleError, Result};

lazy_static! {
    static ref LOCALE_TAG: Regex = Regex::new(r"^([A-Za-z]{2,8})(?:[-_]([A-Za-z]{2}|[0-9]{3}))?$")
        .expect("locale tag pattern compiles");
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parses a tag such as `en`, `en-US` or `tr_TR`.
    pub fn new(tag: &str) -> Result<Self> {
        let captures = LOCALE_TAG.captures(tag.trim()).ok_or_else(|| {
            FieldRuleError::InvalidConfiguration(format!("'{tag}' is not a valid locale tag"))
        })?;
        let language = captures
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let region = captures.get(2).map(|m| m.as_str().to_ascii_uppercase());
        Ok(Self { language, region })
    }
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
    fn dotted_i(&self) -> bool {
        matches!(self.language.as_str(), "tr" | "az")
    }
    pub fn to_upper(&self, text: &str) -> String {
        if self.dotted_i() {
            text.chars()
                .map(|c| match c {
                    'i' => "İ".to_string(),
                    'ı' => "I".to_string(),
                    _ => c.to_uppercase().collect(),
                })
                .collect()
        } else {
            text.to_uppercase()
        }
    }
    pub fn to_lower(&self, text: &str) -> String {
        if self.dotted_i() {
            text.chars()
                .map(|c| match c {
                    'I' => "ı".to_string(),
                    'İ' => "i".to_string(),
                    _ => c.to_lowercase().collect(),
                })
                .collect()
        } else {
            text.to_lowercase()
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => write!(f, "{}", self.language),
        }
    }
}
