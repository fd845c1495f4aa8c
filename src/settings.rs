// config lets you read a separate config file, layered under the environment
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::Result;
use crate::locale::Locale;
use crate::rule::{FieldRule, FieldRuleBuilder};
use crate::text::TextStyle;

pub const DEFAULT_SETTINGS_FILE: &str = "fieldrule";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub default_locale: String,
    pub default_style: TextStyle,
    pub ignore_case: bool,
    pub log_filter: String,
    pub cache_capacity: usize,
}

impl Settings {
    /// Reads `fieldrule.toml` (or the given file) if present, then any
    /// `FIELDRULE_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = Config::builder()
            .set_default("default_locale", "en")?
            .set_default("default_style", "full")?
            .set_default("ignore_case", true)?
            .set_default("log_filter", "info")?
            .set_default("cache_capacity", DEFAULT_CACHE_CAPACITY as u64)?
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_FILE)).required(path.is_some()))
            .add_source(Environment::with_prefix("FIELDRULE"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
    pub fn locale(&self) -> Result<Locale> {
        Locale::new(&self.default_locale)
    }
    /// Starts a rule with text, cached for at most `cache_capacity` locales.
    pub fn text_rule(&self, chronology: &str, name: &str) -> FieldRuleBuilder {
        FieldRule::builder(chronology, name).text_cache_capacity(self.cache_capacity)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            default_style: TextStyle::Full,
            ignore_case: true,
            log_filter: "info".to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
