//! Fieldrule – self-describing rules for calendar fields such as day-of-week
//! or hour-of-day.
//!
//! A [`rule::FieldRule`] knows:
//! * its identity, `Chronology.Name`, unique across the process;
//! * the [`unit::PeriodUnit`] it counts in and the one bounding it;
//! * its outer value range, and how that range narrows in a given context;
//! * how to derive its value from other fields and how to merge with them;
//! * the text of its values per locale and style.
//!
//! ## Modules
//! * [`rule`] – The rule itself plus the [`rule::FieldBehavior`] trait that
//!   concrete fields implement.
//! * [`text`] – Immutable value/text stores with longest-match parsing.
//! * [`cache`] – Per-rule, per-locale cache of text stores whose entries may be
//!   reclaimed and are rebuilt on demand.
//! * [`fraction`] – Conversion between values and decimal fractions of the range.
//! * [`calendrical`] and [`merge`] – The contracts rules expect from field
//!   containers and merge drivers, with simple implementations.
//! * [`registry`] – Process-wide registry enforcing unique rule ids.
//! * [`iso`] – The ISO-8601 rules.
//!
//! ## Quick Start
//! ```
//! use chrono::NaiveDate;
//! use fieldrule::{iso, locale::Locale, text::{TextMatch, TextStyle}};
//! let rule = iso::day_of_week();
//! let date = NaiveDate::from_ymd_opt(2009, 12, 26).unwrap();
//! assert_eq!(rule.value(&date).unwrap(), 6);
//! let en = Locale::new("en").unwrap();
//! assert_eq!(rule.text(6, &en, TextStyle::Full).unwrap(), "Saturday");
//! assert_eq!(
//!     rule.match_text(&en, TextStyle::Short, true, "tuesday").unwrap(),
//!     TextMatch::Matched { length: 3, value: 2 }
//! );
//! ```

pub mod cache;
pub mod calendrical;
pub mod error;
pub mod fraction;
pub mod iso;
pub mod locale;
pub mod merge;
pub mod registry;
pub mod rule;
pub mod settings;
pub mod text;
pub mod unit;

pub use error::{FieldRuleError, Result};
pub use rule::{FieldBehavior, FieldRule};
