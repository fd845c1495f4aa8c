use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use fieldrule::cache::{SoftRef, TextByStyle, TextStoreCache};
use fieldrule::error::FieldRuleError;
use fieldrule::iso;
use fieldrule::locale::Locale;
use fieldrule::text::{TextMatch, TextStyle};
use fieldrule::unit::{DAYS, WEEKS};
use fieldrule::{FieldBehavior, FieldRule};

struct Counted {
    populations: Arc<AtomicUsize>,
}
impl FieldBehavior for Counted {
    fn text(&self, _rule: &FieldRule, locale: &Locale) -> TextByStyle {
        self.populations.fetch_add(1, Ordering::SeqCst);
        let mut text = TextByStyle::new();
        text.insert(
            TextStyle::Full,
            BTreeMap::from([(0, format!("zero {locale}")), (1, format!("one {locale}"))]),
        );
        text
    }
}

struct Blank;
impl FieldBehavior for Blank {
    fn text(&self, _rule: &FieldRule, _locale: &Locale) -> TextByStyle {
        let mut text = TextByStyle::new();
        text.insert(TextStyle::Full, BTreeMap::from([(0, String::new())]));
        text
    }
}

fn setup(capacity: usize) -> (FieldRule, Arc<AtomicUsize>) {
    let populations = Arc::new(AtomicUsize::new(0));
    let rule = FieldRule::builder("Test", "Counted")
        .unit(*DAYS)
        .range(*WEEKS)
        .values(0, 1)
        .text_cache_capacity(capacity)
        .behavior(Counted {
            populations: Arc::clone(&populations),
        })
        .build()
        .unwrap();
    (rule, populations)
}

fn locale(tag: &str) -> Locale {
    Locale::new(tag).unwrap()
}

#[test]
fn stores_are_populated_once_per_locale() {
    let (rule, populations) = setup(8);
    let en = locale("en");
    assert_eq!(rule.text(1, &en, TextStyle::Full).unwrap(), "one en");
    assert_eq!(rule.text(0, &en, TextStyle::Full).unwrap(), "zero en");
    assert_eq!(populations.load(Ordering::SeqCst), 1);
    assert_eq!(rule.text(1, &locale("en-GB"), TextStyle::Full).unwrap(), "one en-GB");
    assert_eq!(populations.load(Ordering::SeqCst), 2);
}

#[test]
fn reclaimed_stores_are_rebuilt_identically() {
    let (rule, populations) = setup(8);
    let en = locale("en");
    let before = rule.text_store(&en, TextStyle::Full).unwrap().unwrap();
    let cache = rule.text_cache().unwrap();
    cache.reclaim(&en);
    assert_eq!(cache.resident(), 0);
    let after = rule.text_store(&en, TextStyle::Full).unwrap().unwrap();
    assert_eq!(populations.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.value_text_map(), after.value_text_map());
    assert_eq!(
        after.match_text(true, "ONE EN"),
        TextMatch::Matched { length: 6, value: 1 }
    );
}

#[test]
fn capacity_limits_resident_locales() {
    let (rule, populations) = setup(2);
    for tag in ["en", "fr", "de"] {
        rule.text(0, &locale(tag), TextStyle::Full).unwrap();
    }
    let cache = rule.text_cache().unwrap();
    assert_eq!(cache.capacity(), 2);
    assert_eq!(cache.resident(), 2);
    assert_eq!(populations.load(Ordering::SeqCst), 3);
    // the locale populated last is never the one reclaimed
    rule.text(0, &locale("de"), TextStyle::Full).unwrap();
    assert_eq!(populations.load(Ordering::SeqCst), 3);
    for tag in ["it", "es", "pt", "nl"] {
        rule.text(0, &locale(tag), TextStyle::Full).unwrap();
    }
    // holders reclaimed for capacity are dropped, not left behind
    assert_eq!(cache.resident(), 2);
    assert_eq!(cache.tracked(), 2);
    cache.reclaim_all();
    assert_eq!(cache.resident(), 0);
}

#[test]
fn missing_style_falls_back_to_decimal() {
    let (rule, _) = setup(8);
    let en = locale("en");
    assert!(rule.text_store(&en, TextStyle::Short).unwrap().is_none());
    assert_eq!(rule.text(1, &en, TextStyle::Short).unwrap(), "1");
    assert_eq!(rule.match_text(&en, TextStyle::Short, true, "one").unwrap(), TextMatch::Unsupported);
}

#[test]
fn rules_without_text_have_no_stores() {
    let rule = iso::day_of_month();
    let en = locale("en");
    assert!(!rule.has_text());
    assert!(rule.text_cache().is_none());
    assert!(rule.text_store(&en, TextStyle::Full).unwrap().is_none());
    assert_eq!(rule.text(15, &en, TextStyle::Full).unwrap(), "15");
    assert_eq!(rule.match_text(&en, TextStyle::Full, false, "15").unwrap(), TextMatch::Unsupported);
}

#[test]
fn iso_text_is_english_only() {
    let rule = iso::day_of_week();
    let en = locale("en-US");
    let fr = locale("fr");
    assert_eq!(rule.text(3, &en, TextStyle::Full).unwrap(), "Wednesday");
    assert_eq!(rule.text(3, &fr, TextStyle::Full).unwrap(), "3");
    assert_eq!(rule.match_text(&fr, TextStyle::Full, true, "mercredi").unwrap(), TextMatch::Unsupported);
    // narrow day names repeat, so they print but cannot be parsed
    assert_eq!(rule.text(2, &en, TextStyle::Narrow).unwrap(), "T");
    assert_eq!(rule.match_text(&en, TextStyle::Narrow, false, "T").unwrap(), TextMatch::Unsupported);
}

#[test]
fn invalid_text_fails_population() {
    let rule = FieldRule::builder("Test", "Blank")
        .values(0, 0)
        .with_text()
        .behavior(Blank)
        .build()
        .unwrap();
    let result = rule.text(0, &locale("en"), TextStyle::Full);
    assert!(matches!(result, Err(FieldRuleError::InvalidConfiguration(_))));
}

#[test]
fn concurrent_population_converges() {
    let (rule, populations) = setup(8);
    let en = locale("en");
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    assert_eq!(rule.text(1, &en, TextStyle::Full).unwrap(), "one en");
                    if let Some(cache) = rule.text_cache() {
                        cache.reclaim(&en);
                    }
                }
            });
        }
    });
    assert!(populations.load(Ordering::SeqCst) >= 1);
    assert_eq!(rule.text(0, &en, TextStyle::Full).unwrap(), "zero en");
}

#[test]
fn soft_references_can_be_reclaimed() {
    let holder = SoftRef::new(Arc::new(42));
    assert_eq!(holder.get().as_deref(), Some(&42));
    holder.reclaim();
    assert!(holder.is_reclaimed());
    assert_eq!(holder.get(), None);
    let cache = TextStoreCache::new(0);
    assert_eq!(cache.capacity(), 1);
}
