use std::fs;

use fieldrule::error::FieldRuleError;
use fieldrule::locale::Locale;
use fieldrule::settings::Settings;
use fieldrule::text::TextStyle;

#[test]
fn locale_tags() {
    let us = Locale::new("en_us").unwrap();
    assert_eq!(us.language(), "en");
    assert_eq!(us.region(), Some("US"));
    assert_eq!(us.to_string(), "en-US");
    assert_eq!(Locale::new("es-419").unwrap().region(), Some("419"));
    assert_eq!(Locale::new(" FR ").unwrap().to_string(), "fr");
    for invalid in ["", "e", "en-", "en-USA", "english language"] {
        assert!(
            matches!(Locale::new(invalid), Err(FieldRuleError::InvalidConfiguration(_))),
            "'{invalid}' should be rejected"
        );
    }
}

#[test]
fn locale_case_folding() {
    let turkish = Locale::new("tr-TR").unwrap();
    assert_eq!(turkish.to_upper("istanbul"), "İSTANBUL");
    assert_eq!(turkish.to_lower("ISPARTA"), "ısparta");
    let english = Locale::new("en").unwrap();
    assert_eq!(english.to_upper("istanbul"), "ISTANBUL");
    assert_eq!(english.to_lower("ISPARTA"), "isparta");
}

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.default_locale, "en");
    assert_eq!(settings.default_style, TextStyle::Full);
    assert!(settings.ignore_case);
    assert_eq!(settings.cache_capacity, 32);
    assert_eq!(settings.locale().unwrap().language(), "en");
}

#[test]
fn settings_from_file() {
    let path = std::env::temp_dir().join(format!("fieldrule-settings-{}.toml", std::process::id()));
    fs::write(
        &path,
        "default_locale = \"tr-TR\"\ndefault_style = \"short\"\nignore_case = false\ncache_capacity = 4\n",
    )
    .unwrap();
    let settings = Settings::load(path.to_str()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(settings.default_style, TextStyle::Short);
    assert!(!settings.ignore_case);
    assert_eq!(settings.cache_capacity, 4);
    assert_eq!(settings.log_filter, "info");
    let locale = settings.locale().unwrap();
    assert_eq!(locale.language(), "tr");
    assert_eq!(locale.region(), Some("TR"));
}

#[test]
fn text_rules_use_the_configured_capacity() {
    let settings = Settings {
        cache_capacity: 3,
        ..Settings::default()
    };
    let rule = settings.text_rule("Test", "Configured").values(0, 9).build().unwrap();
    assert!(rule.has_text());
    assert_eq!(rule.text_cache().unwrap().capacity(), 3);
}

#[test]
fn missing_settings_file() {
    let result = Settings::load(Some("/nonexistent/fieldrule-settings.toml"));
    assert!(matches!(result, Err(FieldRuleError::Config(_))));
}
