//! Prints the registered rules, then the text of the values of every rule
//! with text, and finally matches each command line argument against them.
//!
//! Usage: `fieldrule [--config <file>] [input ...]`

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fieldrule::registry;
use fieldrule::settings::Settings;
use fieldrule::text::TextMatch;
use fieldrule::Result;

fn main() -> ExitCode {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match args.iter().position(|arg| arg == "--config") {
        Some(at) if at + 1 < args.len() => {
            let path = args.remove(at + 1);
            args.remove(at);
            Some(path)
        }
        _ => None,
    };
    let settings = match Settings::load(config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&settings, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fieldrule failed");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, inputs: &[String]) -> Result<()> {
    let locale = settings.locale()?;
    let style = settings.default_style;
    let rules = registry::global().rules();
    info!(rules = rules.len(), %locale, ?style, "loaded rules");

    println!("------------- rules -------------");
    for rule in &rules {
        println!(
            "{:<20} {:>12} .. {:<12} unit: {:<10} range: {}",
            rule.id(),
            rule.minimum_value(),
            rule.maximum_value(),
            rule.period_unit().map(|u| u.name()).unwrap_or("-"),
            rule.period_range().map(|u| u.name()).unwrap_or("-"),
        );
    }

    println!("------------- text -------------");
    for rule in rules.iter().filter(|rule| rule.has_text()) {
        let Some(store) = rule.text_store(&locale, style)? else {
            println!("{}: no text for {locale}", rule.id());
            continue;
        };
        let texts: Vec<&str> = store.value_text_map().values().map(String::as_str).collect();
        let parseable = if store.is_parseable() { "" } else { " (not parseable)" };
        println!("{}: {}{parseable}", rule.id(), texts.join(", "));
    }

    if inputs.is_empty() {
        return Ok(());
    }
    println!("------------- matches -------------");
    for input in inputs {
        for rule in rules.iter().filter(|rule| rule.has_text()) {
            if let TextMatch::Matched { length, value } =
                rule.match_text(&locale, style, settings.ignore_case, input)?
            {
                let matched = input.get(..length).unwrap_or(input);
                println!("'{input}' -> {} = {value} (matched '{matched}')", rule.id());
            }
        }
    }
    Ok(())
}
