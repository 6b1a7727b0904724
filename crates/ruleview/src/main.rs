//! Rule view inspection tool.
//!
//! Loads the matched rules of one element from a JSON fixture, resolves overridden
//! declarations and custom properties, and prints the resulting rule view as JSON.

use anyhow::{Context as _, Result, anyhow};
use css_orchestrator::{ElementStyle, ElementStyleReport, Fixture, RuleViewConfig};
use css_variables::registry_from;
use log::info;
use serde::Serialize;
use serde_json::{from_slice, to_string_pretty};
use std::env;
use std::fs::read;
use std::io::{Write as _, stderr, stdout};

/// Command line options.
#[derive(Debug, Default)]
struct Options {
    /// Path of the fixture file.
    fixture: String,
    /// Only report the custom properties of this pseudo-element.
    pseudo: Option<String>,
    /// Value text to preview with `var()` substituted.
    value: Option<String>,
}

/// What gets printed.
#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    report: ElementStyleReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
}

/// Print usage information to stderr.
fn print_usage() {
    drop(writeln!(
        stderr(),
        "Usage:\n  ruleview <FIXTURE.json> [--pseudo <NAME>] [--value <TEXT>]"
    ));
}

/// Parse the arguments following the program name.
///
/// # Errors
/// Returns an error if the fixture path is missing or an option lacks its value.
fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut fixture = None;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            flag @ ("--pseudo" | "--value") => {
                let value = args
                    .get(index + 1)
                    .cloned()
                    .ok_or_else(|| anyhow!("{flag} requires a value"))?;
                if flag == "--pseudo" {
                    options.pseudo = Some(value);
                } else {
                    options.value = Some(value);
                }
                index += 2;
            }
            path => {
                fixture = Some(path.to_owned());
                index += 1;
            }
        }
    }
    options.fixture = fixture.ok_or_else(|| anyhow!("missing fixture path"))?;
    Ok(options)
}

/// Build the rule view described by `options`.
///
/// # Errors
/// Returns an error if the fixture cannot be read or parsed, or is rejected.
fn run(options: &Options) -> Result<Output> {
    let data = read(&options.fixture)
        .with_context(|| format!("failed to read fixture {}", options.fixture))?;
    let fixture: Fixture = from_slice(&data)
        .with_context(|| format!("failed to parse fixture {}", options.fixture))?;

    let mut style = ElementStyle::new(RuleViewConfig::from_env());
    style.set_registered_properties(registry_from(fixture.registered_properties));
    let token = style.begin_populate();
    let refresh = style
        .populate(token, fixture.rules)
        .context("failed to build the rule view")?
        .ok_or_else(|| anyhow!("populate request was superseded"))?;
    info!(
        target: "rule_view",
        "{} rules, {} declarations refreshed",
        style.rules().len(),
        refresh.len()
    );

    let pseudo = options.pseudo.as_deref();
    let preview = options
        .value
        .as_deref()
        .map(|value| style.preview_value(value, pseudo.unwrap_or_default()));
    Ok(Output {
        report: style.report(pseudo),
        preview,
    })
}

/// Main entry point for the ruleview CLI tool.
///
/// # Errors
/// Returns an error if argument parsing or building the rule view fails.
fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(error) => {
            print_usage();
            return Err(error);
        }
    };
    let output = run(&options)?;
    writeln!(stdout(), "{}", to_string_pretty(&output)?)?;
    Ok(())
}
