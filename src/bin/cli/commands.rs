//! Command execution for the literalist CLI.

use anyhow::{bail, Context};
use owo_colors::OwoColorize;
use std::io::Read;

use crate::cli::args::{Cli, Commands};
use crate::cli::config_layer::build_layered_config;
use crate::cli::output::{print_outcome, print_summary, print_validation_errors};
use literalist::{validate_report_value, ExtractionConfig, LiteralistEngine, RefactorMode, Report};

/// Dispatch the parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_layered_config(&cli.options)?;
    let mode = if cli.apply {
        RefactorMode::Apply
    } else {
        RefactorMode::Preview
    };

    match cli.command {
        None => direct_command(config, mode),
        Some(Commands::Report) => report_command(config),
        Some(Commands::Validate) => validate_command(&config),
        Some(Commands::Refactor) => refactor_command(config, mode),
    }
}

/// Analyze, then preview or apply in one pass.
pub fn direct_command(config: ExtractionConfig, mode: RefactorMode) -> anyhow::Result<()> {
    let store_label = config.constants_file.clone();
    let mut engine = LiteralistEngine::new(config)?;
    let (report, summary) = engine.analyze_with_summary()?;
    print_summary(&summary);

    eprintln!("{}", "Analysis complete. Starting refactor...".bright_blue());
    let outcome = engine.refactor(&report, mode)?;
    print_outcome(&outcome, mode, &store_label)?;
    Ok(())
}

/// Analyze and print the JSON report on stdout.
pub fn report_command(config: ExtractionConfig) -> anyhow::Result<()> {
    let mut engine = LiteralistEngine::new(config)?;
    let report = engine.analyze()?;
    println!("{}", report.to_json_pretty()?);
    Ok(())
}

/// Check the configured report file against the report schema.
pub fn validate_command(config: &ExtractionConfig) -> anyhow::Result<()> {
    let path = &config.report_file;
    if !path.exists() {
        bail!("Report file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let Ok(document) = serde_json::from_str::<serde_json::Value>(&content) else {
        bail!("Invalid JSON syntax.");
    };

    let errors = validate_report_value(&document);
    if !errors.is_empty() {
        print_validation_errors(&errors);
        bail!("Report validation failed");
    }

    let count = document.as_object().map_or(0, serde_json::Map::len);
    eprintln!(
        "{}",
        format!("Valid Report. Contains {count} constants.").green()
    );
    Ok(())
}

/// Read a report from stdin and preview or apply it.
pub fn refactor_command(config: ExtractionConfig, mode: RefactorMode) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read report from stdin")?;
    if input.trim().is_empty() {
        bail!("No input provided on stdin.");
    }
    let Ok(document) = serde_json::from_str::<serde_json::Value>(&input) else {
        bail!("Invalid JSON on stdin.");
    };
    let report = Report::from_json_value(document).context("Refactor error")?;

    let store_label = config.constants_file.clone();
    let mut engine = LiteralistEngine::new(config)?;
    let outcome = engine.refactor(&report, mode)?;
    print_outcome(&outcome, mode, &store_label)?;
    Ok(())
}
