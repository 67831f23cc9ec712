//! oas-bridge CLI
//!
//! Command-line interface for converting Swagger 2.0 descriptions into
//! OpenAPI 3.1.0.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use oas_bridge_converter::ConvertOptions;
use oas_bridge_transform::{Pipeline, PipelineEvent, PipelineReport};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "oas-bridge")]
#[command(version, about = "Convert Swagger 2.0 descriptions to OpenAPI 3.1.0", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    # Write content/oas/my-api/3.1.0.yml next to the input\n  \
    oas-bridge content/oas/my-api/swagger.yaml\n\n  \
    # Explicit output and configuration\n  \
    oas-bridge swagger.json openapi.yml --config convert.config.json\n\n\
CONFIGURATION:\n  \
    Without --config, <input-name>.config.json and then convert.config.json\n  \
    are looked up in the input's directory.")]
struct Cli {
    /// Swagger 2.0 YAML or JSON file
    input: Option<PathBuf>,

    /// Output YAML path (defaults to <input-dir>/<openapi-version>.yml)
    output: Option<PathBuf>,

    /// Conversion configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(input) = cli.input.clone() else {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::from(1);
    };

    match convert_command(input, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Fatal:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}

fn convert_command(input: PathBuf, cli: &Cli) -> Result<()> {
    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
        println!("  Input: {}", input.display());
        if let Some(output) = &cli.output {
            println!("  Output: {}", output.display());
        }
        if let Some(config) = &cli.config {
            println!("  Config: {}", config.display());
        }
        println!("  Converter options: {:?}", ConvertOptions::LENIENT);
    }

    let mut pipeline = Pipeline::new(&input);
    if let Some(output) = &cli.output {
        pipeline = pipeline.output(output);
    }
    if let Some(config) = &cli.config {
        pipeline = pipeline.config(config);
    }

    let report = pipeline
        .run_with_events(render_event)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if cli.verbose {
        print_summary(&report);
    }

    Ok(())
}

fn render_event(event: PipelineEvent) {
    match event {
        PipelineEvent::ConfigLoaded(path) => {
            println!("{} Config    {}", "→".cyan(), path.display())
        }
        PipelineEvent::ConfigMissing(path) => println!(
            "{} {}",
            "⚠".yellow(),
            format!("Config file {} not found, using defaults", path.display()).yellow()
        ),
        PipelineEvent::Reading(path) => println!("{} Reading   {}", "→".cyan(), path.display()),
        PipelineEvent::Substituting => {
            println!("{} Step 1/4  Applying text substitutions …", "→".cyan())
        }
        PipelineEvent::Detected(version) => println!(
            "{} Detected  Swagger/OpenAPI version: {}",
            "→".cyan(),
            version.yellow()
        ),
        PipelineEvent::Converting => {
            println!("{} Step 2/4  swagger2openapi → OAS 3.0.0 …", "→".cyan())
        }
        PipelineEvent::Upgrading => {
            println!("{} Step 3/4  Upgrading OAS 3.0.0 → 3.1.0 …", "→".cyan())
        }
        PipelineEvent::CleaningUp => {
            println!("{} Step 4/4  Applying post-conversion cleanup …", "→".cyan())
        }
        PipelineEvent::Warning(message) => println!("  {} {}", "⚠".yellow(), message.yellow()),
        PipelineEvent::Done(path) => println!("{} Done      {}", "✓".green(), path.display()),
    }
}

fn print_summary(report: &PipelineReport) {
    println!("\n{}", "Summary:".bold());
    println!("  Source version: {}", report.detected_version.yellow());
    println!("  Converter warnings: {}", report.warnings.len());

    let config = &report.config;
    println!("  Text replacements: {}", config.replacements().len());
    println!(
        "  Tag descriptions: {}",
        config.tag_descriptions.as_ref().map_or(0, |tags| tags.len())
    );
    println!(
        "  Tag groups: {}",
        config.tag_groups.as_ref().map_or(0, |groups| groups.len())
    );
    println!("  Output: {}", report.output.display().to_string().cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positionals_and_flags() {
        let cli = Cli::parse_from([
            "oas-bridge",
            "swagger.yaml",
            "out/api.yml",
            "--config",
            "cfg.json",
            "-v",
        ]);
        assert_eq!(cli.input, Some(PathBuf::from("swagger.yaml")));
        assert_eq!(cli.output, Some(PathBuf::from("out/api.yml")));
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_input_is_optional_at_parse_time() {
        let cli = Cli::parse_from(["oas-bridge"]);
        assert!(cli.input.is_none());
        assert!(cli.output.is_none());
    }
}
