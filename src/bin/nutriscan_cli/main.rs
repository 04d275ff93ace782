// ABOUTME: Nutriscan CLI - scan foods and manage health conditions from the command line
// ABOUTME: Prints scan results and condition catalogs as JSON on stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Scan a food by name for two conditions
//! nutriscan-cli scan --name "greek yogurt" --condition Diabetes --condition Hypertension
//!
//! # Scan a barcode with a custom serving
//! nutriscan-cli scan --barcode 3017620422003 --serving "2 slices"
//!
//! # Scan a photo with a hint
//! nutriscan-cli scan --image lunch.jpg --context "office lunch"
//!
//! # Read a photographed nutrition facts panel
//! nutriscan-cli scan --image label.jpg --label --serving "1 container"
//!
//! # List conditions, or add one from a JSON file
//! nutriscan-cli conditions list
//! nutriscan-cli conditions add --file low_potassium.json
//!
//! # Persist learned foods in SQLite
//! nutriscan-cli --database sqlite:./data/foods.db scan --name dragonfruit
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};
use nutriscan::config::ScannerConfig;
use nutriscan::logging::LoggingConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nutriscan-cli",
    about = "Nutriscan food scanning CLI",
    long_about = "Resolve nutrition for a food name, barcode or photo and score it against health conditions."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// `SQLite` food store URL (defaults to `DATABASE_URL`, then a seeded in-memory store)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Scan a food
    Scan(ScanArgs),

    /// Health condition management
    Conditions {
        #[command(subcommand)]
        action: ConditionsCommand,
    },
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("reference")
        .required(true)
        .args(["name", "barcode", "image"])
))]
struct ScanArgs {
    /// Food name
    #[arg(long)]
    name: Option<String>,

    /// Product barcode
    #[arg(long)]
    barcode: Option<String>,

    /// Path to a food photo
    #[arg(long)]
    image: Option<PathBuf>,

    /// Hint for photo identification
    #[arg(long, requires = "image", conflicts_with_all = ["name", "barcode"])]
    context: Option<String>,

    /// The photo shows a nutrition facts label
    #[arg(long, requires = "image", conflicts_with_all = ["name", "barcode"])]
    label: bool,

    /// Health condition to evaluate (repeatable)
    #[arg(long = "condition")]
    conditions: Vec<String>,

    /// Serving size ("100g", "1 cup", "2 slices", ...)
    #[arg(long, default_value = "100g")]
    serving: String,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ConditionsCommand {
    /// List all conditions
    List,

    /// Add a condition from a JSON definition file
    Add {
        /// Path to the definition
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::for_cli();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ScannerConfig::from_env()?;
    if let Some(url) = cli.database {
        config.database.url = Some(url);
        config.validate()?;
    }

    match cli.command {
        Command::Scan(args) => commands::scan::run(&config, args).await,
        Command::Conditions { action } => match action {
            ConditionsCommand::List => commands::conditions::list(),
            ConditionsCommand::Add { file } => commands::conditions::add(&file).await,
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn scan_args(argv: &[&str]) -> ScanArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Scan(args) => args,
            Command::Conditions { .. } => panic!("expected scan"),
        }
    }

    #[test]
    fn test_scan_collects_repeated_conditions() {
        let args = scan_args(&[
            "nutriscan-cli",
            "scan",
            "--name",
            "greek yogurt",
            "--condition",
            "Diabetes",
            "--condition",
            "Hypertension",
        ]);
        assert_eq!(args.name.as_deref(), Some("greek yogurt"));
        assert_eq!(args.conditions, ["Diabetes", "Hypertension"]);
        assert_eq!(args.serving, "100g");
        assert!(!args.label);
    }

    #[test]
    fn test_scan_needs_exactly_one_reference() {
        assert!(Cli::try_parse_from(["nutriscan-cli", "scan"]).is_err());
        assert!(Cli::try_parse_from([
            "nutriscan-cli",
            "scan",
            "--name",
            "apple",
            "--barcode",
            "3017620422003",
        ])
        .is_err());
    }

    #[test]
    fn test_label_and_context_require_an_image() {
        assert!(Cli::try_parse_from(["nutriscan-cli", "scan", "--name", "apple", "--label"]).is_err());
        assert!(
            Cli::try_parse_from(["nutriscan-cli", "scan", "--name", "apple", "--context", "x"])
                .is_err()
        );

        let args = scan_args(&[
            "nutriscan-cli",
            "scan",
            "--image",
            "label.jpg",
            "--label",
            "--serving",
            "1 container",
        ]);
        assert!(args.label);
        assert_eq!(args.image, Some(PathBuf::from("label.jpg")));
        assert_eq!(args.serving, "1 container");
    }

    #[test]
    fn test_global_flags_and_conditions_add() {
        let cli = Cli::try_parse_from([
            "nutriscan-cli",
            "conditions",
            "add",
            "--file",
            "gout.json",
            "--database",
            "sqlite::memory:",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.database.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Command::Conditions {
                action: ConditionsCommand::Add { file },
            } => assert_eq!(file, PathBuf::from("gout.json")),
            _ => panic!("expected conditions add"),
        }
    }
}
