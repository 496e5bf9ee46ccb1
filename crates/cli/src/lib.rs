pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pricebook_core::config::LoadOptions;

#[derive(Debug, Parser)]
#[command(
    name = "pricebook",
    about = "Pricebook pricing CLI",
    long_about = "Browse the catalog and rule table, validate configurations, and price quotes offline.",
    after_help = "Examples:\n  pricebook catalog --category database\n  pricebook validate --product compute-standard --option linux\n  pricebook quote --file request.json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a pricebook.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List catalog products, optionally filtered by category")]
    Catalog {
        #[arg(long, help = "Only list products in this category")]
        category: Option<String>,
    },
    #[command(about = "List pricing rules in evaluation order")]
    Rules {
        #[arg(long, help = "Only list rules in this category (e.g. volume, customer_tier)")]
        category: Option<String>,
    },
    #[command(about = "Validate an option selection for one product")]
    Validate {
        #[arg(long, help = "Product id to validate against")]
        product: String,
        #[arg(long = "option", help = "Selected option id (repeatable)")]
        options: Vec<String>,
    },
    #[command(about = "Generate a quote from a JSON quote request file")]
    Quote {
        #[arg(long, help = "Path to a JSON quote request")]
        file: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    let result = match cli.command {
        Command::Catalog { category } => commands::catalog::run(&options, category.as_deref()),
        Command::Rules { category } => commands::rules::run(&options, category.as_deref()),
        Command::Validate { product, options: selected } => {
            commands::validate::run(&options, &product, &selected)
        }
        Command::Quote { file } => commands::quote::run(&options, &file),
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
