//! ARXML command line tool
//!
//! Parses and validates ARXML files using the `arxml-rs` engine.

use arxml_rs::{Severity, load_arxml_from_file, validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arxml")]
#[command(about = "Parse and validate AUTOSAR ARXML files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validation rules over a file
    Validate {
        /// The ARXML file to validate
        file: PathBuf,
    },

    /// Parse a file and report what was extracted
    Parse {
        /// The ARXML file to parse
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Runs one command. `Ok(false)` means the command completed but the file
/// failed validation.
fn run(cli: Cli) -> Result<bool, arxml_rs::ArxmlError> {
    match cli.command {
        Commands::Validate { file } => {
            let output = load_arxml_from_file(&file)?;
            println!("Detected version: {}", output.document.version());

            let issues = validate(&output.document);
            for issue in &issues {
                println!("[{}] {}", issue.severity, issue.message);
            }
            let errors = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count();
            if errors > 0 {
                println!("{} error(s) found", errors);
                return Ok(false);
            }
            println!("No errors found");
            Ok(true)
        }
        Commands::Parse { file } => {
            let output = load_arxml_from_file(&file)?;
            let doc = &output.document;

            println!("Detected version: {}", doc.version());
            println!("Components:      {}", doc.components().len());
            println!("Port interfaces: {}", doc.port_interfaces().len());
            println!("Compositions:    {}", doc.compositions().len());
            println!("Config nodes:    {}", doc.config_node_count());
            println!("Fragments:       {}", doc.fragments().len());
            for warning in &output.warnings {
                println!("[WARNING] {}", warning);
            }
            Ok(true)
        }
    }
}
