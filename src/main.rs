//! cwrgen CLI - Generate CWR files from musical work definitions
//!
//! # Main Commands
//!
//! ```bash
//! cwrgen export works.json -o catalog.cwr   # Render works to a CWR file
//! cwrgen check works.json                   # Run the rule chain only
//! ```
//!
//! The input file is a JSON array of work definitions (camelCase keys, see
//! the library's `WorkDefinition`).

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cwrgen::{CwrExportBuilder, CwrVersion, Validator, WorkDefinition};

#[derive(Parser)]
#[command(name = "cwrgen")]
#[command(about = "Generate CWR files from musical work definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render works to a CWR file
    Export {
        /// Input JSON file (array of work definitions)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sender type: PB, AA, WR or SO
        #[arg(long, default_value = "PB")]
        sender_type: String,

        /// Sender id (9+ digits, or a 3-5 character society code for SO)
        #[arg(long)]
        sender_id: String,

        /// Sender name (max 45 characters)
        #[arg(long)]
        sender_name: String,

        /// Character set: ASCII, UTF-8 or ISO-8859-1
        #[arg(long, default_value = "ASCII")]
        character_set: String,

        /// Format revision (1-3 digits)
        #[arg(long, default_value = "1")]
        revision: String,

        /// Transaction type: NWR, REV, DEL or REC
        #[arg(long, default_value = "NWR")]
        transaction_type: String,

        /// Format version: 2.1 or 2.2
        #[arg(long, default_value = "2.2")]
        format_version: String,

        /// Group id (1-99999)
        #[arg(long, default_value = "1")]
        group_id: u32,

        /// Skip invalid works instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Run the business-rule chain without writing anything
    Check {
        /// Input JSON file (array of work definitions)
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export {
            input,
            output,
            sender_type,
            sender_id,
            sender_name,
            character_set,
            revision,
            transaction_type,
            format_version,
            group_id,
            skip_invalid,
        } => cmd_export(
            &input,
            output.as_deref(),
            &sender_type,
            &sender_id,
            &sender_name,
            &character_set,
            &revision,
            &transaction_type,
            &format_version,
            group_id,
            skip_invalid,
        ),
        Commands::Check { input } => cmd_check(&input),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_works(path: &std::path::Path) -> Result<Vec<WorkDefinition>, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid works JSON: {e}"))
}

#[allow(clippy::too_many_arguments)]
fn cmd_export(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    sender_type: &str,
    sender_id: &str,
    sender_name: &str,
    character_set: &str,
    revision: &str,
    transaction_type: &str,
    format_version: &str,
    group_id: u32,
    skip_invalid: bool,
) -> Result<ExitCode, String> {
    let works = load_works(input)?;
    let version = CwrVersion::from_code(format_version)
        .ok_or_else(|| format!("unknown format version {format_version:?} (expected 2.1 or 2.2)"))?;

    let mut builder = CwrExportBuilder::new()
        .sender(sender_type, sender_id, sender_name)
        .character_set(character_set)
        .revision(revision)
        .software(env!("CARGO_PKG_NAME").to_uppercase(), env!("CARGO_PKG_VERSION"))
        .transaction_type(transaction_type)
        .version(version)
        .group_id(group_id)
        .works(works);
    if skip_invalid {
        builder = builder.skip_invalid_works();
    }

    let summary = match output {
        Some(path) => builder
            .export_to_file(path)
            .map_err(|e| e.to_string())?,
        None => {
            let (text, summary) = builder.export_to_string().map_err(|e| e.to_string())?;
            print!("{text}");
            summary
        }
    };

    eprintln!(
        "exported {} transaction(s), {} record(s) total",
        summary.transaction_count, summary.record_count
    );
    for skip in &summary.skipped {
        eprintln!(
            "skipped work {} ({}): {}",
            skip.index + 1,
            skip.submitter_work_number,
            skip.reason
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(input: &std::path::Path) -> Result<ExitCode, String> {
    let works = load_works(input)?;
    let validator = Validator::default();

    let mut failures = 0usize;
    for (i, work) in works.iter().enumerate() {
        if let Err(violation) = validator.validate(work) {
            failures += 1;
            eprintln!("work {} ({}): {violation}", i + 1, work.submitter_work_number);
        }
    }

    if failures == 0 {
        eprintln!("all {} work(s) valid", works.len());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{failures} of {} work(s) rejected", works.len());
        Ok(ExitCode::FAILURE)
    }
}
