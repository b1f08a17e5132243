//! Sentinel CLI - command-line interface for Journal Sentinel
//!
//! Commands:
//! - scan: classify a single entry and flag it
//! - batch: process NDJSON journal entries (one per line)
//! - rescan: retroactively scan historical entries without duplicating flags
//! - export: write the deduplicated flag collection as CSV
//! - validate: check a keyword config file

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use journal_sentinel::{
    export_csv, AuthorProfile, JournalEntry, KeywordConfig, MemoryStore, ScanError,
    SentinelEngine, SentinelStore, ENGINE_VERSION,
};

/// Sentinel - risk flagging engine for student journal entries
#[derive(Parser)]
#[command(name = "sentinel")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Scan journal entries for concerning language", long_about = None)]
struct Cli {
    /// Keyword config file; the built-in dictionary is used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Flag/event store snapshot, loaded before and saved after the command
    #[arg(long, global = true, default_value = "sentinel-store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single entry and persist the resulting flag
    Scan {
        /// Entry text (use - to read from stdin)
        #[arg(long)]
        text: String,

        /// Subject identifier
        #[arg(long)]
        student_id: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        surname: String,

        /// Class label, e.g. "10B"
        #[arg(long, default_value = "")]
        class: String,

        #[arg(long, default_value = "")]
        house: String,

        /// Withhold the author's display name from the flag
        #[arg(long)]
        anonymous: bool,
    },

    /// Process journal entries from NDJSON input (one entry per line)
    Batch {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Retroactively scan historical entries from NDJSON input
    Rescan {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Export the deduplicated flag collection as CSV
    Export {
        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Validate a keyword config file
    Validate {
        /// Config file to check
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScanError> {
    // Validate parses strictly and must not fall back to an empty dictionary
    if let Commands::Validate { file } = &cli.command {
        return cmd_validate(file);
    }

    let config = match &cli.config {
        Some(path) => KeywordConfig::load_or_empty(path),
        None => KeywordConfig::builtin(),
    };
    let store = MemoryStore::load(&cli.store)?;
    let engine = SentinelEngine::new(config, store);

    match cli.command {
        Commands::Scan {
            text,
            student_id,
            first_name,
            surname,
            class,
            house,
            anonymous,
        } => {
            let text = if text == "-" { read_stdin()? } else { text };
            let author = AuthorProfile {
                id: student_id,
                first_name,
                surname,
                class_label: class,
                house,
            };
            let flag = engine.classify_and_flag(&text, &author, anonymous, None, None)?;
            match &flag {
                Some(flag) => {
                    println!("{}", serde_json::to_string_pretty(flag)?);
                    if let Some(event) =
                        engine.detect_patterns(&flag.student_id, flag.severity)?
                    {
                        println!("{}", serde_json::to_string_pretty(&event)?);
                    }
                }
                None => println!("null"),
            }
        }

        Commands::Batch { input } => {
            let entries = read_entries(&input)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for entry in &entries {
                let (flag, event) = engine.process(entry)?;
                if let Some(flag) = flag {
                    writeln!(out, "{}", serde_json::to_string(&flag)?)?;
                }
                if let Some(event) = event {
                    writeln!(out, "{}", serde_json::to_string(&event)?)?;
                }
            }
        }

        Commands::Rescan { input } => {
            let entries = read_entries(&input)?;
            let summary = engine.rescan(&entries)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Export { output } => {
            let flags = engine.store().all_flags().map_err(ScanError::Store)?;
            let csv = export_csv(&flags)?;
            if output.to_string_lossy() == "-" {
                print!("{csv}");
            } else {
                fs::write(&output, csv)?;
            }
        }

        Commands::Validate { .. } => unreachable!("handled above"),
    }

    engine.store().save(&cli.store).map_err(ScanError::Store)?;
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), ScanError> {
    let config = KeywordConfig::load(file)?;
    println!(
        "ok: {} phrases ({} red, {} amber, {} yellow), {} ignore contexts, {} self-reference triggers",
        config.phrase_count(),
        config.phrases(journal_sentinel::Severity::Red).count(),
        config.phrases(journal_sentinel::Severity::Amber).count(),
        config.phrases(journal_sentinel::Severity::Yellow).count(),
        config.context_rules.ignore_contexts.len(),
        config.context_rules.self_reference_required.len(),
    );
    Ok(())
}

fn read_stdin() -> Result<String, ScanError> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Read NDJSON journal entries, skipping blank lines
fn read_entries(input: &Path) -> Result<Vec<JournalEntry>, ScanError> {
    let data = if input.to_string_lossy() == "-" {
        read_stdin()?
    } else {
        fs::read_to_string(input)?
    };
    data.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ScanError::Json))
        .collect()
}
