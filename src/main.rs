mod batch;
mod export;
mod extract;
mod http;
mod input;
mod model;
mod pipeline;
mod pubchem;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use crate::pubchem::PubChemClient;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "pubchem_tox", about = "PubChem toxicology and GHS code fetcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch identifiers, names, references and toxicology sections per CAS number
    Tox {
        /// CAS numbers (prompted on stdin when omitted)
        cas: Vec<String>,
        /// JSON output path
        #[arg(long)]
        json: Option<PathBuf>,
        /// XLSX output path
        #[arg(long)]
        xlsx: Option<PathBuf>,
        /// Max compounds in flight
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
    /// Add GHS hazard/precaution codes to every row of a CSV with a CAS column
    Ghs {
        /// Input CSV
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rows per batch
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Seconds to sleep after each full batch
        #[arg(long)]
        pause: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Tox {
            cas,
            json,
            xlsx,
            concurrency,
        } => {
            if let Some(path) = json {
                settings.json_output = path;
            }
            if let Some(path) = xlsx {
                settings.xlsx_output = path;
            }
            if let Some(n) = concurrency {
                settings.concurrency = n;
            }
            settings.validate()?;

            let identifiers = if cas.is_empty() { prompt_identifiers()? } else { cas };
            if identifiers.is_empty() {
                bail!("No CAS numbers provided. Exiting.");
            }

            let client = Arc::new(PubChemClient::from_settings(&settings)?);
            println!("Fetching data for {} CAS numbers...", identifiers.len());
            let records = pipeline::tox::run(client, identifiers, settings.concurrency).await;

            export::json::save(&records, &settings.json_output)?;
            export::xlsx::save(&records, &settings.xlsx_output)?;

            let errors = records.iter().filter(|r| r.is_error()).count();
            println!(
                "Done: {} compounds ({} ok, {} errors).",
                records.len(),
                records.len() - errors,
                errors
            );
            println!("Data saved to {}", settings.json_output.display());
            println!("Excel file saved to {}", settings.xlsx_output.display());
            Ok(())
        }
        Commands::Ghs {
            input,
            output,
            batch_size,
            pause,
        } => {
            if let Some(path) = input {
                settings.csv_input = path;
            }
            if let Some(path) = output {
                settings.csv_output = path;
            }
            if let Some(n) = batch_size {
                settings.batch_size = n;
            }
            if let Some(secs) = pause {
                settings.pause_secs = secs;
            }
            settings.validate()?;

            let client = Arc::new(PubChemClient::from_settings(&settings)?);
            let summary = pipeline::hazards::run(
                client,
                &settings.csv_input,
                &settings.csv_output,
                settings.batch_size,
                settings.pause(),
            )
            .await?;
            println!(
                "Processed {} rows in {} batches ({} pauses).",
                summary.rows, summary.batches, summary.pauses
            );
            println!("Dataset written to {}", settings.csv_output.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn prompt_identifiers() -> anyhow::Result<Vec<String>> {
    println!("{}", input::PROMPT);
    io::stdout().flush()?;
    input::read_identifiers(io::stdin().lock()).context("Failed to read CAS numbers from stdin")
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
