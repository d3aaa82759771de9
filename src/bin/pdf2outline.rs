//! CLI tool for batch PDF outline extraction
//!
//! Writes `<name>.json` into the output directory for every `.pdf` file in
//! the input directory. Files that fail are reported and skipped.

use clap::Parser;
use pdf_outline::batch::{collect_pdf_files, process_file};
use pdf_outline::{OutlineConfig, OutlineSource};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pdf2outline")]
#[command(version)]
#[command(about = "Extract title and heading outline from PDFs to JSON", long_about = None)]
struct Cli {
    /// Directory containing the PDF files
    #[arg(value_name = "INPUT_DIR", default_value = "input")]
    input: PathBuf,

    /// Directory for the JSON outlines (created if missing)
    #[arg(value_name = "OUTPUT_DIR", default_value = "output")]
    output: PathBuf,

    /// Number of documents processed in parallel (1 = sequential)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write compact JSON instead of indented
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = fs::create_dir_all(&cli.output) {
        eprintln!("Error: cannot create output directory '{}': {}", cli.output.display(), e);
        process::exit(1);
    }

    let files = match collect_pdf_files(&cli.input) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: cannot read input directory '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    if files.is_empty() {
        println!("No PDF files found in '{}'.", cli.input.display());
        return;
    }

    let config = OutlineConfig::default();
    let start = Instant::now();

    let succeeded = match cli.jobs {
        Some(1) => files
            .iter()
            .filter(|f| run_one(f, &cli.output, &config, !cli.compact))
            .count(),
        Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(|| run_parallel(&files, &cli.output, &config, !cli.compact)),
            Err(e) => {
                eprintln!("Error: cannot start worker pool: {}", e);
                process::exit(1);
            }
        },
        None => run_parallel(&files, &cli.output, &config, !cli.compact),
    };

    println!();
    println!(
        "Processed {} of {} files in {:.2} seconds.",
        succeeded,
        files.len(),
        start.elapsed().as_secs_f64()
    );
}

fn run_parallel(files: &[PathBuf], output: &Path, config: &OutlineConfig, pretty: bool) -> usize {
    files
        .par_iter()
        .filter(|f| run_one(f, output, config, pretty))
        .count()
}

/// Process one file and print its progress lines; returns whether it succeeded
fn run_one(input: &Path, output: &Path, config: &OutlineConfig, pretty: bool) -> bool {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    println!("Processing '{}'...", name);

    match process_file(input, output, config, pretty) {
        Ok(report) => {
            let source = match report.source {
                OutlineSource::NativeToc => "bookmarks",
                OutlineSource::Heuristic => "font styles",
            };
            log::info!(
                "'{}': {} pages, {} outline entries from {}",
                name,
                report.page_count,
                report.entries,
                source
            );
            println!(
                "Finished '{}' in {:.2} seconds. Output saved to '{}'.",
                name,
                report.elapsed.as_secs_f64(),
                report.output.display()
            );
            true
        }
        Err(e) => {
            log::error!("Failed to process {}: {}", input.display(), e);
            eprintln!("Error processing '{}': {}. Skipped.", name, e);
            false
        }
    }
}
