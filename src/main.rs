//! This program prepares the News Category dataset for classifier training.
//!
//! The dataset is a newline-delimited JSON file where each line describes a
//! news article, including the category it was filed under. We tabulate how
//! many articles each category has, then export the articles of a few
//! categories as a training set, and those of another category as unseen data.

mod config;
mod dataset;
mod export;
mod progress;
mod stats;

use crate::{config::Config, progress::ProgressReport, stats::CategoryCounts};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Split the News Category dataset into training and unseen-category CSV files
///
/// The dataset is read from News_Category_Dataset_v2.json. Articles from the
/// TECH, SCIENCE, CRIME and SPORTS categories are written to train_data.csv,
/// and RELIGION articles are written to new_data.csv. Existing output files
/// are overwritten.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Directory which contains the dataset and receives the output files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        let args = Args::parse();
        anyhow::ensure!(
            args.data_dir.is_dir(),
            "data directory {} does not exist",
            args.data_dir.display()
        );
        Ok(args)
    }
}
//
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Set up logging, but don't make it a prerequisite
    if let Err(e) = setup_logging() {
        eprintln!("Logging is disabled: {e}");
    }

    // Decode CLI arguments
    let args = Args::parse_and_check()?;
    let config = Config::new(args);

    // Do the work, showing results on stdout
    let mut stdout = BufWriter::new(tokio::io::stdout());
    run(&config, &ProgressReport::new(), &mut stdout).await
}

/// Load the dataset, display its category statistics and export the splits
async fn run(
    config: &Config,
    report: &ProgressReport,
    console: &mut (impl AsyncWrite + Unpin),
) -> Result<()> {
    // Load the dataset
    let dataset = dataset::load(&config.input, report).await?;

    // Display category statistics and the training categories
    let counts = CategoryCounts::tabulate(&dataset)?;
    log::info!(
        "Dataset has {} categories across {} records",
        counts.num_categories(),
        counts.total()
    );
    console.write_all(format!("{counts}\n\n").as_bytes()).await?;
    console
        .write_all(format!("Training categories: {:?}\n", config.train.listed).as_bytes())
        .await?;
    console.flush().await?;

    // Export the splits
    for split in config.splits() {
        let written = export::export(&dataset, split, report).await?;
        debug_assert_eq!(
            written,
            split.labels.iter().map(|label| counts.get(label)).sum::<usize>(),
            "every record of the split's categories should have been exported"
        );
    }
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
