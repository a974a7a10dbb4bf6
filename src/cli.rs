//! Command-line interface module for singletake-cleaner.
//!
//! This module handles:
//! - Argument parsing
//! - Merging flags with the configuration file
//! - Running the scan and rendering its report

use crate::config::SweepConfig;
use crate::file_sorter::{FileSorter, ScanReport};
use crate::output::{OutputFormatter, ProgressObserver};
use crate::pattern::{ClassificationRule, PatternVariant};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Move Single Take burst-capture leftovers into a trash subfolder.
#[derive(Parser, Debug, Clone)]
#[command(name = "singletake-cleaner", version, about, long_about = None)]
pub struct Cli {
    /// Camera directory to scan [default: /storage/emulated/0/DCIM/Camera]
    pub source_dir: Option<PathBuf>,

    /// Trash subfolder, relative to the source directory [default: SingleTake_Trash]
    #[arg(long, short = 't', value_name = "NAME")]
    pub trash_folder: Option<String>,

    /// Naming convention to match [default: img-prefixed]
    #[arg(long, short = 'p', value_enum)]
    pub pattern: Option<PatternVariant>,

    /// Only list the files that would be moved
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Configuration file to load instead of the default locations
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// A fully resolved invocation: CLI flags layered over configuration over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepCommand {
    pub source_dir: PathBuf,
    pub trash_folder: String,
    pub pattern: PatternVariant,
    pub dry_run: bool,
}

impl SweepCommand {
    /// Resolves `cli` against `config`.
    pub fn resolve(cli: &Cli, config: &SweepConfig) -> Self {
        Self {
            source_dir: cli
                .source_dir
                .clone()
                .unwrap_or_else(|| config.source_dir()),
            trash_folder: cli
                .trash_folder
                .clone()
                .unwrap_or_else(|| config.trash_folder().to_string()),
            pattern: cli.pattern.unwrap_or_else(|| config.pattern()),
            dry_run: cli.dry_run,
        }
    }

    /// Runs the scan without rendering anything.
    pub fn execute(&self) -> ScanReport {
        self.sorter()
            .scan(&self.source_dir, &self.trash_folder, self.dry_run)
    }

    fn sorter(&self) -> FileSorter {
        FileSorter::new(ClassificationRule::new(self.pattern))
    }
}

/// Runs the CLI application: loads configuration, scans, renders the report.
///
/// Returns the report so the caller can choose an exit status. Configuration
/// problems and JSON rendering failures are returned as errors.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use singletake_cleaner::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["singletake-cleaner", "/sdcard/DCIM/Camera", "--dry-run"]);
/// match run_cli(&cli) {
///     Ok(report) => println!("{} matches", report.matched_count),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<ScanReport, String> {
    let config = SweepConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let command = SweepCommand::resolve(cli, &config);

    if cli.json {
        let report = command.execute();
        let json = OutputFormatter::report_json(&report)
            .map_err(|e| format!("Error rendering report: {}", e))?;
        println!("{}", json);
        return Ok(report);
    }

    announce(&command.source_dir, command.pattern, command.dry_run);

    let report = if command.dry_run {
        command.execute()
    } else {
        let mut progress = ProgressObserver::new();
        command.sorter().scan_with_observer(
            &command.source_dir,
            &command.trash_folder,
            false,
            &mut progress,
        )
    };

    OutputFormatter::render_report(&report);
    Ok(report)
}

fn announce(source_dir: &Path, pattern: PatternVariant, dry_run: bool) {
    let action = if dry_run { "Simulating scan of" } else { "Cleaning" };
    OutputFormatter::info(&format!(
        "{} {} (pattern: {})",
        action,
        source_dir.display(),
        pattern
    ));
}
