//! Output formatting and styling module.
//!
//! Renders [`ScanReport`]s for the terminal (colored text or JSON) and drives
//! the progress bar shown while files are being moved. The scanning code never
//! prints anything itself; everything user-facing goes through here.

use crate::file_sorter::{MoveObserver, MoveOutcome, ReportDetails, ScanError, ScanReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use singletake_cleaner::output::OutputFormatter;
    /// OutputFormatter::success("Moved IMG_20240101_120000_01.jpg");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for a move batch of `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a human-readable rendering of `report`.
    ///
    /// Aborted scans go to stderr; dry runs list every matched name; move runs
    /// list failures and finish with the counts and the trash location.
    pub fn render_report(report: &ScanReport) {
        match &report.details {
            ReportDetails::Aborted { error } => Self::render_abort(error),
            ReportDetails::DryRun { matched_names } => {
                Self::dry_run_notice(&format!(
                    "Found {} {} to move in {}",
                    matched_names.len(),
                    plural(matched_names.len()),
                    report.source_dir.display()
                ));
                if matched_names.is_empty() {
                    Self::plain("No matching files found.");
                    return;
                }
                for name in matched_names {
                    Self::plain(&format!("  {}", name));
                }
                Self::plain(&format!(
                    "\nRun again without --dry-run to move them to {}",
                    report.trash_dir.display()
                ));
            }
            ReportDetails::Move {
                moved_count,
                failed_count,
                outcomes,
            } => {
                let failures: Vec<_> = outcomes
                    .iter()
                    .filter_map(|outcome| match outcome {
                        MoveOutcome::Failed { name, reason } => Some((name, reason)),
                        MoveOutcome::Moved { .. } => None,
                    })
                    .collect();
                for (name, reason) in &failures {
                    Self::error(&format!("{}: {}", name, reason));
                }

                Self::header("SUMMARY");
                Self::plain(&format!(
                    "Matched: {} {}",
                    report.matched_count,
                    plural(report.matched_count)
                ));
                Self::success(&format!("Moved:   {}", moved_count.to_string().green()));
                if *failed_count > 0 {
                    Self::warning(&format!("Failed:  {}", failed_count.to_string().red()));
                } else {
                    Self::plain(&format!("  Failed:  {}", failed_count));
                }
                Self::info(&format!("Files moved to {}", report.trash_dir.display()));
            }
        }
    }

    fn render_abort(error: &ScanError) {
        match error {
            ScanError::DirectoryNotFound { path } => Self::error(&format!(
                "Camera folder not found: {} (pass the directory to scan as an argument)",
                path.display()
            )),
            other => Self::error(&other.to_string()),
        }
    }

    /// Renders `report` as pretty-printed JSON.
    pub fn report_json(report: &ScanReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Feeds move progress into an indicatif progress bar.
#[derive(Default)]
pub struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MoveObserver for ProgressObserver {
    fn batch_started(&mut self, total: usize) {
        if total > 0 {
            self.bar = Some(OutputFormatter::create_progress_bar(total as u64));
        }
    }

    fn file_processed(&mut self, outcome: &MoveOutcome) {
        if let Some(bar) = &self.bar {
            bar.set_message(outcome.name().to_string());
            bar.inc(1);
        }
    }

    fn batch_finished(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
