//! singletake-cleaner - clear Single Take burst leftovers out of a camera folder
//!
//! This library classifies the files a Single Take capture session leaves in a
//! camera directory and moves them into a trash subfolder, or just lists them
//! in dry-run mode. Results come back as a structured [`ScanReport`].

pub mod cli;
pub mod config;
pub mod file_sorter;
pub mod output;
pub mod pattern;

pub use config::{ConfigError, SweepConfig};
pub use file_sorter::{
    DEFAULT_TRASH_FOLDER, FileSorter, MoveObserver, MoveOutcome, ReportDetails, ScanError,
    ScanMode, ScanReport,
};
pub use pattern::{ClassificationRule, PatternVariant};

pub use cli::{Cli, SweepCommand, run_cli};
