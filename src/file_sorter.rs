/// Scanning a camera directory and relocating Single Take leftovers.
///
/// This module lists the immediate children of a source directory, classifies
/// each file name with a [`ClassificationRule`], and either reports the matches
/// (dry run) or renames them into a trash subfolder of the same directory.
/// Directory-level failures abort the scan; per-file failures are recorded in
/// the report and the batch carries on.
use crate::pattern::{ClassificationRule, PatternVariant};
use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Default name of the trash subfolder created inside the source directory.
pub const DEFAULT_TRASH_FOLDER: &str = "SingleTake_Trash";

/// A filesystem object observed while listing the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The file name, lossily converted to UTF-8. Used for matching and reporting.
    pub name: String,
    /// The file name exactly as the filesystem returned it.
    pub file_name: OsString,
    /// Whether the entry resolves to a directory.
    pub is_directory: bool,
    /// The path to the entry, as joined onto the source directory.
    pub path: PathBuf,
}

/// Conditions that abort a whole scan.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanError {
    /// The source directory is missing or is not a directory.
    #[error("directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The trash folder name is empty, absolute, or escapes the source directory.
    #[error("invalid trash folder name '{name}': must be a relative path inside the source directory")]
    InvalidTrashFolder { name: String },

    /// The trash directory could not be created.
    #[error("failed to create trash directory {}: {reason}", .path.display())]
    TrashDirectoryCreateFailed { path: PathBuf, reason: String },

    /// The source directory exists but could not be listed.
    #[error("failed to read directory {}: {reason}", .path.display())]
    ListingFailed { path: PathBuf, reason: String },
}

/// Whether a scan only reports or actually moves files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    DryRun,
    Move,
}

/// Result of one attempted relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved { name: String },
    Failed { name: String, reason: String },
}

impl MoveOutcome {
    /// The name of the file this outcome refers to.
    pub fn name(&self) -> &str {
        match self {
            MoveOutcome::Moved { name } | MoveOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Mode-specific body of a [`ScanReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReportDetails {
    /// Names that would be moved, in directory-listing order.
    DryRun { matched_names: Vec<String> },
    /// Counts and per-file outcomes of a real run.
    Move {
        moved_count: usize,
        failed_count: usize,
        outcomes: Vec<MoveOutcome>,
    },
    /// The scan stopped before examining any file for moving.
    Aborted { error: ScanError },
}

/// Aggregate result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub mode: ScanMode,
    pub pattern: PatternVariant,
    pub source_dir: PathBuf,
    pub trash_dir: PathBuf,
    pub matched_count: usize,
    pub scanned_at: DateTime<Utc>,
    pub details: ReportDetails,
}

impl ScanReport {
    /// Returns the fatal condition if the scan was aborted.
    pub fn error(&self) -> Option<&ScanError> {
        match &self.details {
            ReportDetails::Aborted { error } => Some(error),
            _ => None,
        }
    }

    /// Number of files moved; zero outside move mode.
    pub fn moved_count(&self) -> usize {
        match &self.details {
            ReportDetails::Move { moved_count, .. } => *moved_count,
            _ => 0,
        }
    }

    /// Number of files that failed to move; zero outside move mode.
    pub fn failed_count(&self) -> usize {
        match &self.details {
            ReportDetails::Move { failed_count, .. } => *failed_count,
            _ => 0,
        }
    }

    /// Returns true if the scan completed and no file failed to move.
    pub fn is_clean(&self) -> bool {
        self.error().is_none() && self.failed_count() == 0
    }
}

/// Receives progress while a move batch runs.
pub trait MoveObserver {
    /// Called once with the number of matched files before the first rename.
    fn batch_started(&mut self, _total: usize) {}

    /// Called after each rename attempt, in processing order.
    fn file_processed(&mut self, _outcome: &MoveOutcome) {}

    /// Called once after the last rename attempt.
    fn batch_finished(&mut self) {}
}

impl MoveObserver for () {}

/// Classifies and relocates burst-capture files in a single directory.
///
/// The sorter is stateless apart from the active classification rule; every
/// call to [`FileSorter::scan`] lists the directory afresh.
#[derive(Debug, Clone, Default)]
pub struct FileSorter {
    rule: ClassificationRule,
}

impl FileSorter {
    pub fn new(rule: ClassificationRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &ClassificationRule {
        &self.rule
    }

    /// Scans `source_dir` and either lists or moves the matching files.
    ///
    /// The trash directory `source_dir/trash_folder_name` is created if needed
    /// in both modes. Failures to validate the source directory, validate the
    /// trash folder name or create the trash directory abort the scan and are
    /// returned inside the report; nothing is raised to the caller.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use singletake_cleaner::file_sorter::{FileSorter, DEFAULT_TRASH_FOLDER};
    /// use singletake_cleaner::pattern::{ClassificationRule, PatternVariant};
    /// use std::path::Path;
    ///
    /// let sorter = FileSorter::new(ClassificationRule::new(PatternVariant::DateTime));
    /// let report = sorter.scan(Path::new("/storage/emulated/0/DCIM/Camera"), DEFAULT_TRASH_FOLDER, true);
    /// println!("{} files would be moved", report.matched_count);
    /// ```
    pub fn scan(&self, source_dir: &Path, trash_folder_name: &str, dry_run: bool) -> ScanReport {
        self.scan_with_observer(source_dir, trash_folder_name, dry_run, &mut ())
    }

    /// Same as [`FileSorter::scan`], reporting move progress to `observer`.
    pub fn scan_with_observer(
        &self,
        source_dir: &Path,
        trash_folder_name: &str,
        dry_run: bool,
        observer: &mut dyn MoveObserver,
    ) -> ScanReport {
        let mode = if dry_run {
            ScanMode::DryRun
        } else {
            ScanMode::Move
        };
        let trash_dir = source_dir.join(trash_folder_name);
        let report = |matched_count: usize, details: ReportDetails| ScanReport {
            mode,
            pattern: self.rule.variant(),
            source_dir: source_dir.to_path_buf(),
            trash_dir: trash_dir.clone(),
            matched_count,
            scanned_at: Utc::now(),
            details,
        };

        info!(
            "Scanning {} ({:?}, pattern {})",
            source_dir.display(),
            mode,
            self.rule.variant()
        );

        let matched = match self.prepare(source_dir, trash_folder_name, &trash_dir) {
            Ok(matched) => matched,
            Err(error) => {
                warn!("Scan aborted: {}", error);
                return report(0, ReportDetails::Aborted { error });
            }
        };

        let matched_count = matched.len();
        if dry_run {
            let matched_names = matched.into_iter().map(|entry| entry.name).collect();
            info!("Dry run found {} matching files", matched_count);
            return report(matched_count, ReportDetails::DryRun { matched_names });
        }

        let outcomes = Self::move_all(&matched, &trash_dir, observer);
        let moved_count = outcomes.iter().filter(|outcome| outcome.is_moved()).count();
        let failed_count = outcomes.len() - moved_count;
        info!(
            "Moved {} of {} files to {} ({} failed)",
            moved_count,
            matched_count,
            trash_dir.display(),
            failed_count
        );

        report(
            matched_count,
            ReportDetails::Move {
                moved_count,
                failed_count,
                outcomes,
            },
        )
    }

    /// Validates inputs, ensures the trash directory and returns the matched entries.
    fn prepare(
        &self,
        source_dir: &Path,
        trash_folder_name: &str,
        trash_dir: &Path,
    ) -> Result<Vec<Entry>, ScanError> {
        if !source_dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: source_dir.to_path_buf(),
            });
        }

        if !is_valid_trash_folder(trash_folder_name) {
            return Err(ScanError::InvalidTrashFolder {
                name: trash_folder_name.to_string(),
            });
        }

        ensure_dir(trash_dir).map_err(|e| ScanError::TrashDirectoryCreateFailed {
            path: trash_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let entries = list_entries(source_dir).map_err(|e| ScanError::ListingFailed {
            path: source_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(self.classify(entries))
    }

    /// Keeps the non-directory entries whose names satisfy the rule, in order.
    pub fn classify(&self, entries: Vec<Entry>) -> Vec<Entry> {
        entries
            .into_iter()
            .filter(|entry| {
                let keep = !entry.is_directory && self.rule.matches(&entry.name);
                if !keep {
                    trace!("Skipping {}", entry.name);
                }
                keep
            })
            .collect()
    }

    fn move_all(
        matched: &[Entry],
        trash_dir: &Path,
        observer: &mut dyn MoveObserver,
    ) -> Vec<MoveOutcome> {
        observer.batch_started(matched.len());

        let outcomes = matched
            .iter()
            .map(|entry| {
                let outcome = match move_into(entry, trash_dir) {
                    Ok(()) => {
                        debug!("Moved: {}", entry.name);
                        MoveOutcome::Moved {
                            name: entry.name.clone(),
                        }
                    }
                    Err(e) => {
                        warn!("Failed to move {}: {}", entry.name, e);
                        MoveOutcome::Failed {
                            name: entry.name.clone(),
                            reason: e.to_string(),
                        }
                    }
                };
                observer.file_processed(&outcome);
                outcome
            })
            .collect();

        observer.batch_finished();
        outcomes
    }
}

/// Lists the immediate children of `dir` in the order the filesystem returns them.
///
/// Entries that vanish or cannot be inspected mid-listing are skipped.
pub fn list_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let entries = fs::read_dir(dir)?
        .flatten()
        .map(|entry| {
            let path = entry.path();
            let file_name = entry.file_name();
            Entry {
                name: file_name.to_string_lossy().to_string(),
                file_name,
                is_directory: path.is_dir(),
                path,
            }
        })
        .collect();
    Ok(entries)
}

/// A trash folder must be a non-empty relative path that stays inside the source directory.
fn is_valid_trash_folder(name: &str) -> bool {
    let path = Path::new(name);
    !name.trim().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        && path
            .components()
            .any(|component| matches!(component, Component::Normal(_)))
}

/// Creates `dir` and any missing parents. An existing directory is fine.
fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Renames `entry` into `trash_dir` under its raw name.
///
/// An existing destination is never replaced.
fn move_into(entry: &Entry, trash_dir: &Path) -> io::Result<()> {
    let destination = trash_dir.join(&entry.file_name);
    if fs::symlink_metadata(&destination).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination already exists: {}", destination.display()),
        ));
    }
    fs::rename(&entry.path, &destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sorter(variant: PatternVariant) -> FileSorter {
        FileSorter::new(ClassificationRule::new(variant))
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"data").expect("Failed to write test file");
    }

    #[derive(Default)]
    struct Recorder {
        total: Option<usize>,
        seen: Vec<String>,
        finished: bool,
    }

    impl MoveObserver for Recorder {
        fn batch_started(&mut self, total: usize) {
            self.total = Some(total);
        }

        fn file_processed(&mut self, outcome: &MoveOutcome) {
            self.seen.push(outcome.name().to_string());
        }

        fn batch_finished(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn test_trash_folder_validation() {
        assert!(is_valid_trash_folder("SingleTake_Trash"));
        assert!(is_valid_trash_folder("trash/single_take"));
        assert!(is_valid_trash_folder("./trash"));

        assert!(!is_valid_trash_folder(""));
        assert!(!is_valid_trash_folder("   "));
        assert!(!is_valid_trash_folder("."));
        assert!(!is_valid_trash_folder("../trash"));
        assert!(!is_valid_trash_folder("trash/../../elsewhere"));
        assert!(!is_valid_trash_folder("/tmp/trash"));
    }

    #[test]
    fn test_classify_ignores_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        touch(base_path, "IMG_20240101_120000_01.jpg");
        fs::create_dir(base_path.join("IMG_20240101_120000_02.jpg"))
            .expect("Failed to create directory");

        let entries = list_entries(base_path).expect("Failed to list directory");
        let matched = sorter(PatternVariant::ImgPrefixed).classify(entries);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "IMG_20240101_120000_01.jpg");
        assert!(!matched[0].is_directory);
    }

    #[test]
    fn test_scan_creates_nested_trash_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let report =
            sorter(PatternVariant::ImgPrefixed).scan(base_path, "trash/single_take", true);

        assert!(report.error().is_none());
        assert!(base_path.join("trash").join("single_take").is_dir());
        assert_eq!(report.trash_dir, base_path.join("trash/single_take"));
    }

    #[test]
    fn test_scan_reports_create_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        // A regular file in the way makes directory creation impossible.
        touch(base_path, "SingleTake_Trash");
        touch(base_path, "IMG_20240101_120000_01.jpg");

        let report =
            sorter(PatternVariant::ImgPrefixed).scan(base_path, DEFAULT_TRASH_FOLDER, false);

        assert!(matches!(
            report.error(),
            Some(ScanError::TrashDirectoryCreateFailed { .. })
        ));
        assert_eq!(report.matched_count, 0);
        assert!(base_path.join("IMG_20240101_120000_01.jpg").exists());
    }

    #[test]
    fn test_invalid_trash_folder_aborts_without_mutation() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path().join("camera");
        fs::create_dir(&base_path).expect("Failed to create camera directory");
        touch(&base_path, "IMG_20240101_120000_01.jpg");

        let report = sorter(PatternVariant::ImgPrefixed).scan(&base_path, "../outside", false);

        assert_eq!(
            report.error(),
            Some(&ScanError::InvalidTrashFolder {
                name: "../outside".to_string()
            })
        );
        assert!(!temp_dir.path().join("outside").exists());
        assert!(base_path.join("IMG_20240101_120000_01.jpg").exists());
    }

    #[test]
    fn test_move_refuses_to_overwrite_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let trash = base_path.join(DEFAULT_TRASH_FOLDER);
        fs::create_dir(&trash).expect("Failed to create trash directory");

        fs::write(trash.join("IMG_20240101_120000_01.jpg"), b"older").unwrap();
        fs::write(base_path.join("IMG_20240101_120000_01.jpg"), b"newer").unwrap();

        let report =
            sorter(PatternVariant::ImgPrefixed).scan(base_path, DEFAULT_TRASH_FOLDER, false);

        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            fs::read(trash.join("IMG_20240101_120000_01.jpg")).unwrap(),
            b"older"
        );
        assert!(base_path.join("IMG_20240101_120000_01.jpg").exists());
    }

    #[test]
    fn test_observer_sees_every_outcome() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        touch(base_path, "20240101_120000_01.jpg");
        touch(base_path, "20240101_120000_02.mp4");
        touch(base_path, "20240101_120000_99.mp4");

        let mut recorder = Recorder::default();
        let report = sorter(PatternVariant::DateTime).scan_with_observer(
            base_path,
            DEFAULT_TRASH_FOLDER,
            false,
            &mut recorder,
        );

        assert_eq!(recorder.total, Some(2));
        assert!(recorder.finished);
        let mut seen = recorder.seen.clone();
        seen.sort();
        assert_eq!(seen, vec!["20240101_120000_01.jpg", "20240101_120000_02.mp4"]);
        assert_eq!(report.moved_count(), 2);
    }

    #[test]
    fn test_dry_run_does_not_notify_observer() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "20240101_120000_01.jpg");

        let mut recorder = Recorder::default();
        sorter(PatternVariant::DateTime).scan_with_observer(
            temp_dir.path(),
            DEFAULT_TRASH_FOLDER,
            true,
            &mut recorder,
        );

        assert_eq!(recorder.total, None);
        assert!(recorder.seen.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_move_keeps_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let raw_a = OsStr::from_bytes(b"IMG_\xff_01.jpg");
        let raw_b = OsStr::from_bytes(b"IMG_\xfe_01.jpg");
        fs::write(base_path.join(raw_a), b"a").expect("Failed to write test file");
        fs::write(base_path.join(raw_b), b"b").expect("Failed to write test file");

        let report =
            sorter(PatternVariant::ImgPrefixed).scan(base_path, DEFAULT_TRASH_FOLDER, false);

        // Both names decode to the same lossy string but must land separately.
        assert_eq!(report.moved_count(), 2);
        assert_eq!(report.failed_count(), 0);
        let trash = base_path.join(DEFAULT_TRASH_FOLDER);
        assert_eq!(fs::read(trash.join(raw_a)).unwrap(), b"a");
        assert_eq!(fs::read(trash.join(raw_b)).unwrap(), b"b");
        assert!(!base_path.join(raw_a).exists());
        assert!(!base_path.join(raw_b).exists());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "20240101_120000_02.mp4");

        let report =
            sorter(PatternVariant::DateTime).scan(temp_dir.path(), DEFAULT_TRASH_FOLDER, true);
        let json = serde_json::to_value(&report).expect("Failed to serialize report");

        assert_eq!(json["mode"], "dry_run");
        assert_eq!(json["pattern"], "date-time");
        assert_eq!(json["matched_count"], 1);
        assert_eq!(json["details"]["result"], "dry_run");
        assert_eq!(json["details"]["matched_names"][0], "20240101_120000_02.mp4");
    }
}
