//! Filename classification for Single Take burst captures.
//!
//! A Single Take session leaves a bundle of stills and clips next to the
//! original recording. Two naming conventions are seen in the wild:
//!
//! - `img-prefixed`: `IMG_<anything>_<nn>.<ext>`
//! - `date-time`: `<yyyymmdd>_<hhmmss>_<nn>.<ext>`
//!
//! where `<ext>` is one of `jpg`, `jpeg` or `mp4`. Regardless of the
//! convention, a name ending in `_99.mp4` is the original full video and is
//! never matched.
//!
//! # Examples
//!
//! ```
//! use singletake_cleaner::pattern::{ClassificationRule, PatternVariant};
//!
//! let rule = ClassificationRule::new(PatternVariant::ImgPrefixed);
//! assert!(rule.matches("IMG_20240101_120000_01.jpg"));
//! assert!(!rule.matches("IMG_20240101_120000_99.mp4"));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Suffix carried by the original recording of a Single Take session.
pub const PRESERVED_SUFFIX: &str = "_99.mp4";

static IMG_PREFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^IMG_.*_[0-9]{2}\.(jpg|jpeg|mp4)$").expect("Invalid img-prefixed pattern")
});

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{8}_[0-9]{6}_[0-9]{2}\.(jpg|jpeg|mp4)$")
        .expect("Invalid date-time pattern")
});

/// The naming convention a scan looks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PatternVariant {
    /// `IMG_<anything>_<nn>.<ext>` (pattern A).
    #[default]
    #[serde(alias = "a")]
    #[value(alias = "a")]
    ImgPrefixed,
    /// `<yyyymmdd>_<hhmmss>_<nn>.<ext>` (pattern B).
    #[serde(alias = "b")]
    #[value(alias = "b")]
    DateTime,
}

impl PatternVariant {
    fn regex(self) -> &'static Regex {
        match self {
            PatternVariant::ImgPrefixed => &*IMG_PREFIXED,
            PatternVariant::DateTime => &*DATE_TIME,
        }
    }

    /// Returns the kebab-case name used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            PatternVariant::ImgPrefixed => "img-prefixed",
            PatternVariant::DateTime => "date-time",
        }
    }
}

impl fmt::Display for PatternVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides whether a filename belongs to a Single Take burst.
///
/// A name is matched iff it satisfies the active inclusion pattern and does
/// not end with [`PRESERVED_SUFFIX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    variant: PatternVariant,
}

impl ClassificationRule {
    pub fn new(variant: PatternVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> PatternVariant {
        self.variant
    }

    /// Returns true if `name` should be moved to the trash folder.
    pub fn matches(&self, name: &str) -> bool {
        self.variant.regex().is_match(name) && !Self::is_preserved(name)
    }

    /// Returns true if `name` marks an original recording that must be kept.
    pub fn is_preserved(name: &str) -> bool {
        name.ends_with(PRESERVED_SUFFIX)
    }
}

impl Default for ClassificationRule {
    fn default() -> Self {
        Self::new(PatternVariant::default())
    }
}
