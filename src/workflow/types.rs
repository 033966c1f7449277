use anyhow::Error;
use log::{error, info, warn};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::utils::PathExt;
use crate::workflow::processors::classify::classify;

// ────────────────────────────────────────────────────────────────
// FileKind / FileTask
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    JpegVariant,
    Webp,
    Ignore,
}

/// Everything one rule needs to know about one file, derived from its path alone.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub parent: PathBuf,
    pub extension: String,
    pub stem: OsString,
    pub kind: FileKind,
}

impl FileTask {
    /// Returns `None` for files no rule applies to.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = classify(&path);
        if kind == FileKind::Ignore {
            return None;
        }
        let parent = path.parent()?.to_path_buf();
        let extension = path.ext_str()?.to_owned();
        let stem = path.stem_os()?.to_os_string();
        Some(Self {
            path,
            parent,
            extension,
            stem,
            kind,
        })
    }

    /// Sibling of the source with the same base name and `ext` as its extension.
    pub fn target_path(&self, ext: &str) -> PathBuf {
        let mut file_name = self.stem.clone();
        file_name.push(".");
        file_name.push(ext);
        self.parent.join(file_name)
    }
}

// ────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The target already exists and is never overwritten.
    TargetExists { source: PathBuf, target: PathBuf },
}

#[derive(Debug)]
pub enum Outcome {
    Done {
        source: PathBuf,
        target: PathBuf,
        elapsed: Duration,
    },
    Skipped(SkipReason),
    Failed {
        source: PathBuf,
        error: Error,
    },
}

impl Outcome {
    pub fn failed(source: &Path, error: Error) -> Self {
        Outcome::Failed {
            source: source.to_path_buf(),
            error,
        }
    }

    pub fn target_exists(source: &Path, target: PathBuf) -> Self {
        Outcome::Skipped(SkipReason::TargetExists {
            source: source.to_path_buf(),
            target,
        })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

// ────────────────────────────────────────────────────────────────
// Reporting
// ────────────────────────────────────────────────────────────────

/// Result of running one rule on one file.
#[derive(Debug)]
pub struct FileReport {
    pub kind: FileKind,
    pub outcome: Outcome,
}

impl FileReport {
    /// Time spent on a successful rename or conversion.
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.outcome {
            Outcome::Done { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    /// Emit the single progress line for this file.
    pub fn log(&self) {
        match (&self.kind, &self.outcome) {
            (FileKind::JpegVariant, Outcome::Done { source, elapsed, .. }) => {
                info!(duration = &*format!("{:?}", elapsed); "JPG: Changed the extension of {:?} to .jpg.", source);
            }
            (FileKind::JpegVariant, Outcome::Skipped(SkipReason::TargetExists { source, target })) => {
                warn!(
                    "JPG: Cannot change extension of {:?} to .jpg. {:?} already exists and was not overwritten.",
                    source, target
                );
            }
            (FileKind::JpegVariant, Outcome::Failed { source, error }) => {
                error!("Error changing extension on {:?}: {:#}", source, error);
            }
            (FileKind::Webp, Outcome::Done { source, target, elapsed }) => {
                info!(duration = &*format!("{:?}", elapsed); "WEBP: Converted {:?} to {:?}.", source, target);
            }
            (FileKind::Webp, Outcome::Skipped(SkipReason::TargetExists { source, target })) => {
                warn!(
                    "WEBP: Can't convert {:?} to {:?}. A file already exists with that name.",
                    source, target
                );
            }
            (FileKind::Webp, Outcome::Failed { source, error }) => {
                error!("Error converting {:?}: {:#}", source, error);
            }
            (FileKind::Ignore, _) => (),
        }
    }
}

/// Totals for one pass over the tree, plus every per-file report in visit order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub ignored: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn renamed(&self) -> usize {
        self.count(FileKind::JpegVariant, Outcome::is_done)
    }

    pub fn converted(&self) -> usize {
        self.count(FileKind::Webp, Outcome::is_done)
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// Report for the file originally at `source`, if a rule ran on it.
    pub fn report_for(&self, source: &Path) -> Option<&FileReport> {
        self.reports.iter().find(|report| match &report.outcome {
            Outcome::Done { source: s, .. } | Outcome::Failed { source: s, .. } => s == source,
            Outcome::Skipped(SkipReason::TargetExists { source: s, .. }) => s == source,
        })
    }

    pub fn log(&self) {
        info!(
            "Done: {} renamed, {} converted, {} skipped, {} failed, {} ignored.",
            self.renamed(),
            self.converted(),
            self.skipped(),
            self.failed(),
            self.ignored
        );
    }

    fn count(&self, kind: FileKind, predicate: fn(&Outcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|r| r.kind == kind && predicate(&r.outcome))
            .count()
    }
}
