//! One linear pass over the working tree: scan, classify, transform, report.

pub mod processors;
pub mod types;

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::config::FixerConfig;
use processors::{convert::convert_to_png, rename::rename_to_jpg, scan::scan_files};
use types::{FileKind, FileReport, FileTask, RunSummary};

/// Run both rules over every file below `config.root`.
///
/// Only a failed scan is returned as an error; per-file problems end up in
/// the summary and the run carries on.
pub fn run(config: &FixerConfig) -> Result<RunSummary> {
    let files = scan_files(&config.root)?;
    debug!("Found {} files under {:?}", files.len(), config.root);

    let mut summary = RunSummary::default();
    for path in files {
        match process_file(path) {
            Some(report) => {
                report.log();
                summary.record(report);
            }
            None => summary.ignored += 1,
        }
    }

    summary.log();
    Ok(summary)
}

/// Apply whichever rule matches `path`; `None` if no rule does.
pub fn process_file(path: PathBuf) -> Option<FileReport> {
    let task = FileTask::new(path)?;
    let outcome = match task.kind {
        FileKind::JpegVariant => rename_to_jpg(&task),
        FileKind::Webp => convert_to_png(&task),
        FileKind::Ignore => return None,
    };
    Some(FileReport {
        kind: task.kind,
        outcome,
    })
}
