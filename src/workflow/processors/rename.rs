use anyhow::{Context, Result};
use std::{fs, time::Instant};

use crate::common::JPG_EXTENSION;
use crate::utils::PathExt;
use crate::workflow::types::{FileTask, Outcome};

/// Give a JPEG-variant file its canonical `.jpg` extension.
///
/// An existing `.jpg` sibling is never overwritten. Failures are captured in
/// the returned outcome so the caller can move on to the next file.
pub fn rename_to_jpg(task: &FileTask) -> Outcome {
    rename_task(task).unwrap_or_else(|error| Outcome::failed(&task.path, error))
}

fn rename_task(task: &FileTask) -> Result<Outcome> {
    let target = task.target_path(JPG_EXTENSION);
    if target
        .is_taken()
        .with_context(|| format!("failed to check whether {:?} exists", target))?
    {
        return Ok(Outcome::target_exists(&task.path, target));
    }

    let start_time = Instant::now();
    // Siblings share a directory, so this is always a same-volume move.
    fs::rename(&task.path, &target)
        .with_context(|| format!("failed to rename {:?} to {:?}", task.path, target))?;

    Ok(Outcome::Done {
        source: task.path.clone(),
        target,
        elapsed: start_time.elapsed(),
    })
}
