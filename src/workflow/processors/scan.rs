use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every non-directory entry below `root`, sorted by name within each
/// directory. Symlinks are listed as entries of their own and never followed;
/// a link that resolves to a directory is left out.
///
/// The whole list is materialised before any file is touched, so files a run
/// creates are not picked up again by the same run. Any unreadable directory
/// aborts the scan.
pub fn scan_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to enumerate directory tree under {:?}", root))?;
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}
