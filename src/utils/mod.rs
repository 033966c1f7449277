use std::{
    ffi::OsStr,
    io::{self, ErrorKind},
    path::Path,
};

pub trait PathExt {
    /// Extension exactly as written on disk, `None` when absent or not UTF-8.
    ///
    /// A dot-file with no other dot (`.jfif`) is all extension.
    fn ext_str(&self) -> Option<&str>;

    /// File name without its extension; empty for a dot-file like `.jfif`.
    fn stem_os(&self) -> Option<&OsStr>;

    /// Whether anything, including a dangling symlink, already sits at this path.
    fn is_taken(&self) -> io::Result<bool>;
}

impl PathExt for Path {
    fn ext_str(&self) -> Option<&str> {
        match dotfile_ext(self) {
            Some(ext) => Some(ext),
            None => self.extension().and_then(|s| s.to_str()),
        }
    }

    fn stem_os(&self) -> Option<&OsStr> {
        match dotfile_ext(self) {
            Some(_) => Some(OsStr::new("")),
            None => self.file_stem(),
        }
    }

    fn is_taken(&self) -> io::Result<bool> {
        match self.symlink_metadata() {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn dotfile_ext(path: &Path) -> Option<&str> {
    path.file_name()?
        .to_str()?
        .strip_prefix('.')
        .filter(|rest| !rest.is_empty() && !rest.contains('.'))
}
