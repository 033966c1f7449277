use std::path::Path;

use crate::common::{JFIF_EXTENSION, JPEG_VARIANT_PREFIXES, WEBP_EXTENSION};
use crate::utils::PathExt;
use crate::workflow::types::FileKind;

/// Decide which rule, if any, applies to `path`. Matching is case-sensitive.
pub fn classify(path: &Path) -> FileKind {
    match path.ext_str() {
        Some(ext) if is_jpeg_variant(ext) => FileKind::JpegVariant,
        Some(WEBP_EXTENSION) => FileKind::Webp,
        _ => FileKind::Ignore,
    }
}

fn is_jpeg_variant(ext: &str) -> bool {
    ext == JFIF_EXTENSION
        || JPEG_VARIANT_PREFIXES
            .iter()
            .any(|prefix| ext.starts_with(prefix))
}
