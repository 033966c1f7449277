pub mod errors;

/// Extension prefixes left behind by web downloads of JPEGs (`.jpg_large`, `.jpg-orig`, ...)
pub const JPEG_VARIANT_PREFIXES: &[&str] = &["jpg_", "jpg-"];

pub const JFIF_EXTENSION: &str = "jfif";

pub const WEBP_EXTENSION: &str = "webp";

pub const JPG_EXTENSION: &str = "jpg";

pub const PNG_EXTENSION: &str = "png";
