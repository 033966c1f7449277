//! EXIF carry-over for converted images
//!
//! The raw EXIF block (a TIFF structure) is read out of the source container
//! with `kamadak-exif` and written into the PNG as an `eXIf` chunk directly
//! after `IHDR`.

use anyhow::{Context, Result, bail};
use log::warn;
use std::io::Cursor;

const PNG_SIGNATURE_LEN: usize = 8;
/// length + type + 13 data bytes + crc
const IHDR_CHUNK_LEN: usize = 4 + 4 + 13 + 4;
const EXIF_CHUNK_TYPE: &[u8; 4] = b"eXIf";

/// Raw EXIF block embedded in `file_in_memory`, if any.
pub fn read_exif_block(file_in_memory: &[u8]) -> Option<Vec<u8>> {
    let mut cursor = Cursor::new(file_in_memory);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(exif.buf().to_vec()),
        Err(exif::Error::NotFound(_)) => None,
        Err(err) => {
            warn!("Ignoring unreadable EXIF metadata: {}", err);
            None
        }
    }
}

/// Return a copy of `png` with `exif` stored in an `eXIf` chunk.
pub fn insert_exif_chunk(png: &[u8], exif: &[u8]) -> Result<Vec<u8>> {
    let insert_at = PNG_SIGNATURE_LEN + IHDR_CHUNK_LEN;
    if png.len() < insert_at || &png[PNG_SIGNATURE_LEN + 4..PNG_SIGNATURE_LEN + 8] != b"IHDR" {
        bail!("encoded PNG does not start with an IHDR chunk");
    }
    let length = u32::try_from(exif.len()).context("EXIF block is too large for a PNG chunk")?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(EXIF_CHUNK_TYPE);
    hasher.update(exif);
    let crc = hasher.finalize();

    let mut out = Vec::with_capacity(png.len() + exif.len() + 12);
    out.extend_from_slice(&png[..insert_at]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(EXIF_CHUNK_TYPE);
    out.extend_from_slice(exif);
    out.extend_from_slice(&crc.to_be_bytes());
    out.extend_from_slice(&png[insert_at..]);
    Ok(out)
}
