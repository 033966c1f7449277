//! WEBP to PNG conversion
//!
//! Conversion is additive: the source `.webp` is only ever read. The PNG is
//! fully encoded in memory before the target file is created, so a decode or
//! encode failure never leaves a partial `.png` behind.

use anyhow::{Context, Result};
use image::{
    DynamicImage, ImageDecoder, ImageEncoder, ImageReader,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};
use log::warn;
use std::{
    fs::{self, OpenOptions, read},
    io::{Cursor, Write},
    path::Path,
    time::Instant,
};

use super::metadata::{insert_exif_chunk, read_exif_block};
use crate::common::PNG_EXTENSION;
use crate::utils::PathExt;
use crate::workflow::types::{FileTask, Outcome};

/// A decoded image together with the metadata worth carrying into the PNG.
pub struct DecodedImage {
    pub image: DynamicImage,
    pub icc_profile: Option<Vec<u8>>,
    pub exif: Option<Vec<u8>>,
}

/// Write a PNG copy of a WEBP file next to it, unless one already exists.
pub fn convert_to_png(task: &FileTask) -> Outcome {
    convert_task(task).unwrap_or_else(|error| Outcome::failed(&task.path, error))
}

fn convert_task(task: &FileTask) -> Result<Outcome> {
    let target = task.target_path(PNG_EXTENSION);
    if target
        .is_taken()
        .with_context(|| format!("failed to check whether {:?} exists", target))?
    {
        return Ok(Outcome::target_exists(&task.path, target));
    }

    let start_time = Instant::now();
    let decoded = decode_image(&task.path)
        .with_context(|| format!("failed to decode image: {:?}", task.path))?;
    let png = encode_png(&decoded).context("failed to encode PNG")?;
    write_new_file(&target, &png)?;

    Ok(Outcome::Done {
        source: task.path.clone(),
        target,
        elapsed: start_time.elapsed(),
    })
}

// ────────────────────────────────────────────────────────────────
// Decoding
// ────────────────────────────────────────────────────────────────

/// Decode `file_path`, detecting the format from its content rather than its name.
pub fn decode_image(file_path: &Path) -> Result<DecodedImage> {
    let file_in_memory =
        read(file_path).context(format!("failed to read file into memory: {:?}", file_path))?;

    let mut decoder = ImageReader::new(Cursor::new(&file_in_memory))
        .with_guessed_format()
        .context("failed to inspect image header")?
        .into_decoder()
        .context("image crate found no decoder for this content")?;

    let icc_profile = decoder
        .icc_profile()
        .context("failed to read ICC profile")?;
    let image = DynamicImage::from_decoder(decoder)
        .context("image crate failed to decode image from memory")?;
    let exif = read_exif_block(&file_in_memory);

    Ok(DecodedImage {
        image,
        icc_profile,
        exif,
    })
}

// ────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────

/// Encode losslessly at the strongest compression level, keeping ICC and EXIF data.
pub fn encode_png(decoded: &DecodedImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);

    if let Some(icc_profile) = &decoded.icc_profile {
        if let Err(err) = encoder.set_icc_profile(icc_profile.clone()) {
            warn!("Dropping ICC profile the PNG encoder cannot store: {}", err);
        }
    }

    decoded
        .image
        .write_with_encoder(encoder)
        .context("image crate failed to encode PNG")?;

    match &decoded.exif {
        Some(exif) => insert_exif_chunk(&buffer, exif).context("failed to embed EXIF metadata"),
        None => Ok(buffer),
    }
}

// ────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────

/// Create `target` (it must not exist yet) and fill it with `contents`.
/// A failed write removes the half-written file.
fn write_new_file(target: &Path, contents: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .with_context(|| format!("failed to create {:?}", target))?;

    let written = file.write_all(contents).and_then(|_| file.sync_all());
    if let Err(err) = written {
        drop(file);
        if let Err(remove_err) = fs::remove_file(target) {
            warn!("Failed to remove partial file {:?}: {}", target, remove_err);
        }
        return Err(err).with_context(|| format!("failed to write {:?}", target));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::SkipReason;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    // Little-endian TIFF header followed by an empty IFD.
    const TINY_EXIF: &[u8] = b"II*\0\x08\0\0\0\0\0\0\0\0\0";
    const FAKE_ICC: &[u8] = b"profile bytes kept verbatim";

    const VP8X_ICC_FLAG: u8 = 0x20;
    const VP8X_EXIF_FLAG: u8 = 0x08;

    fn riff_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut chunk = fourcc.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    /// Extended-format WEBP: VP8X header, ICCP, the lossless bitstream, then EXIF.
    fn write_webp_with_metadata(path: &Path) -> RgbImage {
        let pixels = RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 60) as u8, (y * 90) as u8, 33]));
        let mut simple = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut simple), ImageFormat::WebP)
            .unwrap();
        // Skip "RIFF", size and "WEBP" to reach the VP8L chunk.
        let bitstream_chunk = &simple[12..];

        let mut vp8x = vec![VP8X_ICC_FLAG | VP8X_EXIF_FLAG, 0, 0, 0];
        vp8x.extend_from_slice(&(pixels.width() - 1).to_le_bytes()[..3]);
        vp8x.extend_from_slice(&(pixels.height() - 1).to_le_bytes()[..3]);

        let mut body = b"WEBP".to_vec();
        body.extend(riff_chunk(b"VP8X", &vp8x));
        body.extend(riff_chunk(b"ICCP", FAKE_ICC));
        body.extend_from_slice(bitstream_chunk);
        body.extend(riff_chunk(b"EXIF", TINY_EXIF));

        let mut file = b"RIFF".to_vec();
        file.extend_from_slice(&(body.len() as u32).to_le_bytes());
        file.extend(body);
        fs::write(path, file).unwrap();
        pixels
    }

    fn write_webp(path: &Path) -> RgbaImage {
        let mut pixels = RgbaImage::new(3, 2);
        for (x, y, pixel) in pixels.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 80) as u8, (y * 120) as u8, 7, 255 - x as u8]);
        }
        pixels.save_with_format(path, ImageFormat::WebP).unwrap();
        pixels
    }

    #[test]
    fn converts_webp_and_keeps_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("pic.webp");
        let original = write_webp(&source);
        let source_bytes = fs::read(&source).unwrap();

        let outcome = convert_to_png(&FileTask::new(&source).unwrap());

        let target = dir.path().join("pic.png");
        assert!(outcome.is_done(), "unexpected outcome: {:?}", outcome);
        assert_eq!(fs::read(&source).unwrap(), source_bytes);

        let converted = image::open(&target).unwrap();
        assert_eq!(
            image::guess_format(&fs::read(&target).unwrap()).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(converted.to_rgba8(), original);
    }

    #[test]
    fn exif_and_icc_survive_conversion() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("tagged.webp");
        let original = write_webp_with_metadata(&source);

        let decoded = decode_image(&source).unwrap();
        assert_eq!(decoded.exif.as_deref(), Some(TINY_EXIF));
        assert_eq!(decoded.icc_profile.as_deref(), Some(FAKE_ICC));

        let outcome = convert_to_png(&FileTask::new(&source).unwrap());
        assert!(outcome.is_done(), "unexpected outcome: {:?}", outcome);

        let target = dir.path().join("tagged.png");
        let png = fs::read(&target).unwrap();
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(&png))
            .unwrap();
        assert_eq!(exif.buf(), TINY_EXIF);

        let mut png_decoder = ImageReader::open(&target)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .into_decoder()
            .unwrap();
        assert_eq!(png_decoder.icc_profile().unwrap().as_deref(), Some(FAKE_ICC));
        assert_eq!(image::load_from_memory(&png).unwrap().to_rgb8(), original);
    }

    #[test]
    fn format_comes_from_content_not_name() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("really_a_png.webp");
        RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]))
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let outcome = convert_to_png(&FileTask::new(&source).unwrap());

        assert!(outcome.is_done(), "unexpected outcome: {:?}", outcome);
        let converted = image::open(dir.path().join("really_a_png.png")).unwrap();
        assert_eq!(converted.to_rgba8().get_pixel(0, 0), &Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn existing_png_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("pic.webp");
        let target = dir.path().join("pic.png");
        write_webp(&source);
        fs::write(&target, b"keep me").unwrap();

        let outcome = convert_to_png(&FileTask::new(&source).unwrap());

        match outcome {
            Outcome::Skipped(SkipReason::TargetExists { target: t, .. }) => assert_eq!(t, target),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fs::read(&target).unwrap(), b"keep me");
        assert!(source.exists());
    }

    #[test]
    fn corrupt_webp_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.webp");
        fs::write(&source, b"this is not an image").unwrap();

        let outcome = convert_to_png(&FileTask::new(&source).unwrap());

        match outcome {
            Outcome::Failed { source: s, error } => {
                assert_eq!(s, source);
                assert!(format!("{:#}", error).contains("failed to decode image"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(source.exists());
        assert!(!dir.path().join("broken.png").exists());
    }

    #[test]
    fn write_new_file_refuses_to_clobber() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("taken.png");
        fs::write(&target, b"first").unwrap();

        assert!(write_new_file(&target, b"second").is_err());
        assert_eq!(fs::read(&target).unwrap(), b"first");
    }
}
