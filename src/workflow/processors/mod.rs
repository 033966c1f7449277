//! Processors module - the per-file building blocks of a run
//!
//! This module contains the following submodules:
//! - `scan`: Recursive enumeration of the working tree
//! - `classify`: Extension classification
//! - `rename`: JPEG-variant extension repair
//! - `convert`: WEBP to PNG conversion
//! - `metadata`: EXIF extraction and PNG `eXIf` chunk splicing
//! - `setup`: Logger initialization

pub mod classify;
pub mod convert;
pub mod metadata;
pub mod rename;
pub mod scan;
pub mod setup;
