//! manga-batch - Batch Manga Page Translation
//!
//! Runs an external per-image translation tool over a directory tree of
//! scanned pages, and translates only the latin-script parts of mixed-script
//! text through a single-string translation backend.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod translate;
