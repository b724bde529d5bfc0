//! Transcript export
//!
//! Every exporter renders a finished [`Transcript`] into bytes; [`write_export`]
//! puts those bytes on disk under a timestamped name.

mod json;
mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::debate::Transcript;
use crate::error::{Error, Result};

pub use json::JsonExporter;
pub use pdf::PdfExporter;

/// Renders a transcript into a document format
pub trait TranscriptExporter: Send + Sync {
    /// Short format name used in messages (e.g., "pdf")
    fn format(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn export(&self, transcript: &Transcript) -> Result<Vec<u8>>;
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.<ext>` using local time now
pub fn export_filename(prefix: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, Local::now().format("%Y%m%d_%H%M%S"), extension)
}

/// Render `transcript` and write it into `dir`, returning the file path
pub fn write_export(
    dir: &Path,
    prefix: &str,
    exporter: &dyn TranscriptExporter,
    transcript: &Transcript,
) -> Result<PathBuf> {
    let bytes = exporter.export(transcript)?;

    fs::create_dir_all(dir).map_err(|e| Error::IoWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(export_filename(prefix, exporter.extension()));
    fs::write(&path, &bytes).map_err(|e| Error::IoWrite {
        path: path.clone(),
        source: e,
    })?;

    info!(
        format = exporter.format(),
        path = %path.display(),
        bytes = bytes.len(),
        "Transcript exported"
    );
    Ok(path)
}
