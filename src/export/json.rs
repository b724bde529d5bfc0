use crate::debate::Transcript;
use crate::error::{Error, Result};

use super::TranscriptExporter;

/// Pretty-printed JSON transcript
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl TranscriptExporter for JsonExporter {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, transcript: &Transcript) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(transcript).map_err(|e| Error::export_failed("json", e))
    }
}
