//! JSON wire format for memory save/restore.
//!
//! CamelCase field names, versioned envelope. `matchScore` is transient
//! search output and deliberately absent from the wire shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::memory::{MemoryEntry, SentimentLabel, VoiceSegment};
use crate::time::now_iso8601;

pub const WIRE_VERSION: &str = "1";

#[derive(Debug)]
pub enum WireError {
    Json(serde_json::Error),
    UnsupportedVersion(String),
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::Json(e) => write!(f, "JSON error: {e}"),
            WireError::UnsupportedVersion(v) => write!(f, "unsupported wire version: {v}"),
        }
    }
}

impl std::error::Error for WireError {}

impl From<serde_json::Error> for WireError {
    fn from(e: serde_json::Error) -> Self {
        WireError::Json(e)
    }
}

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug)]
pub struct WireExport {
    pub version: String,
    pub timestamp: String,
    pub memories: Vec<WireMemory>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireMemory {
    pub id: String,
    pub timestamp_ms: u64,
    pub transcript_text: String,
    pub sentiment_label: SentimentLabel,
    /// Must resolve back into decodable image bytes on restore.
    pub source_image_reference: String,
    pub point_cloud_density: usize,
    pub color_palette: [[f32; 3]; 3],
    pub voice_segments: Vec<WireSegment>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireSegment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub timestamp_ms: u64,
}

// --- Conversion: Domain ↔ Wire ---

fn memory_to_wire(memory: &MemoryEntry) -> WireMemory {
    WireMemory {
        id: memory.id.to_string(),
        timestamp_ms: memory.timestamp_ms,
        transcript_text: memory.transcript.clone(),
        sentiment_label: memory.sentiment,
        source_image_reference: memory.source_image.clone(),
        point_cloud_density: memory.point_density,
        color_palette: memory.palette,
        voice_segments: memory
            .voice_segments
            .iter()
            .map(|s| WireSegment {
                text: s.text.clone(),
                sentiment: s.sentiment,
                timestamp_ms: s.timestamp_ms,
            })
            .collect(),
    }
}

fn wire_to_memory(wire: WireMemory) -> MemoryEntry {
    MemoryEntry {
        id: Uuid::parse_str(&wire.id).unwrap_or_else(|_| Uuid::new_v4()),
        timestamp_ms: wire.timestamp_ms,
        transcript: wire.transcript_text,
        sentiment: wire.sentiment_label,
        source_image: wire.source_image_reference,
        point_density: wire.point_cloud_density,
        palette: wire.color_palette,
        voice_segments: wire
            .voice_segments
            .into_iter()
            .map(|s| VoiceSegment {
                text: s.text,
                sentiment: s.sentiment,
                timestamp_ms: s.timestamp_ms,
            })
            .collect(),
        match_score: 0.0,
    }
}

/// Serialize the memory list to versioned JSON.
pub fn export_memories(memories: &[MemoryEntry]) -> Result<String, WireError> {
    let export = WireExport {
        version: WIRE_VERSION.to_string(),
        timestamp: now_iso8601(),
        memories: memories.iter().map(memory_to_wire).collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Parse versioned JSON back into memory entries.
pub fn import_memories(json: &str) -> Result<Vec<MemoryEntry>, WireError> {
    let export: WireExport = serde_json::from_str(json)?;
    if export.version != WIRE_VERSION {
        return Err(WireError::UnsupportedVersion(export.version));
    }
    Ok(export.memories.into_iter().map(wire_to_memory).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_memory() -> MemoryEntry {
        let mut m = MemoryEntry::capture(
            "walking by the sea",
            SentimentLabel::Positive,
            "memory://img/42",
            400,
            [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9]],
            vec![VoiceSegment {
                text: "walking by the sea".into(),
                sentiment: SentimentLabel::Positive,
                timestamp_ms: 12,
            }],
            1_000,
        );
        m.match_score = 0.75; // transient; must not survive the wire
        m
    }

    #[test]
    fn test_roundtrip() {
        let memories = vec![sample_memory()];
        let json = export_memories(&memories).unwrap();
        let restored = import_memories(&json).unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, memories[0].id);
        assert_eq!(restored[0].transcript, "walking by the sea");
        assert_eq!(restored[0].source_image, "memory://img/42");
        assert_eq!(restored[0].palette, memories[0].palette);
        assert_eq!(restored[0].voice_segments.len(), 1);
        assert_eq!(restored[0].match_score, 0.0, "match score is transient");
    }

    #[test]
    fn test_camel_case_field_names() {
        let json = export_memories(&[sample_memory()]).unwrap();
        assert!(json.contains("\"sourceImageReference\""));
        assert!(json.contains("\"pointCloudDensity\""));
        assert!(json.contains("\"colorPalette\""));
        assert!(json.contains("\"voiceSegments\""));
        assert!(!json.contains("matchScore"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let json = r#"{"version":"99","timestamp":"","memories":[]}"#;
        let err = import_memories(json).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedVersion(v) if v == "99"));
    }

    #[test]
    fn test_malformed_palette_rejected() {
        let json = r#"{"version":"1","timestamp":"","memories":[{
            "id":"x","timestampMs":1,"transcriptText":"t","sentimentLabel":"neutral",
            "sourceImageReference":"r","pointCloudDensity":5,
            "colorPalette":[[0.1,0.2,0.3],[0.4,0.5,0.6]],
            "voiceSegments":[]}]}"#;
        assert!(matches!(import_memories(json), Err(WireError::Json(_))));
    }

    #[test]
    fn test_unparseable_id_gets_fresh_uuid() {
        let json = r#"{"version":"1","timestamp":"","memories":[{
            "id":"not-a-uuid","timestampMs":1,"transcriptText":"t","sentimentLabel":"neutral",
            "sourceImageReference":"r","pointCloudDensity":5,
            "colorPalette":[[0,0,0],[0,0,0],[0,0,0]],
            "voiceSegments":[]}]}"#;
        let restored = import_memories(json).unwrap();
        assert_eq!(restored.len(), 1);
    }
}
