use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::field::FieldPoint;
use crate::sampler::luminance;

/// Sentiment of a spoken segment, as reported by the external analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// One finalized utterance inside a memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoiceSegment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub timestamp_ms: u64,
}

/// A saved snapshot of scene state. Immutable after capture except
/// `match_score`, which is transient search output and never part of the
/// entry's identity.
#[derive(Clone, Debug)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub timestamp_ms: u64,
    pub transcript: String,
    pub sentiment: SentimentLabel,
    /// Reference resolvable back into decodable image bytes on restore.
    pub source_image: String,
    pub point_density: usize,
    pub palette: [[f32; 3]; 3],
    pub voice_segments: Vec<VoiceSegment>,
    pub match_score: f32,
}

impl MemoryEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        transcript: &str,
        sentiment: SentimentLabel,
        source_image: &str,
        point_density: usize,
        palette: [[f32; 3]; 3],
        voice_segments: Vec<VoiceSegment>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_ms,
            transcript: transcript.to_string(),
            sentiment,
            source_image: source_image.to_string(),
            point_density,
            palette,
            voice_segments,
            match_score: 0.0,
        }
    }
}

/// Derive the three-color palette of a cloud: its darkest, median, and
/// brightest points by luminance. A short cloud repeats what it has;
/// an empty one is white.
pub fn palette_from_cloud(points: &[FieldPoint]) -> [[f32; 3]; 3] {
    if points.is_empty() {
        return [[1.0, 1.0, 1.0]; 3];
    }
    let mut colors: Vec<[f32; 3]> = points.iter().map(|p| p.color).collect();
    colors.sort_by(|a, b| {
        luminance(a[0], a[1], a[2])
            .partial_cmp(&luminance(b[0], b[1], b[2]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    [colors[0], colors[colors.len() / 2], colors[colors.len() - 1]]
}
