//! The explicit application-state struct shared by all engines.
//!
//! There are no ambient singletons: every per-tick update takes this struct
//! by reference. Each piece has a single writer (the detection loop owns
//! `gesture`, the lifecycle engine owns `cloud` and `disruption`) and state
//! is replaced wholesale, never partially mutated, across readers.

use uuid::Uuid;

use crate::field::Cloud;
use crate::gesture::GestureState;
use crate::memory::{MemoryEntry, SentimentLabel, VoiceSegment, palette_from_cloud};

#[derive(Debug, Default)]
pub struct SceneState {
    /// Latest classifier output, overwritten every detector poll.
    pub gesture: GestureState,
    /// Live interim transcript; cleared when an utterance finalizes.
    pub transcript: String,
    /// Last known sentiment. An "analysis unavailable" reading never
    /// overwrites this.
    pub sentiment: SentimentLabel,
    /// Disruption drive in [0, 1]; raised by negative sentiment and open
    /// hands, decays each tick.
    pub disruption: f32,
    pub reading_mode: bool,
    pub cloud: Cloud,
    /// Generation of the cloud currently applied; stale sampling results
    /// are discarded against this.
    pub cloud_generation: u64,
    /// Reference to the currently loaded image, captured into memories.
    pub source_image: String,
    pub memories: Vec<MemoryEntry>,
    /// Finalized utterances since the last save, captured into the next
    /// memory entry.
    pub pending_segments: Vec<VoiceSegment>,
    /// Glyph ids evicted by the capacity cap since the last tick; the
    /// renderer drains these to tear down its handles in the same tick.
    pub evicted_glyphs: Vec<u64>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cloud if `generation` is not stale. Returns whether the
    /// cloud was applied; the newest sampling request always wins.
    pub fn apply_cloud(&mut self, cloud: Cloud, generation: u64) -> bool {
        if generation < self.cloud_generation {
            return false;
        }
        self.cloud = cloud;
        self.cloud_generation = generation;
        true
    }

    /// Capture the current scene into a new memory entry and return its id.
    /// Pending voice segments move into the entry.
    pub fn save_memory(&mut self, timestamp_ms: u64) -> Uuid {
        let spoken: Vec<&str> = self
            .pending_segments
            .iter()
            .map(|s| s.text.as_str())
            .chain(if self.transcript.is_empty() {
                None
            } else {
                Some(self.transcript.as_str())
            })
            .collect();

        let entry = MemoryEntry::capture(
            spoken.join(" ").trim(),
            self.sentiment,
            &self.source_image,
            self.cloud.len(),
            palette_from_cloud(self.cloud.points()),
            std::mem::take(&mut self.pending_segments),
            timestamp_ms,
        );
        let id = entry.id;
        self.memories.push(entry);
        id
    }

    pub fn memory(&self, id: Uuid) -> Option<&MemoryEntry> {
        self.memories.iter().find(|m| m.id == id)
    }
}
