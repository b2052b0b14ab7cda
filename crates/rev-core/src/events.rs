//! Message events from the asynchronous collaborators, drained once per
//! render tick.
//!
//! Speech and sentiment results arrive on background tasks; pushing them
//! through this queue and applying them in one place per tick is what
//! keeps the "apply at most once per tick" ordering guarantee.

use std::collections::VecDeque;

use crate::field::{Cloud, FieldPoint};
use crate::lifecycle::LifecycleEngine;
use crate::memory::{SentimentLabel, VoiceSegment};
use crate::state::SceneState;

#[derive(Debug)]
pub enum CoreEvent {
    /// Interim recognition result; overwrites the live transcript.
    TranscriptInterim { text: String },
    /// Finalized utterance; appends a permanent voice record and clears
    /// the interim buffer.
    TranscriptFinal { text: String, timestamp_ms: u64 },
    /// Sentiment reading for the latest audio chunk. Zero-confidence
    /// neutral means "analysis unavailable", not "detected neutral".
    Sentiment {
        label: SentimentLabel,
        confidence: f32,
    },
    /// A finished sampling run. Stale generations lose against the newest
    /// applied cloud.
    CloudSampled {
        points: Vec<FieldPoint>,
        generation: u64,
    },
}

/// Single-consumer FIFO of pending collaborator results.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<CoreEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CoreEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Apply every pending event to the scene, in arrival order.
    /// Returns how many events were applied.
    pub fn drain_into(&mut self, state: &mut SceneState, engine: &mut LifecycleEngine) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.pop_front() {
            apply_event(event, state, engine);
            applied += 1;
        }
        applied
    }
}

fn apply_event(event: CoreEvent, state: &mut SceneState, engine: &mut LifecycleEngine) {
    match event {
        CoreEvent::TranscriptInterim { text } => {
            let report = engine.ingest_transcript(&text, false);
            state.evicted_glyphs.extend(report.evicted);
            state.transcript = text;
        }
        CoreEvent::TranscriptFinal { text, timestamp_ms } => {
            state.pending_segments.push(VoiceSegment {
                text,
                sentiment: state.sentiment,
                timestamp_ms,
            });
            state.transcript.clear();
            engine.clear_transcript();
        }
        CoreEvent::Sentiment { label, confidence } => {
            // "unavailable" must not clobber a real reading
            if label == SentimentLabel::Neutral && confidence == 0.0 {
                return;
            }
            state.sentiment = label;
            if label == SentimentLabel::Negative {
                state.disruption = 1.0;
            }
        }
        CoreEvent::CloudSampled { points, generation } => {
            state.apply_cloud(Cloud::new(points), generation);
        }
    }
}
