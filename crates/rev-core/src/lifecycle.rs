//! Per-tick advancement of glyph particles and the ambient field, plus the
//! transcript spawn policy and the glyph capacity cap.

use crate::constants::{DISRUPTION_DECAY, DOCK_SPIN_RATE, GLYPH_CAP, MAX_TICK_MS};
use crate::gesture::GestureLabel;
use crate::glyph::Glyph;
use crate::state::SceneState;

/// What one transcript ingestion did: ids spawned this batch and ids
/// evicted by the cap. Evicted ids let the rendering collaborator tear
/// down its handles together with the physics state.
#[derive(Debug, Default)]
pub struct SpawnReport {
    pub spawned: Vec<u64>,
    pub evicted: Vec<u64>,
}

/// Owns every live glyph and the clocks that drive them.
///
/// Two clocks: `clock_ms` always advances and drives the ambient field;
/// `glyph_clock_ms` freezes while reading mode is active, which is what
/// pauses the text life cycle entirely.
#[derive(Debug, Default)]
pub struct LifecycleEngine {
    glyphs: Vec<Glyph>,
    next_id: u64,
    /// Global running character counter; assigns dock ring slots.
    dock_counter: u64,
    clock_ms: f64,
    glyph_clock_ms: f64,
    last_transcript: String,
}

impl LifecycleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn last_transcript(&self) -> &str {
        &self.last_transcript
    }

    /// Forget the spawn-tracking transcript (an utterance finalized; the
    /// interim buffer restarts empty).
    pub fn clear_transcript(&mut self) {
        self.last_transcript.clear();
    }

    /// Scene reset: drops all glyphs and the ring assignment counter.
    /// Glyph ids stay monotonic across resets.
    pub fn reset(&mut self) {
        self.glyphs.clear();
        self.dock_counter = 0;
        self.last_transcript.clear();
    }

    /// Apply the transcript spawn policy.
    ///
    /// A prefix continuation spawns only the appended suffix. A restore
    /// (scene reset with saved text) spawns the whole text once. Any other
    /// change re-spawns the full current text; if the transcript was
    /// edited non-append-only this duplicates visible glyphs, a known
    /// tolerated limitation of the policy.
    pub fn ingest_transcript(&mut self, text: &str, restore: bool) -> SpawnReport {
        let suffix = if restore {
            text
        } else if text.starts_with(self.last_transcript.as_str()) {
            &text[self.last_transcript.len()..]
        } else {
            text
        };

        let mut report = SpawnReport::default();
        for (batch_index, character) in suffix.chars().enumerate() {
            let id = self.next_id;
            self.next_id += 1;
            let glyph = Glyph::new(id, character, self.dock_counter, batch_index, self.glyph_clock_ms);
            self.dock_counter += 1;
            self.glyphs.push(glyph);
            report.spawned.push(id);
        }
        self.last_transcript = text.to_string();

        if self.glyphs.len() > GLYPH_CAP {
            let excess = self.glyphs.len() - GLYPH_CAP;
            report.evicted = self.glyphs.drain(..excess).map(|g| g.id).collect();
        }
        report
    }

    /// Advance one render tick. The timestep is clamped so a stalled frame
    /// cannot teleport particles; every update below is panic-free, so a
    /// tick either completes or leaves state consistent.
    pub fn advance(&mut self, state: &mut SceneState, dt_ms: f64) {
        let dt_ms = dt_ms.clamp(0.0, MAX_TICK_MS);
        let dt_s = (dt_ms / 1000.0) as f32;
        self.clock_ms += dt_ms;

        if state.gesture.detected && state.gesture.label == GestureLabel::Open {
            state.disruption = 1.0;
        } else {
            state.disruption = (state.disruption - DISRUPTION_DECAY * dt_s).max(0.0);
        }

        if !state.reading_mode {
            self.glyph_clock_ms += dt_ms;
            let spin = (self.glyph_clock_ms / 1000.0) as f32 * DOCK_SPIN_RATE;
            for glyph in &mut self.glyphs {
                glyph.advance(self.glyph_clock_ms, dt_s, spin, &state.gesture);
            }
        }

        let clock_s = (self.clock_ms / 1000.0) as f32;
        state
            .cloud
            .advance(clock_s, dt_s, state.disruption, state.reading_mode);
    }
}
