//! Reverie interaction core.
//!
//! Turns noisy, continuous sensor input into deterministic per-tick visual
//! state: hand-landmark frames become discrete gestures, an image becomes a
//! depth-shaded point cloud, transcribed speech becomes animated glyph
//! particles on orbit shells, and saved memories are scored and spatially
//! laid out against a spoken search query.
//!
//! Zero I/O — pure math engine with no opinions about devices, rendering,
//! or scheduling. Collaborator results enter through the event queue and
//! the per-tick state lives in [`SceneState`].

pub mod constants;
pub mod events;
pub mod field;
pub mod gesture;
pub mod glyph;
pub mod layout;
pub mod lifecycle;
pub mod memory;
pub mod noise;
pub mod sampler;
pub mod search;
pub mod state;
pub mod time;
pub mod vector;
pub mod wire;

pub use constants::{CLOUD_EXTENT, EPSILON, GLYPH_CAP, GOLDEN_ANGLE, PINCH_DISTANCE};
pub use events::{CoreEvent, EventQueue};
pub use field::{Cloud, FieldPoint};
pub use gesture::{GestureClassifier, GestureLabel, GestureState, LANDMARK_COUNT, LandmarkFrame};
pub use glyph::{DockSlot, Glyph, GlyphPhase};
pub use layout::{Placement, layout_memories};
pub use lifecycle::{LifecycleEngine, SpawnReport};
pub use memory::{MemoryEntry, SentimentLabel, VoiceSegment, palette_from_cloud};
pub use sampler::{PixelImage, SampleError, luminance, sample_field};
pub use search::{apply_search, extract_keywords, score_memory};
pub use state::SceneState;
pub use wire::{WireError, export_memories, import_memories};
