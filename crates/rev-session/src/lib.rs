//! Reverie session runtime.
//!
//! Wires the pure interaction core to its external collaborators under the
//! cooperative scheduling model: a render tick the caller drives, a
//! detection poll the caller drives, and background tasks for audio chunk
//! rotation and streaming speech whose results are applied on the next
//! tick through the core's event queue.

pub mod collab;
pub mod error;
pub mod recorder;
pub mod session;

pub use collab::{
    AudioCapture, AudioChunk, CaptureStream, GlyphSprite, LandmarkDetector, RenderSurface,
    SentimentAnalyzer, SentimentReading, SpeechEngine, TranscriptEvent, VideoFrame,
};
pub use error::{Result, SessionError};
pub use recorder::CaptureGuard;
pub use session::{Session, SessionConfig};
