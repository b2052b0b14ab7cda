//! Contracts for the external collaborators the core consumes as black
//! boxes: the hand-landmark detector, the streaming speech recognizer, the
//! sentiment analyzer, the audio capture device, and the rendering surface.

use futures_util::stream::BoxStream;

use rev_core::{FieldPoint, LandmarkFrame, Placement, SentimentLabel};
use rev_core::vector::Vec3;

use crate::error::Result;

/// One frame grabbed from the video device. Acquisition is out of scope;
/// the payload is opaque to the core.
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub timestamp_ms: f64,
}

/// Hand-landmark detection. May fail on a bad frame; callers catch and
/// degrade to "no hand" rather than letting the error cross the poll loop.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &VideoFrame, timestamp_ms: f64) -> Result<Option<LandmarkFrame>>;
}

/// One event from the streaming speech recognizer. Interim events
/// overwrite the live transcript; final events append a permanent record.
#[derive(Clone, Debug)]
pub struct TranscriptEvent {
    pub is_final: bool,
    pub text: String,
}

/// Streaming speech recognition. A session is a long-lived stream of
/// transcript events; the stream ending means the session terminated.
/// The runtime reopens sessions while recording to keep at least one
/// listening session alive.
pub trait SpeechEngine: Send {
    fn open_session(&mut self) -> BoxStream<'static, TranscriptEvent>;
}

/// A sealed chunk of captured audio, rotated out on a fixed period.
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sealed_at_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct SentimentReading {
    pub label: SentimentLabel,
    pub confidence: f32,
}

impl SentimentReading {
    /// "Analysis unavailable": distinct from a detected neutral, and never
    /// allowed to overwrite a prior real reading.
    pub fn unavailable() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// Sentiment analysis of an audio chunk. Shared with the chunk task, so
/// implementations must be Sync; analysis runs off the render path.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, chunk: &AudioChunk) -> Result<SentimentReading>;
}

/// The microphone. Acquisition hands out a stream that must be released;
/// [`crate::recorder::CaptureGuard`] enforces the scoped discipline.
pub trait AudioCapture: Send {
    fn acquire(&mut self) -> Result<Box<dyn CaptureStream>>;
}

pub trait CaptureStream: Send {
    /// Samples accumulated since the last drain.
    fn drain(&mut self) -> Vec<f32>;
    /// Release the underlying device. Idempotence is the guard's job.
    fn release(&mut self);
}

/// What the renderer needs per glyph, assembled fresh each tick.
#[derive(Clone, Copy, Debug)]
pub struct GlyphSprite {
    pub id: u64,
    pub character: char,
    pub position: Vec3,
    pub scale: f32,
}

/// The rendering surface. Owns all paint and material concerns; the
/// session only hands it the per-tick state.
pub trait RenderSurface: Send {
    fn present(&mut self, points: &[FieldPoint], glyphs: &[GlyphSprite], memories: &[Placement]);
    /// Evicted glyph ids, so render handles die with the physics state.
    fn retire_glyphs(&mut self, ids: &[u64]);
}
