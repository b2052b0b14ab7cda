//! Simulated collaborators for the headless demo.
//!
//! No camera, microphone, or model backends: the detector plays a scripted
//! sequence of hand poses, the speech engine streams scripted lines word
//! by word, sentiment derives from chunk loudness, and the renderer only
//! tallies what it was handed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use rev_core::gesture::{LANDMARK_COUNT, LandmarkFrame, landmark};
use rev_core::vector::Vec3;
use rev_core::{FieldPoint, Placement, PixelImage, SentimentLabel};
use rev_session::{
    AudioCapture, AudioChunk, CaptureStream, GlyphSprite, LandmarkDetector, RenderSurface,
    Result, SentimentAnalyzer, SentimentReading, SpeechEngine, TranscriptEvent, VideoFrame,
};

// --- Detector ---

/// Scripted hand poses, one segment at a time.
#[derive(Clone, Copy, Debug)]
pub enum SimPose {
    NoHand,
    Open,
    Fist,
    Pinch,
    /// Index finger pointing, sweeping horizontally at `speed` units/s.
    Sweep { speed: f32 },
}

/// Plays `(ticks, pose)` segments in order, holding the last one.
pub struct SimDetector {
    script: Vec<(usize, SimPose)>,
    tick: usize,
    sweep_x: f32,
}

impl SimDetector {
    pub fn new(script: Vec<(usize, SimPose)>) -> Self {
        Self {
            script,
            tick: 0,
            sweep_x: 0.2,
        }
    }

    /// The demo's default choreography: idle, open burst, gather, sweep.
    pub fn choreography() -> Self {
        Self::new(vec![
            (60, SimPose::NoHand),
            (90, SimPose::Open),
            (60, SimPose::NoHand),
            (90, SimPose::Fist),
            (60, SimPose::Sweep { speed: 1.6 }),
            (30, SimPose::Pinch),
            (usize::MAX, SimPose::NoHand),
        ])
    }

    fn current(&self) -> SimPose {
        let mut remaining = self.tick;
        for (ticks, pose) in &self.script {
            if remaining < *ticks {
                return *pose;
            }
            remaining -= ticks;
        }
        SimPose::NoHand
    }
}

impl LandmarkDetector for SimDetector {
    fn detect(&mut self, _frame: &VideoFrame, _timestamp_ms: f64) -> Result<Option<LandmarkFrame>> {
        let pose = self.current();
        self.tick += 1;
        if let SimPose::Sweep { speed } = pose {
            // ~60 polls/s in the demo loop
            self.sweep_x = (self.sweep_x + speed / 60.0).rem_euclid(0.8) + 0.1;
        }
        Ok(pose_frame(pose, self.sweep_x))
    }
}

/// Build a synthetic landmark frame for a pose. Coordinates follow the
/// detector convention: normalized image space, y growing downward.
pub fn pose_frame(pose: SimPose, sweep_x: f32) -> Option<LandmarkFrame> {
    let mut points = [Vec3::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
    points[landmark::THUMB_TIP] = Vec3::new(0.3, 0.8, 0.0);

    let finger_pairs = [
        (landmark::INDEX_TIP, landmark::INDEX_PIP),
        (landmark::MIDDLE_TIP, landmark::MIDDLE_PIP),
        (landmark::RING_TIP, landmark::RING_PIP),
        (landmark::PINKY_TIP, landmark::PINKY_PIP),
    ];

    match pose {
        SimPose::NoHand => return None,
        SimPose::Open => {
            for (i, (tip, pip)) in finger_pairs.into_iter().enumerate() {
                let x = 0.4 + i as f32 * 0.05;
                points[tip] = Vec3::new(x, 0.3, 0.0);
                points[pip] = Vec3::new(x, 0.55, 0.0);
            }
            points[landmark::INDEX_MCP] = Vec3::new(0.42, 0.6, 0.0);
            points[landmark::PINKY_MCP] = Vec3::new(0.58, 0.6, 0.0);
        }
        SimPose::Fist => {
            points[landmark::INDEX_MCP] = Vec3::new(0.42, 0.6, 0.0);
            points[landmark::PINKY_MCP] = Vec3::new(0.58, 0.6, 0.0);
        }
        SimPose::Pinch => {
            points[landmark::INDEX_TIP] = Vec3::new(0.31, 0.79, 0.0);
            points[landmark::INDEX_MCP] = Vec3::new(0.42, 0.6, 0.0);
            points[landmark::PINKY_MCP] = Vec3::new(0.58, 0.6, 0.0);
        }
        SimPose::Sweep { .. } => {
            points[landmark::INDEX_TIP] = Vec3::new(sweep_x, 0.3, 0.0);
            points[landmark::INDEX_PIP] = Vec3::new(sweep_x, 0.55, 0.0);
            // hand edge-on: knuckles nearly collinear with the wrist
            points[landmark::INDEX_MCP] = Vec3::new(0.5, 0.62, 0.0);
            points[landmark::PINKY_MCP] = Vec3::new(0.5, 0.64, 0.0);
        }
    }
    Some(LandmarkFrame::new(points))
}

// --- Speech ---

/// Streams each scripted line word by word as interim events, then a final.
/// The first session plays the whole script; reopened sessions idle.
pub struct SimSpeech {
    lines: Vec<String>,
    pub word_delay: Duration,
}

impl SimSpeech {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            word_delay: Duration::from_millis(30),
        }
    }
}

impl SpeechEngine for SimSpeech {
    fn open_session(&mut self) -> BoxStream<'static, TranscriptEvent> {
        let lines = std::mem::take(&mut self.lines);
        if lines.is_empty() {
            return futures_util::stream::pending().boxed();
        }
        let delay = self.word_delay;
        async_stream::stream! {
            for line in lines {
                let mut partial = String::new();
                for word in line.split_whitespace() {
                    if !partial.is_empty() {
                        partial.push(' ');
                    }
                    partial.push_str(word);
                    tokio::time::sleep(delay).await;
                    yield TranscriptEvent { is_final: false, text: partial.clone() };
                }
                tokio::time::sleep(delay).await;
                yield TranscriptEvent { is_final: true, text: partial };
            }
        }
        .boxed()
    }
}

// --- Sentiment ---

/// Loudness-based stand-in: quiet chunks are "unavailable", moderate ones
/// read positive, loud ones negative.
pub struct LevelSentiment;

impl SentimentAnalyzer for LevelSentiment {
    fn analyze(&self, chunk: &AudioChunk) -> Result<SentimentReading> {
        if chunk.samples.is_empty() {
            return Ok(SentimentReading::unavailable());
        }
        let mean_square: f32 =
            chunk.samples.iter().map(|s| s * s).sum::<f32>() / chunk.samples.len() as f32;
        let rms = mean_square.sqrt();
        let reading = if rms > 0.5 {
            SentimentReading {
                label: SentimentLabel::Negative,
                confidence: 0.9,
            }
        } else if rms > 0.1 {
            SentimentReading {
                label: SentimentLabel::Positive,
                confidence: 0.7,
            }
        } else {
            SentimentReading::unavailable()
        };
        Ok(reading)
    }
}

// --- Audio capture ---

pub struct SimCapture {
    /// Peak amplitude of the generated signal.
    pub amplitude: f32,
    active: Arc<AtomicBool>,
}

impl SimCapture {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn active_handle(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }
}

struct SimStream {
    amplitude: f32,
    phase: f32,
    active: Arc<AtomicBool>,
}

impl CaptureStream for SimStream {
    fn drain(&mut self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(512);
        for _ in 0..512 {
            self.phase += 0.07;
            samples.push(self.phase.sin() * self.amplitude);
        }
        samples
    }

    fn release(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl AudioCapture for SimCapture {
    fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
        self.active.store(true, Ordering::SeqCst);
        Ok(Box::new(SimStream {
            amplitude: self.amplitude,
            phase: 0.0,
            active: self.active.clone(),
        }))
    }
}

// --- Renderer ---

/// Tallies what the session presents; the demo prints the totals.
#[derive(Clone, Default)]
pub struct RenderTally {
    pub frames: Arc<AtomicUsize>,
    pub last_points: Arc<AtomicUsize>,
    pub last_glyphs: Arc<AtomicUsize>,
    pub last_memories: Arc<AtomicUsize>,
    pub retired: Arc<Mutex<Vec<u64>>>,
}

pub struct TallyRenderer {
    pub tally: RenderTally,
}

impl RenderSurface for TallyRenderer {
    fn present(&mut self, points: &[FieldPoint], glyphs: &[GlyphSprite], memories: &[Placement]) {
        self.tally.frames.fetch_add(1, Ordering::SeqCst);
        self.tally.last_points.store(points.len(), Ordering::SeqCst);
        self.tally.last_glyphs.store(glyphs.len(), Ordering::SeqCst);
        self.tally
            .last_memories
            .store(memories.len(), Ordering::SeqCst);
    }

    fn retire_glyphs(&mut self, ids: &[u64]) {
        if let Ok(mut retired) = self.tally.retired.lock() {
            retired.extend_from_slice(ids);
        }
    }
}

// --- Demo image ---

/// Radial test image: bright center fading to a dark rim, fully opaque.
pub fn radial_image(size: u32) -> std::result::Result<PixelImage, rev_core::SampleError> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    let half = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - half;
            let dy = y as f32 - half;
            let d = ((dx * dx + dy * dy).sqrt() / half).min(1.0);
            let v = (255.0 * (1.0 - d)) as u8;
            rgba.extend_from_slice(&[v, (v / 2).saturating_add(60), 200u8.saturating_sub(v / 2), 255]);
        }
    }
    PixelImage::new(size, size, rgba)
}
