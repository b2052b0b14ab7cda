//! The cooperative runtime: three cadences over one scene.
//!
//! The caller drives the render tick and the detection poll from its own
//! loops; recording spawns two background tasks (audio chunk rotation and
//! the speech session) whose results land on the event queue and are
//! applied on the next render tick. Nothing here blocks the render path,
//! and nothing panics across the tick boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use rev_core::time::now_unix_millis;
use rev_core::{
    CoreEvent, EventQueue, GestureClassifier, LifecycleEngine, PixelImage, Placement, SceneState,
    apply_search, layout_memories, sample_field,
};

use crate::collab::{
    AudioCapture, AudioChunk, GlyphSprite, LandmarkDetector, RenderSurface, SentimentAnalyzer,
    SpeechEngine, VideoFrame,
};
use crate::error::Result;
use crate::recorder::CaptureGuard;

/// Lock a mutex, recovering the data from a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SessionConfig {
    /// Target point count per sampled cloud.
    pub cloud_points: usize,
    /// Rotation period of the audio chunk buffer.
    pub chunk_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cloud_points: 2_000,
            chunk_period: Duration::from_secs(4),
        }
    }
}

struct Recording {
    cancel: CancellationToken,
    guard: Arc<Mutex<CaptureGuard>>,
    tasks: Vec<JoinHandle<()>>,
}

pub struct Session {
    pub state: SceneState,
    engine: LifecycleEngine,
    classifier: GestureClassifier,
    queue: Arc<Mutex<EventQueue>>,
    config: SessionConfig,
    detector: Box<dyn LandmarkDetector>,
    renderer: Box<dyn RenderSurface>,
    speech: Arc<Mutex<Box<dyn SpeechEngine>>>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    capture: Box<dyn AudioCapture>,
    recording: Option<Recording>,
    sample_generation: Arc<AtomicU64>,
    placements: Vec<Placement>,
    has_matches: bool,
    last_query: String,
    last_memory_count: usize,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        detector: Box<dyn LandmarkDetector>,
        renderer: Box<dyn RenderSurface>,
        speech: Box<dyn SpeechEngine>,
        sentiment: Arc<dyn SentimentAnalyzer>,
        capture: Box<dyn AudioCapture>,
    ) -> Self {
        Self {
            state: SceneState::new(),
            engine: LifecycleEngine::new(),
            classifier: GestureClassifier::new(),
            queue: Arc::new(Mutex::new(EventQueue::new())),
            config,
            detector,
            renderer,
            speech: Arc::new(Mutex::new(speech)),
            sentiment,
            capture,
            recording: None,
            sample_generation: Arc::new(AtomicU64::new(0)),
            placements: Vec::new(),
            has_matches: false,
            last_query: String::new(),
            last_memory_count: 0,
        }
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn has_matches(&self) -> bool {
        self.has_matches
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The shared event queue, for collaborators that push results directly.
    pub fn queue(&self) -> Arc<Mutex<EventQueue>> {
        self.queue.clone()
    }

    // --- Detection cadence ---

    /// One detector poll. A detector error degrades to "no hand" and never
    /// propagates into the caller's loop. Writes the gesture state
    /// wholesale (this is the single writer).
    pub fn poll_detection(&mut self, frame: &VideoFrame) {
        let landmarks = match self.detector.detect(frame, frame.timestamp_ms) {
            Ok(result) => result,
            Err(e) => {
                warn!("detector error, degrading to no-hand: {e}");
                None
            }
        };
        self.state.gesture = self.classifier.classify(landmarks.as_ref(), frame.timestamp_ms);
    }

    // --- Render cadence ---

    /// One render tick: drain collaborator events, advance the engines,
    /// refresh search and layout if their inputs changed, present.
    pub fn render_tick(&mut self, dt_ms: f64) {
        {
            let mut queue = lock(&self.queue);
            queue.drain_into(&mut self.state, &mut self.engine);
        }

        self.engine.advance(&mut self.state, dt_ms);

        let evicted = std::mem::take(&mut self.state.evicted_glyphs);
        if !evicted.is_empty() {
            self.renderer.retire_glyphs(&evicted);
        }

        self.refresh_search();

        let sprites: Vec<GlyphSprite> = self
            .engine
            .glyphs()
            .iter()
            .map(|g| GlyphSprite {
                id: g.id,
                character: g.character,
                position: g.position,
                scale: g.scale,
            })
            .collect();
        self.renderer
            .present(self.state.cloud.points(), &sprites, &self.placements);
    }

    /// Search and layout only recompute when the query or the memory set
    /// changed, so the gallery stays put between edits.
    fn refresh_search(&mut self) {
        let query_changed = self.state.transcript != self.last_query;
        let set_changed = self.state.memories.len() != self.last_memory_count;
        if !query_changed && !set_changed {
            return;
        }
        self.last_query = self.state.transcript.clone();
        self.last_memory_count = self.state.memories.len();
        self.has_matches = apply_search(&mut self.state.memories, &self.last_query);
        self.placements = layout_memories(&self.state.memories, self.has_matches);
    }

    // --- Image loading ---

    /// Sample a newly loaded image off the render path. Sampling always
    /// runs to completion; a stale result loses against a newer request's
    /// generation when the event is applied.
    pub fn load_image(&mut self, reference: &str, image: PixelImage) {
        self.state.source_image = reference.to_string();
        let generation = self.sample_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let queue = self.queue.clone();
        let target = self.config.cloud_points;
        tokio::task::spawn_blocking(move || {
            let mut rng = SmallRng::from_os_rng();
            let points = sample_field(&image, target, &mut rng);
            lock(&queue).push(CoreEvent::CloudSampled { points, generation });
        });
    }

    // --- Memory operations ---

    pub fn save_memory(&mut self) -> Uuid {
        self.state.save_memory(now_unix_millis())
    }

    /// Restore a saved memory: reset the scene, respawn its transcript
    /// once, and hand back the image reference for the caller to decode
    /// and reload.
    pub fn restore_memory(&mut self, id: Uuid) -> Option<String> {
        let memory = self.state.memory(id)?;
        let transcript = memory.transcript.clone();
        let image_ref = memory.source_image.clone();

        self.engine.reset();
        let report = self.engine.ingest_transcript(&transcript, true);
        self.state.evicted_glyphs.extend(report.evicted);
        self.state.transcript = transcript;
        self.state.source_image = image_ref.clone();
        Some(image_ref)
    }

    pub fn set_reading_mode(&mut self, on: bool) {
        self.state.reading_mode = on;
    }

    // --- Recording lifecycle ---

    /// Acquire the microphone and start the chunk-rotation and speech
    /// tasks. A second call while recording is a no-op.
    pub fn start_recording(&mut self) -> Result<()> {
        if self.recording.is_some() {
            return Ok(());
        }
        let stream = self.capture.acquire()?;
        let guard = Arc::new(Mutex::new(CaptureGuard::new(stream)));
        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        // Chunk rotation: seal the buffer each period and dispatch it to
        // the sentiment collaborator without touching the render path.
        {
            let guard = guard.clone();
            let queue = self.queue.clone();
            let analyzer = self.sentiment.clone();
            let cancel = cancel.clone();
            let period = self.config.chunk_period;
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await; // the immediate first tick
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                    let samples = lock(&guard).drain();
                    if samples.is_empty() {
                        continue;
                    }
                    let chunk = AudioChunk {
                        samples,
                        sealed_at_ms: now_unix_millis(),
                    };
                    match analyzer.analyze(&chunk) {
                        Ok(reading) => lock(&queue).push(CoreEvent::Sentiment {
                            label: reading.label,
                            confidence: reading.confidence,
                        }),
                        Err(e) => warn!("sentiment analysis failed, keeping previous label: {e}"),
                    }
                }
            }));
        }

        // Speech session. While recording, a terminated session reopens,
        // keeping at least one listening session alive.
        {
            let speech = self.speech.clone();
            let queue = self.queue.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    let mut events = lock(&speech).open_session();
                    loop {
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            event = events.next() => match event {
                                Some(ev) => {
                                    let mut queue = lock(&queue);
                                    if ev.is_final {
                                        queue.push(CoreEvent::TranscriptFinal {
                                            text: ev.text,
                                            timestamp_ms: now_unix_millis(),
                                        });
                                    } else {
                                        queue.push(CoreEvent::TranscriptInterim { text: ev.text });
                                    }
                                }
                                None => break,
                            }
                        }
                    }
                    if cancel.is_cancelled() {
                        return;
                    }
                    debug!("speech session ended while recording; restarting");
                }
            }));
        }

        self.recording = Some(Recording {
            cancel,
            guard,
            tasks,
        });
        Ok(())
    }

    /// Synchronously halt the speech session and the chunk timer and
    /// release the audio capture resource. Calling this twice (or while
    /// not recording) is a no-op.
    pub fn stop_recording(&mut self) {
        let Some(recording) = self.recording.take() else {
            return;
        };
        recording.cancel.cancel();
        lock(&recording.guard).release();
        for task in recording.tasks {
            task.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_recording();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use rev_core::{GestureLabel, LandmarkFrame, SentimentLabel};

    use crate::collab::{CaptureStream, SentimentReading, TranscriptEvent};
    use crate::error::SessionError;

    // --- test collaborators ---

    struct NoHandDetector;
    impl LandmarkDetector for NoHandDetector {
        fn detect(&mut self, _: &VideoFrame, _: f64) -> Result<Option<LandmarkFrame>> {
            Ok(None)
        }
    }

    struct FailingDetector;
    impl LandmarkDetector for FailingDetector {
        fn detect(&mut self, _: &VideoFrame, _: f64) -> Result<Option<LandmarkFrame>> {
            Err(SessionError::Detector("decode failure".into()))
        }
    }

    #[derive(Default)]
    struct CollectRenderer {
        presents: Arc<AtomicUsize>,
        retired: Arc<Mutex<Vec<u64>>>,
    }
    impl RenderSurface for CollectRenderer {
        fn present(&mut self, _: &[rev_core::FieldPoint], _: &[GlyphSprite], _: &[Placement]) {
            self.presents.fetch_add(1, Ordering::SeqCst);
        }
        fn retire_glyphs(&mut self, ids: &[u64]) {
            lock(&self.retired).extend_from_slice(ids);
        }
    }

    /// Scripted speech: each open_session plays one script then ends.
    /// Once the scripts run out, sessions stay open silently.
    struct ScriptSpeech {
        scripts: VecDeque<Vec<TranscriptEvent>>,
        opens: Arc<AtomicUsize>,
    }
    impl SpeechEngine for ScriptSpeech {
        fn open_session(&mut self) -> futures_util::stream::BoxStream<'static, TranscriptEvent> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match self.scripts.pop_front() {
                Some(script) => futures_util::stream::iter(script).boxed(),
                None => futures_util::stream::pending().boxed(),
            }
        }
    }

    struct ConstSentiment(SentimentLabel, f32);
    impl SentimentAnalyzer for ConstSentiment {
        fn analyze(&self, _: &AudioChunk) -> Result<SentimentReading> {
            Ok(SentimentReading {
                label: self.0,
                confidence: self.1,
            })
        }
    }

    struct ProbeCapture {
        active: Arc<AtomicBool>,
        releases: Arc<AtomicUsize>,
    }
    struct ProbeStream {
        active: Arc<AtomicBool>,
        releases: Arc<AtomicUsize>,
    }
    impl CaptureStream for ProbeStream {
        fn drain(&mut self) -> Vec<f32> {
            vec![0.1; 64]
        }
        fn release(&mut self) {
            self.active.store(false, Ordering::SeqCst);
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
    impl AudioCapture for ProbeCapture {
        fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
            self.active.store(true, Ordering::SeqCst);
            Ok(Box::new(ProbeStream {
                active: self.active.clone(),
                releases: self.releases.clone(),
            }))
        }
    }

    struct DeniedCapture;
    impl AudioCapture for DeniedCapture {
        fn acquire(&mut self) -> Result<Box<dyn CaptureStream>> {
            Err(SessionError::CaptureUnavailable("permission denied".into()))
        }
    }

    struct TestRig {
        session: Session,
        opens: Arc<AtomicUsize>,
        mic_active: Arc<AtomicBool>,
        mic_releases: Arc<AtomicUsize>,
        retired: Arc<Mutex<Vec<u64>>>,
    }

    fn rig_with(scripts: Vec<Vec<TranscriptEvent>>, sentiment: ConstSentiment) -> TestRig {
        let opens = Arc::new(AtomicUsize::new(0));
        let mic_active = Arc::new(AtomicBool::new(false));
        let mic_releases = Arc::new(AtomicUsize::new(0));
        let renderer = CollectRenderer::default();
        let retired = renderer.retired.clone();

        let session = Session::new(
            SessionConfig {
                cloud_points: 50,
                chunk_period: Duration::from_millis(20),
            },
            Box::new(NoHandDetector),
            Box::new(renderer),
            Box::new(ScriptSpeech {
                scripts: scripts.into(),
                opens: opens.clone(),
            }),
            Arc::new(sentiment),
            Box::new(ProbeCapture {
                active: mic_active.clone(),
                releases: mic_releases.clone(),
            }),
        );
        TestRig {
            session,
            opens,
            mic_active,
            mic_releases,
            retired,
        }
    }

    fn interim(text: &str) -> TranscriptEvent {
        TranscriptEvent {
            is_final: false,
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn test_stop_recording_releases_and_is_idempotent() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Neutral, 0.5));
        rig.session.start_recording().unwrap();
        assert!(rig.session.is_recording());
        assert!(rig.mic_active.load(Ordering::SeqCst));

        rig.session.stop_recording();
        assert!(!rig.session.is_recording());
        assert!(!rig.mic_active.load(Ordering::SeqCst));

        rig.session.stop_recording();
        assert_eq!(rig.mic_releases.load(Ordering::SeqCst), 1, "double stop is a no-op");
    }

    #[tokio::test]
    async fn test_start_twice_keeps_one_stream() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Neutral, 0.5));
        rig.session.start_recording().unwrap();
        rig.session.start_recording().unwrap();
        rig.session.stop_recording();
        assert_eq!(rig.mic_releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_microphone_is_not_fatal() {
        let mut session = Session::new(
            SessionConfig::default(),
            Box::new(NoHandDetector),
            Box::new(CollectRenderer::default()),
            Box::new(ScriptSpeech {
                scripts: VecDeque::new(),
                opens: Arc::new(AtomicUsize::new(0)),
            }),
            Arc::new(ConstSentiment(SentimentLabel::Neutral, 0.5)),
            Box::new(DeniedCapture),
        );
        assert!(session.start_recording().is_err());
        assert!(!session.is_recording());
        // the scene still ticks
        session.render_tick(16.0);
    }

    #[tokio::test]
    async fn test_speech_events_reach_the_transcript() {
        let mut rig = rig_with(
            vec![vec![interim("hello")]],
            ConstSentiment(SentimentLabel::Neutral, 0.5),
        );
        rig.session.start_recording().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        rig.session.render_tick(16.0);
        assert_eq!(rig.session.state.transcript, "hello");
        assert_eq!(rig.session.engine().glyph_count(), 5);
        rig.session.stop_recording();
    }

    #[tokio::test]
    async fn test_terminated_speech_session_restarts() {
        // first session closes immediately; the runtime must reopen
        let mut rig = rig_with(
            vec![vec![], vec![interim("back")]],
            ConstSentiment(SentimentLabel::Neutral, 0.5),
        );
        rig.session.start_recording().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        rig.session.render_tick(16.0);
        assert!(
            rig.opens.load(Ordering::SeqCst) >= 2,
            "a dead session must be reopened while recording"
        );
        assert_eq!(rig.session.state.transcript, "back");
        rig.session.stop_recording();
    }

    #[tokio::test]
    async fn test_chunk_rotation_feeds_sentiment() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Negative, 0.9));
        rig.session.start_recording().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        rig.session.render_tick(16.0);
        assert_eq!(rig.session.state.sentiment, SentimentLabel::Negative);
        assert!(rig.session.state.disruption > 0.9);
        rig.session.stop_recording();
    }

    #[tokio::test]
    async fn test_newest_image_wins() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Neutral, 0.5));
        let first = PixelImage::solid(16, 16, [255, 0, 0, 255]).unwrap();
        let second = PixelImage::solid(16, 16, [0, 0, 255, 255]).unwrap();
        rig.session.load_image("img-1", first);
        rig.session.load_image("img-2", second);
        tokio::time::sleep(Duration::from_millis(100)).await;
        rig.session.render_tick(16.0);
        assert_eq!(rig.session.state.cloud_generation, 2);
        assert_eq!(rig.session.state.source_image, "img-2");
        assert!(!rig.session.state.cloud.is_empty());
    }

    #[tokio::test]
    async fn test_detector_failure_degrades_to_idle() {
        let mut session = Session::new(
            SessionConfig::default(),
            Box::new(FailingDetector),
            Box::new(CollectRenderer::default()),
            Box::new(ScriptSpeech {
                scripts: VecDeque::new(),
                opens: Arc::new(AtomicUsize::new(0)),
            }),
            Arc::new(ConstSentiment(SentimentLabel::Neutral, 0.5)),
            Box::new(DeniedCapture),
        );
        session.poll_detection(&VideoFrame {
            data: Vec::new(),
            timestamp_ms: 0.0,
        });
        assert!(!session.state.gesture.detected);
        assert_eq!(session.state.gesture.label, GestureLabel::Idle);
    }

    #[tokio::test]
    async fn test_eviction_retires_render_handles() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Neutral, 0.5));
        let long = "x".repeat(600);
        lock(&rig.session.queue()).push(CoreEvent::TranscriptInterim { text: long });
        rig.session.render_tick(16.0);
        assert_eq!(rig.session.engine().glyph_count(), rev_core::GLYPH_CAP);
        assert_eq!(lock(&rig.retired).len(), 100);
    }

    #[tokio::test]
    async fn test_search_layout_refreshes_on_transcript_change() {
        let mut rig = rig_with(vec![], ConstSentiment(SentimentLabel::Neutral, 0.5));
        rig.session.state.source_image = "img".into();
        lock(&rig.session.queue()).push(CoreEvent::TranscriptInterim {
            text: "sunset at the beach".into(),
        });
        rig.session.render_tick(16.0);
        rig.session.save_memory();
        rig.session.render_tick(16.0);
        assert_eq!(rig.session.placements().len(), 1);

        // a new spoken query re-scores and re-lays-out
        lock(&rig.session.queue()).push(CoreEvent::TranscriptFinal {
            text: "sunset at the beach".into(),
            timestamp_ms: 1,
        });
        lock(&rig.session.queue()).push(CoreEvent::TranscriptInterim {
            text: "sunset".into(),
        });
        rig.session.render_tick(16.0);
        assert!(rig.session.has_matches());
        assert_eq!(rig.session.placements()[0].position.x, 0.0);
    }
}
