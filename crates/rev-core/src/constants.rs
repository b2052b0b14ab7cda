/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f32 = 1e-6;

/// Golden angle in radians: 2π / φ²
pub const GOLDEN_ANGLE: f32 = 2.399_963_3;

/// Half-width of the world-space plane the sampled image maps onto
pub const CLOUD_EXTENT: f32 = 8.0;

// --- Gesture classification ---

/// Thumb-tip to index-tip distance below which the pose is a pinch
/// (normalized image units)
pub const PINCH_DISTANCE: f32 = 0.08;

/// A fingertip must sit this far above the wrist to count as extended
/// (image-space y grows downward, so "above" means smaller y)
pub const TIP_ABOVE_WRIST: f32 = 0.10;

/// A fingertip must also sit this far above its proximal joint
pub const TIP_ABOVE_JOINT: f32 = 0.02;

/// Minimum magnitude of the palm-normal cross product for a closed fist
pub const PALM_NORMAL_MIN: f32 = 0.01;

/// Minimum pointer speed for a swipe (normalized units per second)
pub const SWIPE_SPEED_MIN: f32 = 0.9;

/// Extended-finger count at or above which the hand reads as open
pub const OPEN_FINGER_MIN: usize = 4;

/// Extended-finger count at or below which the hand can read as closed
pub const CLOSED_FINGER_MAX: usize = 1;

// --- Field sampling ---

/// Exponent of the center-distance falloff in the keep probability
pub const FALLOFF_EXPONENT: f32 = 1.5;

/// Floor of the keep probability; keeps the image periphery sparse, not empty
pub const BASE_KEEP_CHANCE: f32 = 0.15;

/// Pixels at or below this alpha are treated as transparent
pub const ALPHA_FLOOR: u8 = 8;

/// Sampling gives up after this many attempts per requested point
pub const ATTEMPT_FACTOR: usize = 200;

/// Depth of the darkest accepted pixel (farthest from the viewer)
pub const DEPTH_FAR: f32 = -1.6;

/// Depth span from darkest to brightest; brighter pixels sit closer
pub const DEPTH_RANGE: f32 = 3.2;

// --- Glyph life cycle (milliseconds) ---

/// Time a glyph holds near the bottom of the scene before flying
pub const HOLD_DURATION_MS: f64 = 3_500.0;

/// Per-character flight start delay so a phrase visibly cascades
pub const STAGGER_MS: f64 = 80.0;

/// Nominal flight duration along the Bézier arc
pub const FLIGHT_MS: f64 = 2_500.0;

/// Hard ceiling on flight wall time; the phase completes even if the
/// render loop stalls
pub const FLIGHT_TIMEOUT_MS: f64 = 4_000.0;

/// Live glyph cap; oldest are evicted FIFO past this
pub const GLYPH_CAP: usize = 500;

/// Per-tick timestep clamp so stalls don't teleport particles
pub const MAX_TICK_MS: f64 = 100.0;

// --- Hold line ---

/// Hold-line origin height (bottom of the scene)
pub const HOLD_HEIGHT: f32 = -3.2;

/// Hold-line depth, slightly toward the viewer
pub const HOLD_DEPTH: f32 = 1.5;

/// Horizontal spacing between held characters
pub const HOLD_CHAR_SPACING: f32 = 0.25;

/// Characters per hold line before the x offset wraps
pub const HOLD_LINE_CHARS: u64 = 40;

// --- Dock rings (orbit shells) ---

/// Glyphs per ring before the next shell opens
pub const RING_CAPACITY: u64 = 24;

/// Radius of the innermost ring
pub const RING_RADIUS: f32 = 5.5;

/// Radius added per shell
pub const RING_RADIUS_STEP: f32 = 1.1;

/// Height of the innermost ring
pub const RING_HEIGHT: f32 = 2.2;

/// Height added per shell
pub const RING_HEIGHT_STEP: f32 = 0.6;

/// Angular offset between successive shells so slots don't stack visually
pub const RING_TWIST: f32 = 0.13;

/// Slow revolution of docked glyphs about the vertical axis (rad/s)
pub const DOCK_SPIN_RATE: f32 = 0.05;

/// Per-character sinusoidal bob amplitude
pub const BOB_AMPLITUDE: f32 = 0.12;

/// Bob angular rate (rad/s)
pub const BOB_RATE: f32 = 1.7;

/// Bézier control-point lift above the dock target
pub const CONTROL_LIFT: f32 = 2.0;

/// Bézier control-point push along the dock radial
pub const CONTROL_PUSH: f32 = 1.2;

// --- Easing rates (per-second exponential) ---

/// Ease toward the hold target during spawn
pub const EASE_SPAWN: f32 = 4.0;

/// Ambient ease toward the dock target
pub const EASE_DOCK: f32 = 1.8;

/// Faster ease while a closed fist gathers the ring
pub const EASE_GATHER: f32 = 5.0;

/// Ease of ambient field points toward their per-tick targets
pub const EASE_FIELD: f32 = 2.5;

// --- Gesture perturbation of docked glyphs ---

/// Open hand pushes dock targets radially outward
pub const OPEN_PUSH_OUT: f32 = 2.4;

/// Open hand pushes dock targets back in depth
pub const OPEN_PUSH_BACK: f32 = 1.2;

/// Swipe repulsion radius around the pointer
pub const SWIPE_RADIUS: f32 = 3.0;

/// Swipe repulsion strength (scaled by 1/distance)
pub const SWIPE_FORCE: f32 = 1.6;

/// Closed fist gathers dock targets to this fraction of their radius
pub const GATHER_SCALE: f32 = 0.5;

// --- Ambient field ---

/// Calm-state surface ripple amplitude
pub const RIPPLE_AMPLITUDE: f32 = 0.06;

/// Ripple angular rate (rad/s)
pub const RIPPLE_RATE: f32 = 0.9;

/// Ripple spatial frequency (rad per world unit)
pub const RIPPLE_FREQUENCY: f32 = 0.6;

/// Points beyond this fraction of the cloud radius drift on curl noise
pub const EDGE_FRACTION: f32 = 0.8;

/// Curl noise field frequency
pub const CURL_SCALE: f32 = 0.35;

/// Curl noise drift strength
pub const CURL_STRENGTH: f32 = 0.5;

/// Scatter blend chase rate while engaging (per second)
pub const DISRUPTION_RISE: f32 = 3.0;

/// Scatter blend chase rate while relaxing; slower, so the cloud settles
pub const DISRUPTION_FALL: f32 = 0.6;

/// Decay of the disruption drive itself (per second)
pub const DISRUPTION_DECAY: f32 = 0.25;

/// Radial expansion of a fully scattered point
pub const SCATTER_EXPAND: f32 = 1.8;

/// Noise offset of a fully scattered point
pub const SCATTER_JITTER: f32 = 1.4;

/// Reading mode pushes ambient points back by this depth
pub const READING_PUSH_BACK: f32 = 2.6;

/// Reading mode jitter amplitude
pub const READING_JITTER: f32 = 0.05;

// --- Memory search ---

/// Fraction of keywords that must hit for a score of 1.0
pub const SCORE_KEYWORD_FACTOR: f32 = 0.5;

// --- Memory layout ---

/// Horizontal spacing between focused slots
pub const FOCUS_SPACING: f32 = 2.2;

/// Depth of slot 0, the best match
pub const FOCUS_DEPTH: f32 = -4.0;

/// Each step away from slot 0 recedes by this much
pub const FOCUS_DEPTH_STEP: f32 = 0.35;

/// Height of slot 0
pub const FOCUS_HEIGHT: f32 = 0.8;

/// Each step away from slot 0 drops by this much
pub const FOCUS_HEIGHT_STEP: f32 = 0.25;

/// Near edge of the deep background band for non-matching memories
pub const BACKGROUND_DEPTH: f32 = -14.0;

/// Depth span of the background band
pub const BACKGROUND_DEPTH_SPAN: f32 = 6.0;

/// Minimum background scatter radius
pub const BACKGROUND_RADIUS: f32 = 6.0;

/// Background scatter radius span
pub const BACKGROUND_RADIUS_SPAN: f32 = 8.0;

/// Gallery spiral starting radius
pub const GALLERY_RADIUS: f32 = 2.0;

/// Gallery spiral radius growth per memory
pub const GALLERY_RADIUS_STEP: f32 = 0.45;

/// Gallery plane depth
pub const GALLERY_DEPTH: f32 = -6.0;
