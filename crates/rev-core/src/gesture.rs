//! Per-frame hand gesture classification from landmark geometry.
//!
//! Consumes one landmark frame per detector poll and produces a
//! [`GestureState`] that is overwritten wholesale, so callers never observe
//! a partially updated frame. Pointer velocity is derived from consecutive
//! polls and resets across detection gaps.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLOSED_FINGER_MAX, OPEN_FINGER_MIN, PALM_NORMAL_MIN, PINCH_DISTANCE, SWIPE_SPEED_MIN,
    TIP_ABOVE_JOINT, TIP_ABOVE_WRIST,
};
use crate::vector::{Vec2, Vec3};

/// Number of tracked landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices in the detector's fixed anatomical order.
pub mod landmark {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// One frame of hand landmarks in normalized image coordinates
/// (x, y in [0, 1] with y growing downward; z is relative depth).
#[derive(Clone, Debug)]
pub struct LandmarkFrame {
    pub points: [Vec3; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    fn at(&self, idx: usize) -> Vec3 {
        self.points[idx]
    }
}

/// Discrete gesture classification of a single hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GestureLabel {
    Open,
    Closed,
    Swipe,
    Pinch,
    #[default]
    Idle,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Swipe => "swipe",
            Self::Pinch => "pinch",
            Self::Idle => "idle",
        }
    }
}

/// Continuous hand rotation: roll in the image plane, tilt out of it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandRotation {
    pub roll: f32,
    pub tilt: f32,
}

/// Full classifier output for one poll. Replaced atomically each poll.
#[derive(Clone, Debug, Default)]
pub struct GestureState {
    pub label: GestureLabel,
    pub detected: bool,
    /// Wrist position (normalized image space).
    pub position: Vec3,
    /// Mean of the wrist and knuckle landmarks.
    pub palm_center: Vec2,
    /// Index fingertip position.
    pub pointer: Vec2,
    /// Pointer velocity in normalized units per second.
    pub pointer_velocity: Vec2,
    pub rotation: HandRotation,
    pub pinch_distance: f32,
}

impl GestureState {
    /// The no-hand state: `detected == false` forces `label == Idle`.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// The four non-thumb fingertip/proximal-joint pairs used for the
/// extended-finger count.
const FINGER_PAIRS: [(usize, usize); 4] = [
    (landmark::INDEX_TIP, landmark::INDEX_PIP),
    (landmark::MIDDLE_TIP, landmark::MIDDLE_PIP),
    (landmark::RING_TIP, landmark::RING_PIP),
    (landmark::PINKY_TIP, landmark::PINKY_PIP),
];

/// Stateful classifier. Holds only the previous pointer sample, which is
/// what velocity needs; everything else is recomputed from scratch.
#[derive(Debug, Default)]
pub struct GestureClassifier {
    prev_pointer: Option<(Vec2, f64)>,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one poll. `None` (no hand, or a detector failure already
    /// degraded upstream) yields the idle state and clears the cached
    /// pointer so no velocity carries across the gap.
    pub fn classify(&mut self, frame: Option<&LandmarkFrame>, now_ms: f64) -> GestureState {
        let Some(frame) = frame else {
            self.prev_pointer = None;
            return GestureState::idle();
        };

        let wrist = frame.at(landmark::WRIST);
        let pointer = frame.at(landmark::INDEX_TIP).xy();

        let velocity = match self.prev_pointer {
            Some((prev, prev_ms)) if now_ms > prev_ms => {
                let dt_s = ((now_ms - prev_ms) / 1000.0) as f32;
                (pointer - prev) * (1.0 / dt_s)
            }
            _ => Vec2::ZERO,
        };
        self.prev_pointer = Some((pointer, now_ms));

        let extended: Vec<bool> = FINGER_PAIRS
            .iter()
            .map(|&(tip, pip)| finger_extended(frame, tip, pip, wrist))
            .collect();
        let extended_count = extended.iter().filter(|e| **e).count();

        let palm_normal = palm_normal(frame, wrist);
        let pinch = frame.at(landmark::THUMB_TIP).distance(frame.at(landmark::INDEX_TIP));
        let speed = velocity.length();

        let label = if pinch < PINCH_DISTANCE {
            GestureLabel::Pinch
        } else if extended_count >= OPEN_FINGER_MIN {
            GestureLabel::Open
        } else if extended_count <= CLOSED_FINGER_MAX && palm_normal.abs() > PALM_NORMAL_MIN {
            GestureLabel::Closed
        } else if extended_count == 1 && speed > SWIPE_SPEED_MIN && extended[0] {
            GestureLabel::Swipe
        } else {
            GestureLabel::Idle
        };

        GestureState {
            label,
            detected: true,
            position: wrist,
            palm_center: palm_center(frame, wrist),
            pointer,
            pointer_velocity: velocity,
            rotation: hand_rotation(frame, wrist),
            pinch_distance: pinch,
        }
    }
}

/// A finger is extended when its tip sits above the wrist and above its own
/// proximal joint (image y grows downward).
fn finger_extended(frame: &LandmarkFrame, tip: usize, pip: usize, wrist: Vec3) -> bool {
    let tip_y = frame.at(tip).y;
    tip_y < wrist.y - TIP_ABOVE_WRIST && tip_y < frame.at(pip).y - TIP_ABOVE_JOINT
}

/// Palm-normal proxy: z of the cross product of wrist→index-knuckle and
/// wrist→pinky-knuckle. The sign flips with palm orientation.
fn palm_normal(frame: &LandmarkFrame, wrist: Vec3) -> f32 {
    let to_index = frame.at(landmark::INDEX_MCP).xy() - wrist.xy();
    let to_pinky = frame.at(landmark::PINKY_MCP).xy() - wrist.xy();
    to_index.cross(to_pinky)
}

fn palm_center(frame: &LandmarkFrame, wrist: Vec3) -> Vec2 {
    let knuckles = [
        landmark::INDEX_MCP,
        landmark::MIDDLE_MCP,
        landmark::RING_MCP,
        landmark::PINKY_MCP,
    ];
    let mut sum = wrist.xy();
    for k in knuckles {
        sum = sum + frame.at(k).xy();
    }
    sum * (1.0 / (knuckles.len() + 1) as f32)
}

/// Roll is the in-plane angle of wrist→middle-knuckle; tilt is that
/// vector's elevation out of the image plane.
fn hand_rotation(frame: &LandmarkFrame, wrist: Vec3) -> HandRotation {
    let spine = frame.at(landmark::MIDDLE_MCP) - wrist;
    let planar = spine.xy().length();
    HandRotation {
        roll: spine.y.atan2(spine.x),
        tilt: spine.z.atan2(planar),
    }
}
