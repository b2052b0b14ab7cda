//! Glyph particles: one animated character per piece of transcribed speech.
//!
//! Each glyph moves through a strictly monotonic life cycle of
//! spawn (hold near the bottom), fly (a Bézier arc), and dock (orbit
//! shell), with phase-specific state carried in the [`GlyphPhase`]
//! variant, so a phase can never observe fields of another phase.

use std::f32::consts::TAU;

use crate::constants::{
    BOB_AMPLITUDE, BOB_RATE, CLOUD_EXTENT, CONTROL_LIFT, CONTROL_PUSH, EASE_DOCK, EASE_GATHER,
    EASE_SPAWN, FLIGHT_MS, FLIGHT_TIMEOUT_MS, GATHER_SCALE, HOLD_CHAR_SPACING, HOLD_DEPTH,
    HOLD_DURATION_MS, HOLD_HEIGHT, HOLD_LINE_CHARS, OPEN_PUSH_BACK, OPEN_PUSH_OUT, RING_CAPACITY,
    RING_HEIGHT, RING_HEIGHT_STEP, RING_RADIUS, RING_RADIUS_STEP, RING_TWIST, STAGGER_MS,
    SWIPE_FORCE, SWIPE_RADIUS,
};
use crate::gesture::{GestureLabel, GestureState};
use crate::vector::{Vec2, Vec3, quadratic_bezier};

/// Phase-tagged animation state. Only forward transitions exist.
#[derive(Clone, Copy, Debug)]
pub enum GlyphPhase {
    /// Easing toward a hold slot near the bottom center of the scene.
    Spawn {
        hold: Vec3,
        born_ms: f64,
        /// Flight start offset once the hold expires; staggered per
        /// character so a phrase cascades.
        delay_ms: f64,
    },
    /// Bézier arc from the hold position to the dock ring.
    Fly { from: Vec3, start_ms: f64 },
    /// Orbiting the assigned ring slot.
    Dock,
}

impl GlyphPhase {
    /// Ordinal for monotonicity checks: spawn 0, fly 1, dock 2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Spawn { .. } => 0,
            Self::Fly { .. } => 1,
            Self::Dock => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Fly { .. } => "fly",
            Self::Dock => "dock",
        }
    }
}

/// Orbit-shell slot assigned at creation from the global running character
/// counter. Successive rings are rotated by a fixed twist so slots in
/// adjacent shells don't stack.
#[derive(Clone, Copy, Debug)]
pub struct DockSlot {
    pub ring: u64,
    pub angle: f32,
    pub radius: f32,
    pub height: f32,
}

impl DockSlot {
    pub fn from_counter(counter: u64) -> Self {
        let ring = counter / RING_CAPACITY;
        let slot = counter % RING_CAPACITY;
        let angle = slot as f32 * (TAU / RING_CAPACITY as f32) + ring as f32 * RING_TWIST;
        Self {
            ring,
            angle,
            radius: RING_RADIUS + ring as f32 * RING_RADIUS_STEP,
            height: RING_HEIGHT + ring as f32 * RING_HEIGHT_STEP,
        }
    }

    /// Slot position revolved `spin` radians about the vertical axis.
    pub fn position(&self, spin: f32) -> Vec3 {
        let a = self.angle + spin;
        Vec3::new(self.radius * a.cos(), self.height, self.radius * a.sin())
    }
}

/// One live character particle. The renderer reads `position`, `scale`,
/// `character`, and the phase; everything else is engine-owned.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub id: u64,
    pub character: char,
    pub position: Vec3,
    pub scale: f32,
    slot: DockSlot,
    bob_phase: f32,
    phase: GlyphPhase,
}

impl Glyph {
    /// `counter` is the global character counter (ring assignment);
    /// `batch_index` is the character's index within its spawn batch
    /// (stagger delay); `born_ms` is the engine clock at creation.
    pub fn new(id: u64, character: char, counter: u64, batch_index: usize, born_ms: f64) -> Self {
        let line_slot = (counter % HOLD_LINE_CHARS) as f32 - HOLD_LINE_CHARS as f32 / 2.0;
        let hold = Vec3::new(line_slot * HOLD_CHAR_SPACING, HOLD_HEIGHT, HOLD_DEPTH);
        Self {
            id,
            character,
            position: Vec3::new(0.0, HOLD_HEIGHT - 1.5, HOLD_DEPTH),
            scale: 0.0,
            slot: DockSlot::from_counter(counter),
            bob_phase: counter as f32 * 0.7,
            phase: GlyphPhase::Spawn {
                hold,
                born_ms,
                delay_ms: batch_index as f64 * STAGGER_MS,
            },
        }
    }

    pub fn phase(&self) -> &GlyphPhase {
        &self.phase
    }

    pub fn is_docked(&self) -> bool {
        matches!(self.phase, GlyphPhase::Dock)
    }

    /// Advance one tick. `clock_ms` is the engine's glyph clock (paused in
    /// reading mode), `spin` the current ring revolution in radians.
    pub fn advance(&mut self, clock_ms: f64, dt_s: f32, spin: f32, gesture: &GestureState) {
        match self.phase {
            GlyphPhase::Spawn {
                hold,
                born_ms,
                delay_ms,
            } => {
                self.position = self.position.ease_toward(hold, EASE_SPAWN, dt_s);
                self.scale += (1.0 - self.scale) * (EASE_SPAWN * dt_s).min(1.0);
                if clock_ms - born_ms >= HOLD_DURATION_MS {
                    self.phase = GlyphPhase::Fly {
                        from: self.position,
                        start_ms: clock_ms + delay_ms,
                    };
                }
            }
            GlyphPhase::Fly { from, start_ms } => {
                self.scale = 1.0;
                if clock_ms < start_ms {
                    return; // stagger: hold in place until this character's turn
                }
                let elapsed = clock_ms - start_ms;
                // The hard timeout forces completion even if the render
                // loop stalled past the nominal flight duration.
                let t = if elapsed >= FLIGHT_TIMEOUT_MS {
                    1.0
                } else {
                    ((elapsed / FLIGHT_MS).min(1.0)) as f32
                };
                let eased = t * t * (3.0 - 2.0 * t);
                let dock = self.slot.position(spin);
                let control = flight_control(from, dock);
                self.position = quadratic_bezier(from, control, dock, eased);
                if t >= 1.0 {
                    self.phase = GlyphPhase::Dock;
                }
            }
            GlyphPhase::Dock => {
                let clock_s = (clock_ms / 1000.0) as f32;
                let bob = (clock_s * BOB_RATE + self.bob_phase).sin() * BOB_AMPLITUDE;
                let mut target = self.slot.position(spin) + Vec3::new(0.0, bob, 0.0);

                let mut rate = EASE_DOCK;
                match gesture.label {
                    GestureLabel::Open => {
                        let out = target.flat().normalize();
                        target += out * OPEN_PUSH_OUT + Vec3::new(0.0, 0.0, -OPEN_PUSH_BACK);
                    }
                    GestureLabel::Swipe => {
                        let pointer = pointer_world(gesture);
                        let delta = Vec2::new(target.x - pointer.x, target.y - pointer.y);
                        let dist = delta.length();
                        if dist < SWIPE_RADIUS {
                            let dir = if dist > 1e-4 {
                                delta * (1.0 / dist)
                            } else {
                                Vec2::new(1.0, 0.0)
                            };
                            let push = SWIPE_FORCE / dist.max(0.3);
                            target += Vec3::new(dir.x, dir.y, 0.0) * push;
                        }
                    }
                    GestureLabel::Closed => {
                        target = target * GATHER_SCALE;
                        rate = EASE_GATHER;
                    }
                    _ => {}
                }

                self.position = self.position.ease_toward(target, rate, dt_s);
            }
        }
    }
}

/// Bézier control point above and in front of the dock target.
fn flight_control(from: Vec3, dock: Vec3) -> Vec3 {
    let mid = from.lerp(dock, 0.5);
    let radial = dock.flat().normalize();
    Vec3::new(mid.x, dock.y + CONTROL_LIFT, mid.z) + radial * CONTROL_PUSH
}

/// Map the normalized image-space pointer onto the world-space cloud plane.
fn pointer_world(gesture: &GestureState) -> Vec3 {
    Vec3::new(
        (gesture.pointer.x - 0.5) * 2.0 * CLOUD_EXTENT,
        (0.5 - gesture.pointer.y) * 2.0 * CLOUD_EXTENT,
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> GestureState {
        GestureState::idle()
    }

    /// Drive a glyph with a fixed 16 ms tick until `clock_ms`.
    fn run_until(glyph: &mut Glyph, clock_ms: &mut f64, until_ms: f64, gesture: &GestureState) {
        while *clock_ms < until_ms {
            *clock_ms += 16.0;
            let spin = (*clock_ms / 1000.0) as f32 * crate::constants::DOCK_SPIN_RATE;
            glyph.advance(*clock_ms, 0.016, spin, gesture);
        }
    }

    #[test]
    fn test_spawn_eases_to_hold() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, 2_000.0, &idle());
        assert_eq!(g.phase().name(), "spawn");
        let GlyphPhase::Spawn { hold, .. } = *g.phase() else {
            unreachable!()
        };
        assert!(g.position.distance(hold) < 0.05, "should settle at hold");
        assert!(g.scale > 0.99);
    }

    #[test]
    fn test_phase_sequence_is_monotonic() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        let mut last_rank = g.phase().rank();
        while clock < 12_000.0 {
            clock += 16.0;
            g.advance(clock, 0.016, 0.0, &idle());
            let rank = g.phase().rank();
            assert!(rank >= last_rank, "phase regressed: {rank} < {last_rank}");
            last_rank = rank;
        }
        assert_eq!(g.phase().name(), "dock");
    }

    #[test]
    fn test_stagger_delays_flight() {
        let mut early = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut late = Glyph::new(1, 'b', 1, 10, 0.0);
        let mut clock = 0.0;
        // both leave Spawn at the hold deadline, but the staggered one
        // waits out its delay inside Fly
        while clock < HOLD_DURATION_MS + 200.0 {
            clock += 16.0;
            early.advance(clock, 0.016, 0.0, &idle());
            late.advance(clock, 0.016, 0.0, &idle());
        }
        let GlyphPhase::Fly { start_ms: s0, .. } = *early.phase() else {
            panic!("early glyph should be flying");
        };
        let GlyphPhase::Fly { start_ms: s1, .. } = *late.phase() else {
            panic!("late glyph should be flying");
        };
        assert!(
            s1 - s0 >= 10.0 * STAGGER_MS - 32.0,
            "stagger should offset flight starts: {s0} vs {s1}"
        );
    }

    #[test]
    fn test_flight_completes_by_timeout_despite_stall() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, HOLD_DURATION_MS + 100.0, &idle());
        assert_eq!(g.phase().name(), "fly");
        // one enormous stalled frame; the clamped dt doesn't matter to the
        // wall-clock timeout
        clock += 60_000.0;
        g.advance(clock, 0.016, 0.0, &idle());
        assert_eq!(g.phase().name(), "dock");
    }

    #[test]
    fn test_dock_position_revolves() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, 12_000.0, &idle());
        assert!(g.is_docked());
        let before = g.position;
        run_until(&mut g, &mut clock, 30_000.0, &idle());
        assert!(
            before.distance(g.position) > 0.1,
            "docked glyph should revolve with the ring"
        );
    }

    #[test]
    fn test_closed_fist_gathers() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, 12_000.0, &idle());
        let ambient_radius = g.position.flat().length();

        let mut fist = GestureState::idle();
        fist.detected = true;
        fist.label = GestureLabel::Closed;
        run_until(&mut g, &mut clock, 16_000.0, &fist);
        let gathered_radius = g.position.flat().length();
        assert!(
            gathered_radius < ambient_radius * 0.7,
            "fist should gather the ring: {ambient_radius} -> {gathered_radius}"
        );
    }

    #[test]
    fn test_open_hand_pushes_outward() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, 12_000.0, &idle());
        let ambient_radius = g.position.flat().length();

        let mut open = GestureState::idle();
        open.detected = true;
        open.label = GestureLabel::Open;
        run_until(&mut g, &mut clock, 16_000.0, &open);
        assert!(
            g.position.flat().length() > ambient_radius + 1.0,
            "open hand should push the ring outward"
        );
    }

    #[test]
    fn test_swipe_repels_within_radius() {
        let mut g = Glyph::new(0, 'a', 0, 0, 0.0);
        let mut clock = 0.0;
        run_until(&mut g, &mut clock, 12_000.0, &idle());
        assert!(g.is_docked());

        // aim the pointer straight at the glyph's current plane position
        let mut swipe = GestureState::idle();
        swipe.detected = true;
        swipe.label = GestureLabel::Swipe;
        swipe.pointer = crate::vector::Vec2::new(
            g.position.x / (2.0 * CLOUD_EXTENT) + 0.5,
            0.5 - g.position.y / (2.0 * CLOUD_EXTENT),
        );
        let pointer = super::pointer_world(&swipe);
        let before = Vec2::new(g.position.x - pointer.x, g.position.y - pointer.y).length();
        run_until(&mut g, &mut clock, 12_400.0, &swipe);
        let after = Vec2::new(g.position.x - pointer.x, g.position.y - pointer.y).length();
        assert!(
            after > before + 0.2,
            "swipe should repel the glyph: {before} -> {after}"
        );
    }

    #[test]
    fn test_ring_assignment_wraps_to_next_shell() {
        let inner = DockSlot::from_counter(0);
        let outer = DockSlot::from_counter(RING_CAPACITY);
        assert_eq!(inner.ring, 0);
        assert_eq!(outer.ring, 1);
        assert!(outer.radius > inner.radius);
        assert!(outer.height > inner.height);
        // same slot index, next shell: angles differ by the twist
        assert!((outer.angle - inner.angle - RING_TWIST).abs() < 1e-5);
    }

    #[test]
    fn test_distinct_slots_within_ring() {
        let a = DockSlot::from_counter(3);
        let b = DockSlot::from_counter(4);
        assert!((a.angle - b.angle).abs() > 0.1);
        assert_eq!(a.radius, b.radius);
    }
}
