//! Spatial placement of saved memories for the rendering collaborator.
//!
//! Three arrangements: a center-out focus row for matched memories, a deep
//! golden-angle scatter band for the rest, and a single expanding
//! golden-angle gallery spiral when no search is active. Scatter depth and
//! radius derive from a stable hash of the memory id, so a layout only
//! changes when the memory set or the query state changes.

use uuid::Uuid;

use crate::constants::{
    BACKGROUND_DEPTH, BACKGROUND_DEPTH_SPAN, BACKGROUND_RADIUS, BACKGROUND_RADIUS_SPAN,
    FOCUS_DEPTH, FOCUS_DEPTH_STEP, FOCUS_HEIGHT, FOCUS_HEIGHT_STEP, FOCUS_SPACING, GALLERY_DEPTH,
    GALLERY_RADIUS, GALLERY_RADIUS_STEP, GOLDEN_ANGLE,
};
use crate::memory::MemoryEntry;
use crate::vector::Vec3;

/// Placement of one memory in world space.
#[derive(Clone, Copy, Debug)]
pub struct Placement {
    pub id: Uuid,
    pub position: Vec3,
}

/// Lay out the memory list.
///
/// `has_matches` is the signal from [`crate::search::apply_search`]: with
/// it, memories scoring positive take the focus row (the list is already
/// sorted best-first) and the rest scatter deep; without it, everything
/// sits on the gallery spiral.
pub fn layout_memories(memories: &[MemoryEntry], has_matches: bool) -> Vec<Placement> {
    if has_matches {
        focused_layout(memories)
    } else {
        gallery_layout(memories)
    }
}

/// Alternating center-out slot for a focus rank: 0, +1, −1, +2, −2, …
fn focus_slot(rank: usize) -> i32 {
    let step = rank.div_ceil(2) as i32;
    if rank % 2 == 1 { step } else { -step }
}

fn focused_layout(memories: &[MemoryEntry]) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(memories.len());
    let mut focus_rank = 0usize;
    let mut scatter_rank = 0usize;

    for memory in memories {
        let position = if memory.match_score > 0.0 {
            let slot = focus_slot(focus_rank);
            focus_rank += 1;
            let offset = slot.unsigned_abs() as f32;
            Vec3::new(
                slot as f32 * FOCUS_SPACING,
                FOCUS_HEIGHT - offset * FOCUS_HEIGHT_STEP,
                FOCUS_DEPTH - offset * FOCUS_DEPTH_STEP,
            )
        } else {
            let angle = scatter_rank as f32 * GOLDEN_ANGLE;
            scatter_rank += 1;
            let (fa, fb) = unit_fractions(stable_hash(&memory.id));
            let radius = BACKGROUND_RADIUS + fa * BACKGROUND_RADIUS_SPAN;
            Vec3::new(
                radius * angle.cos(),
                radius * angle.sin() * 0.5,
                BACKGROUND_DEPTH - fb * BACKGROUND_DEPTH_SPAN,
            )
        };
        placements.push(Placement {
            id: memory.id,
            position,
        });
    }
    placements
}

fn gallery_layout(memories: &[MemoryEntry]) -> Vec<Placement> {
    memories
        .iter()
        .enumerate()
        .map(|(i, memory)| {
            let angle = i as f32 * GOLDEN_ANGLE;
            let radius = GALLERY_RADIUS + i as f32 * GALLERY_RADIUS_STEP;
            Placement {
                id: memory.id,
                position: Vec3::new(
                    radius * angle.cos(),
                    radius * angle.sin() * 0.6,
                    GALLERY_DEPTH,
                ),
            }
        })
        .collect()
}

/// FNV-1a over the id bytes; stable across processes and relayouts.
fn stable_hash(id: &Uuid) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for b in id.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

/// Two independent fractions in [0, 1) from one hash.
fn unit_fractions(hash: u64) -> (f32, f32) {
    let a = (hash & 0xffff_ffff) as f32 / 4_294_967_296.0;
    let b = (hash >> 32) as f32 / 4_294_967_296.0;
    (a, b)
}
