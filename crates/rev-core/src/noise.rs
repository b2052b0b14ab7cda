//! Lattice value noise and a 2-D curl field for ambient point drift.
//!
//! Deterministic by construction: the same coordinates always produce the
//! same value, so drift offsets are stable across ticks and relayouts.

use crate::vector::{Vec2, Vec3};

/// Integer lattice hash → [0, 1).
fn lattice(x: i32, y: i32, z: i32) -> f32 {
    let mut h = (x as u32).wrapping_mul(0x8da6_b343)
        ^ (y as u32).wrapping_mul(0xd816_3841)
        ^ (z as u32).wrapping_mul(0xcb1a_b31f);
    h = h.wrapping_mul(0x9e37_79b9);
    h ^= h >> 16;
    (h & 0x00ff_ffff) as f32 / 16_777_216.0
}

/// Hermite fade: t² (3 − 2t).
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smooth trilinear value noise in [-1, 1].
pub fn value_noise(p: Vec3) -> f32 {
    let xf = p.x.floor();
    let yf = p.y.floor();
    let zf = p.z.floor();
    let (xi, yi, zi) = (xf as i32, yf as i32, zf as i32);
    let (tx, ty, tz) = (fade(p.x - xf), fade(p.y - yf), fade(p.z - zf));

    let mut corners = [0.0f32; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let dx = (i & 1) as i32;
        let dy = ((i >> 1) & 1) as i32;
        let dz = ((i >> 2) & 1) as i32;
        *corner = lattice(xi + dx, yi + dy, zi + dz);
    }

    let x00 = corners[0] + (corners[1] - corners[0]) * tx;
    let x10 = corners[2] + (corners[3] - corners[2]) * tx;
    let x01 = corners[4] + (corners[5] - corners[4]) * tx;
    let x11 = corners[6] + (corners[7] - corners[6]) * tx;
    let y0 = x00 + (x10 - x00) * ty;
    let y1 = x01 + (x11 - x01) * ty;
    let v = y0 + (y1 - y0) * tz;

    v * 2.0 - 1.0
}

/// 2-D curl of the scalar noise field at (x, y), animated over `t`.
///
/// Rotating the gradient 90° makes the flow divergence-free, which is what
/// keeps edge points drifting along contours instead of bunching up.
pub fn curl2(x: f32, y: f32, t: f32) -> Vec2 {
    const H: f32 = 0.01;
    let n = |px: f32, py: f32| value_noise(Vec3::new(px, py, t));
    let dndx = (n(x + H, y) - n(x - H, y)) / (2.0 * H);
    let dndy = (n(x, y + H) - n(x, y - H)) / (2.0 * H);
    Vec2::new(dndy, -dndx)
}

/// Deterministic unit direction derived from a per-point seed phase.
pub fn unit_from_seed(seed: f32) -> Vec3 {
    let y = (seed * 0.754).sin();
    let r = (1.0 - y * y).sqrt();
    Vec3::new(r * seed.cos(), y, r * seed.sin())
}
