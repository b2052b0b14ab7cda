//! The ambient point cloud and its per-tick motion rules.
//!
//! Every point anchors to an immutable origin sampled from the image.
//! Calm clouds ripple; edge points drift on curl noise; a disruption drive
//! blends the whole cloud toward a scattered arrangement, engaging fast and
//! relaxing slowly; reading mode overrides everything and parks the cloud
//! deep behind the text.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CURL_SCALE, CURL_STRENGTH, DISRUPTION_FALL, DISRUPTION_RISE, EASE_FIELD, EDGE_FRACTION,
    READING_JITTER, READING_PUSH_BACK, RIPPLE_AMPLITUDE, RIPPLE_FREQUENCY, RIPPLE_RATE,
    SCATTER_EXPAND, SCATTER_JITTER,
};
use crate::noise::{curl2, unit_from_seed, value_noise};
use crate::vector::Vec3;

/// One sampled point. `origin` never changes after sampling; `position` is
/// what the renderer reads and what the field rules mutate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldPoint {
    pub position: Vec3,
    pub origin: Vec3,
    pub color: [f32; 3],
    pub seed: f32,
}

impl FieldPoint {
    pub fn new(position: Vec3, color: [f32; 3], seed: f32) -> Self {
        Self {
            position,
            origin: position,
            color,
            seed,
        }
    }
}

/// The full cloud for one loaded image. Cardinality is fixed for the
/// cloud's lifetime; a new image produces a new `Cloud`.
#[derive(Clone, Debug, Default)]
pub struct Cloud {
    points: Vec<FieldPoint>,
    /// Current scatter blend in [0, 1], chasing the disruption drive.
    scatter: f32,
    /// Planar radius of the farthest origin, for edge classification.
    max_radius: f32,
}

impl Cloud {
    pub fn new(points: Vec<FieldPoint>) -> Self {
        let max_radius = points
            .iter()
            .map(|p| p.origin.xy().length())
            .fold(0.0f32, f32::max);
        Self {
            points,
            scatter: 0.0,
            max_radius,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[FieldPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn scatter(&self) -> f32 {
        self.scatter
    }

    /// Advance every point one tick.
    ///
    /// `drive` is the disruption scalar in [0, 1]; `reading` pauses the
    /// normal rules and parks the cloud deep with a small jitter.
    pub fn advance(&mut self, clock_s: f32, dt_s: f32, drive: f32, reading: bool) {
        if reading {
            for p in &mut self.points {
                let jitter = Vec3::new(
                    value_noise(Vec3::new(p.seed, clock_s * 0.6, 0.0)),
                    value_noise(Vec3::new(clock_s * 0.6, p.seed, 7.0)),
                    0.0,
                ) * READING_JITTER;
                let target = p.origin + Vec3::new(0.0, 0.0, -READING_PUSH_BACK) + jitter;
                p.position = p.position.ease_toward(target, EASE_FIELD, dt_s);
            }
            return;
        }

        // Scatter engages faster than it relaxes: the cloud bursts apart,
        // then settles.
        let rate = if drive > self.scatter {
            DISRUPTION_RISE
        } else {
            DISRUPTION_FALL
        };
        self.scatter += (drive - self.scatter) * (rate * dt_s).min(1.0);

        let edge_radius = self.max_radius * EDGE_FRACTION;
        for p in &mut self.points {
            let planar = p.origin.xy().length();

            let ripple = (clock_s * RIPPLE_RATE
                + p.origin.x * RIPPLE_FREQUENCY
                + p.origin.y * RIPPLE_FREQUENCY * 0.7)
                .sin()
                * RIPPLE_AMPLITUDE;
            let mut calm = p.origin + Vec3::new(0.0, 0.0, ripple);

            // Soften the silhouette: points near the rim follow the curl
            // field instead of holding a hard boundary.
            if planar > edge_radius {
                let drift = curl2(
                    p.origin.x * CURL_SCALE,
                    p.origin.y * CURL_SCALE,
                    clock_s * 0.15,
                ) * CURL_STRENGTH;
                calm += Vec3::new(drift.x, drift.y, 0.0);
            }

            let expanded = Vec3::new(
                p.origin.x * (1.0 + SCATTER_EXPAND),
                p.origin.y * (1.0 + SCATTER_EXPAND),
                p.origin.z,
            ) + unit_from_seed(p.seed) * SCATTER_JITTER;

            let target = calm.lerp(expanded, self.scatter);
            p.position = p.position.ease_toward(target, EASE_FIELD, dt_s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_cloud() -> Cloud {
        let mut points = Vec::new();
        for i in -3i32..=3 {
            for j in -3i32..=3 {
                let pos = Vec3::new(i as f32, j as f32, 0.0);
                points.push(FieldPoint::new(pos, [0.5, 0.5, 0.5], (i * 7 + j) as f32));
            }
        }
        Cloud::new(points)
    }

    fn settle(cloud: &mut Cloud, drive: f32, reading: bool, ticks: usize) {
        for t in 0..ticks {
            cloud.advance(t as f32 / 60.0, 1.0 / 60.0, drive, reading);
        }
    }

    #[test]
    fn test_cardinality_is_fixed() {
        let mut cloud = grid_cloud();
        let n = cloud.len();
        settle(&mut cloud, 1.0, false, 120);
        assert_eq!(cloud.len(), n);
    }

    #[test]
    fn test_calm_cloud_stays_near_origin() {
        let mut cloud = grid_cloud();
        settle(&mut cloud, 0.0, false, 240);
        for p in cloud.points() {
            let drift = p.position.distance(p.origin);
            assert!(drift < 3.0, "calm drift too large: {drift}");
        }
    }

    #[test]
    fn test_disruption_expands_cloud() {
        let mut cloud = grid_cloud();
        settle(&mut cloud, 1.0, false, 240);
        let p = &cloud.points()[0]; // corner point, origin (-3, -3, 0)
        assert!(
            p.position.xy().length() > p.origin.xy().length() + 0.5,
            "scattered point should move outward"
        );
    }

    #[test]
    fn test_scatter_rises_faster_than_it_falls() {
        let mut rising = grid_cloud();
        rising.advance(0.0, 0.5, 1.0, false);
        let after_rise = rising.scatter();

        let mut falling = grid_cloud();
        falling.scatter = 1.0;
        falling.advance(0.0, 0.5, 0.0, false);
        let after_fall = 1.0 - falling.scatter();

        assert!(
            after_rise > after_fall,
            "engage {after_rise} should beat relax {after_fall}"
        );
    }

    #[test]
    fn test_reading_mode_pushes_back_in_depth() {
        let mut cloud = grid_cloud();
        settle(&mut cloud, 0.0, true, 240);
        for p in cloud.points() {
            assert!(
                p.position.z < p.origin.z - READING_PUSH_BACK * 0.8,
                "reading mode should park points deep: z = {}",
                p.position.z
            );
        }
    }

    #[test]
    fn test_reading_mode_freezes_scatter() {
        let mut cloud = grid_cloud();
        cloud.scatter = 0.4;
        settle(&mut cloud, 1.0, true, 10);
        assert_eq!(cloud.scatter(), 0.4);
    }

    #[test]
    fn test_edge_points_drift_on_curl() {
        let mut cloud = grid_cloud();
        settle(&mut cloud, 0.0, false, 120);
        let max_rim_drift = cloud
            .points()
            .iter()
            .filter(|p| p.origin.xy().length() > 3.5)
            .map(|p| (p.position.xy() - p.origin.xy()).length())
            .fold(0.0f32, f32::max);
        assert!(max_rim_drift > 1e-3, "rim points should drift in-plane");
    }
}
