//! Center-biased rejection sampling of a decoded image into a point cloud.
//!
//! Not deterministic by itself: callers inject the RNG, so a seeded RNG
//! reproduces a cloud exactly and an OS RNG gives the intended
//! different-but-statistically-similar cloud per load.

use std::fmt;

use rand::Rng;

use crate::constants::{
    ALPHA_FLOOR, ATTEMPT_FACTOR, BASE_KEEP_CHANCE, CLOUD_EXTENT, DEPTH_FAR, DEPTH_RANGE,
    FALLOFF_EXPONENT,
};
use crate::field::FieldPoint;
use crate::vector::Vec3;

/// A decoded RGBA image. Decoding itself happens upstream; this type only
/// validates that the buffer matches its declared dimensions.
#[derive(Clone, Debug)]
pub struct PixelImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SampleError {
    /// Zero-sized image.
    EmptyImage,
    /// Buffer length does not match width × height × 4.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::EmptyImage => write!(f, "image has zero pixels"),
            SampleError::SizeMismatch { expected, actual } => {
                write!(f, "pixel buffer length {actual}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for SampleError {}

impl PixelImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, SampleError> {
        if width == 0 || height == 0 {
            return Err(SampleError::EmptyImage);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SampleError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Uniform single-color image, mostly for tests and the demo.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, SampleError> {
        let px = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(px))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

/// Perceptual luminance of linear RGB in [0, 1].
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Sample `target` points from the image with a center-biased keep
/// probability and luminance-derived depth.
///
/// Returns at most `target` points; gives up after 200 attempts per point.
/// A run that accepts nothing (e.g. a fully transparent image) yields
/// exactly one white point at the origin so downstream always has a cloud.
pub fn sample_field(image: &PixelImage, target: usize, rng: &mut impl Rng) -> Vec<FieldPoint> {
    let target = target.max(1);
    let budget = target.saturating_mul(ATTEMPT_FACTOR);

    let w = image.width as f32;
    let h = image.height as f32;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let corner = (cx * cx + cy * cy).sqrt();
    // larger image axis spans the full cloud extent
    let scale = (CLOUD_EXTENT * 2.0) / w.max(h);

    let mut points = Vec::with_capacity(target);
    let mut attempts = 0usize;

    while points.len() < target && attempts < budget {
        attempts += 1;

        let px = rng.random_range(0..image.width);
        let py = rng.random_range(0..image.height);

        let dx = px as f32 - cx;
        let dy = py as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt() / corner;

        // Periphery is usually rejected; the base chance keeps it sparse
        // rather than empty.
        let falloff = dist.powf(FALLOFF_EXPONENT);
        if falloff > rng.random::<f32>() && rng.random::<f32>() > BASE_KEEP_CHANCE {
            continue;
        }

        let [r, g, b, a] = image.pixel(px, py);
        if a <= ALPHA_FLOOR {
            continue;
        }

        let color = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
        let lum = luminance(color[0], color[1], color[2]);

        let position = Vec3::new(
            dx * scale,
            -dy * scale, // image y grows downward, world y grows up
            DEPTH_FAR + lum * DEPTH_RANGE,
        );
        let seed = rng.random::<f32>() * std::f32::consts::TAU;
        points.push(FieldPoint::new(position, color, seed));
    }

    if points.is_empty() {
        points.push(FieldPoint::new(Vec3::ZERO, [1.0, 1.0, 1.0], 0.0));
    }
    points
}
