//! Scoped ownership of the audio capture stream.
//!
//! The guard is the only holder of the stream. Release is idempotent and
//! runs on drop too, so a stop/start cycle can never leak an open
//! microphone stream.

use crate::collab::CaptureStream;

pub struct CaptureGuard {
    stream: Option<Box<dyn CaptureStream>>,
}

impl CaptureGuard {
    pub fn new(stream: Box<dyn CaptureStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// Samples since the last drain; empty once released.
    pub fn drain(&mut self) -> Vec<f32> {
        match self.stream.as_mut() {
            Some(stream) => stream.drain(),
            None => Vec::new(),
        }
    }

    /// Release the device. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.release();
    }
}
