// src/capture/motion.rs
//
// Minimal frame differencing: grayscale, absolute difference against the
// previous frame, count pixels above a threshold.

use crate::types::{BYTES_PER_PIXEL, Frame, MotionFlag};

pub struct FrameDiffDetector {
    threshold: u8,
    min_area: usize,
    previous: Option<Vec<u8>>,
}

impl FrameDiffDetector {
    pub fn new(threshold: u8, min_area: usize) -> Self {
        Self {
            threshold,
            min_area,
            previous: None,
        }
    }

    /// Use `frame` as the reference for the next comparison without
    /// classifying it, e.g. the last frame read while warming up.
    pub fn prime(&mut self, frame: &Frame) {
        self.previous = Some(to_gray(&frame.pixels));
    }

    pub fn classify(&mut self, frame: &Frame) -> MotionFlag {
        let gray = to_gray(&frame.pixels);

        let changed = match &self.previous {
            Some(prev) if prev.len() == gray.len() => prev
                .iter()
                .zip(gray.iter())
                .filter(|(a, b)| a.abs_diff(**b) > self.threshold)
                .count(),
            _ => 0,
        };

        self.previous = Some(gray);
        MotionFlag::from(changed >= self.min_area)
    }
}

fn to_gray(bgr: &[u8]) -> Vec<u8> {
    bgr.chunks_exact(BYTES_PER_PIXEL)
        .map(|px| {
            let (b, g, r) = (px[0] as u32, px[1] as u32, px[2] as u32);
            ((114 * b + 587 * g + 299 * r) / 1000) as u8
        })
        .collect()
}
