use std::sync::Arc;

/// Bytes per pixel of the BGR24 layout every frame uses.
pub const BYTES_PER_PIXEL: usize = 3;

/// One captured video frame.
///
/// Pixels sit behind an `Arc`; cloning a frame hands out another reference,
/// the buffer itself is never copied or mutated after capture.
#[derive(Clone, Debug)]
pub struct Frame {
    pub seq: u64,
    pub utc_ns: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl Frame {
    pub fn new(seq: u64, utc_ns: u64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            seq,
            utc_ns,
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// Black placeholder used to pad the pre-roll before real frames arrive.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height, vec![0u8; frame_len(width, height)])
    }

    pub fn is_blank(&self) -> bool {
        self.seq == 0 && self.utc_ns == 0
    }

    /// True when both frames point at the same pixel buffer.
    pub fn shares_pixels(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

pub fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionFlag {
    NoMotion,
    Detected,
}

impl MotionFlag {
    pub fn is_detected(self) -> bool {
        self == MotionFlag::Detected
    }
}

impl From<bool> for MotionFlag {
    fn from(detected: bool) -> Self {
        if detected {
            MotionFlag::Detected
        } else {
            MotionFlag::NoMotion
        }
    }
}

#[derive(Clone, Debug)]
pub struct FrameEvent {
    pub frame: Frame,
    pub motion: MotionFlag,
}

impl FrameEvent {
    pub fn new(frame: Frame, motion: MotionFlag) -> Self {
        Self { frame, motion }
    }
}
