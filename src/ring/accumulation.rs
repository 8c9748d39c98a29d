use crate::types::Frame;

/// Frames of the clip being assembled. Grows by appending only and is
/// emptied in one step by [`drain_and_clear`](Self::drain_and_clear).
pub struct AccumulationBuffer {
    frames: Vec<Frame>,
    capacity: usize,
}

impl AccumulationBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "clip capacity must be > 0");
        Self {
            frames: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the (empty) contents with the given pre-roll.
    pub fn seed(&mut self, frames: Vec<Frame>) {
        assert!(
            self.frames.is_empty(),
            "seed on non-empty accumulation buffer ({} frames)",
            self.frames.len()
        );
        assert!(
            frames.len() <= self.capacity,
            "seed of {} frames exceeds capacity {}",
            frames.len(),
            self.capacity
        );
        self.frames = frames;
        self.frames.reserve(self.capacity - self.frames.len());
    }

    pub fn push(&mut self, frame: Frame) {
        assert!(
            !self.is_full(),
            "push on full accumulation buffer (capacity {})",
            self.capacity
        );
        self.frames.push(frame);
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn drain_and_clear(&mut self) -> Vec<Frame> {
        std::mem::replace(&mut self.frames, Vec::with_capacity(self.capacity))
    }
}
