use std::collections::VecDeque;

use crate::types::Frame;

/// Fixed-capacity ring of the most recent frames, oldest first.
///
/// Pre-filled with blank frames so it always holds exactly `capacity`
/// entries; every push evicts the oldest one.
pub struct PreMotionBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
    pushed: u64,
    evicted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingStats {
    pub capacity: usize,
    pub len: usize,
    pub pushed: u64,
    pub evicted: u64,
}

impl PreMotionBuffer {
    pub fn new(capacity: usize, width: u32, height: u32) -> Self {
        assert!(capacity > 0, "pre-roll capacity must be > 0");

        // one shared black buffer for all placeholders
        let blank = Frame::blank(width, height);
        let mut frames = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            frames.push_back(blank.clone());
        }

        Self {
            frames,
            capacity,
            pushed: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
            self.evicted += 1;
        }
        self.frames.push_back(frame);
        self.pushed += 1;
    }

    /// Copy of the current contents (handles only), oldest first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.iter().cloned().collect()
    }

    pub fn newest(&self) -> Option<&Frame> {
        self.frames.back()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> RingStats {
        RingStats {
            capacity: self.capacity,
            len: self.frames.len(),
            pushed: self.pushed,
            evicted: self.evicted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: u64) -> Frame {
        Frame::new(seq, seq * 100, 2, 1, vec![seq as u8; 6])
    }

    #[test]
    fn test_prefilled_with_blanks() {
        let ring = PreMotionBuffer::new(3, 2, 1);
        assert_eq!(ring.len(), 3);
        let snap = ring.snapshot();
        assert!(snap.iter().all(|f| f.is_blank()));
        assert!(snap[0].shares_pixels(&snap[2]));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut ring = PreMotionBuffer::new(3, 2, 1);
        for seq in 1..=5 {
            ring.push(frame(seq));
        }

        let seqs: Vec<u64> = ring.snapshot().iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.newest().map(|f| f.seq), Some(5));

        let stats = ring.stats();
        assert_eq!(stats.pushed, 5);
        assert_eq!(stats.evicted, 5);
    }

    #[test]
    fn test_snapshot_does_not_drain() {
        let mut ring = PreMotionBuffer::new(2, 2, 1);
        ring.push(frame(1));
        let first = ring.snapshot();
        let second = ring.snapshot();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(first[1].shares_pixels(&second[1]));
    }
}
