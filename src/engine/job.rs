use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};

use crate::core::timestamp::clip_id;
use crate::types::Frame;

// process-wide clip counter, part of every clip id
static CLIP_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Frozen, ready-to-encode clip. Owned by whoever it was dispatched to.
#[derive(Debug, Clone)]
pub struct SaveJob {
    pub id: String,
    pub serial: u64,
    pub created: DateTime<Local>,
    pub frames: Vec<Frame>,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl SaveJob {
    pub fn new(frames: Vec<Frame>, fps: f64, width: u32, height: u32) -> Self {
        Self::at(Local::now(), frames, fps, width, height)
    }

    pub fn at(created: DateTime<Local>, frames: Vec<Frame>, fps: f64, width: u32, height: u32) -> Self {
        let serial = CLIP_SERIAL.fetch_add(1, Ordering::Relaxed);
        Self {
            id: clip_id(&created, serial),
            serial,
            created,
            frames,
            fps,
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames.len() as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Receiving end of completed clips.
///
/// `dispatch` is called from the ingest path and must not perform the
/// encode itself.
pub trait JobDispatcher {
    fn dispatch(&self, job: SaveJob);
}

impl<D: JobDispatcher + ?Sized> JobDispatcher for &D {
    fn dispatch(&self, job: SaveJob) {
        (**self).dispatch(job)
    }
}

impl<D: JobDispatcher + ?Sized> JobDispatcher for Box<D> {
    fn dispatch(&self, job: SaveJob) {
        (**self).dispatch(job)
    }
}
