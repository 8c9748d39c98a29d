// src/recorder/mod.rs

use std::path::{Path, PathBuf};

use crate::engine::SaveJob;

/// Turns a finished clip into a file on disk.
///
/// Frames arrive in clip order; implementations write them sequentially and
/// return the path of the finished artifact.
pub trait ClipEncoder: Send {
    fn encode(&mut self, job: &SaveJob, dir: &Path) -> anyhow::Result<PathBuf>;
}

pub struct SchedulerConfig {
    pub output_dir: PathBuf,
    pub queue_depth: usize,
}

impl SchedulerConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            queue_depth: 1,
        }
    }
}

pub mod scheduler;
pub mod sink_ffmpeg;
pub mod sink_raw;

pub use scheduler::{EncodeHandle, SaveScheduler, SchedulerStats};
pub use sink_ffmpeg::FfmpegEncoder;
pub use sink_raw::{RawClip, RawClipEncoder, read_raw_clip};
