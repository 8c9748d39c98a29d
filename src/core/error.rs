use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Construction-time failures of the clip engine.
///
/// Everything that happens after construction (encode, notify, capture) is
/// reported through `anyhow` at the edges instead.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("frame rate not resolved (fps={fps})")]
    InvalidFrameRate { fps: f64 },
    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
    #[error("pre-roll of {secs}s at {fps} fps yields no frames")]
    InvalidPreRoll { secs: f64, fps: f64 },
    #[error("max clip length ({max_frames} frames) shorter than pre-roll ({pre_roll_frames} frames)")]
    InvalidClipLength {
        max_frames: usize,
        pre_roll_frames: usize,
    },
}

impl EngineError {
    pub fn frame_rate(fps: f64) -> Self {
        Self::InvalidFrameRate { fps }
    }
}
