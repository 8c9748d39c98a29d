// src/capture/mod.rs

pub mod ffmpeg_in;
pub mod motion;

pub use ffmpeg_in::FfmpegSource;
pub use motion::FrameDiffDetector;

use anyhow::bail;

use crate::types::Frame;

/// Supplier of captured frames, in capture order.
///
/// `Ok(None)` is a clean end of stream; `Err` is a capture failure. Both end
/// ingestion.
pub trait FrameSource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;

    /// Resolved capture rate, `<= 0` when unknown.
    fn fps(&self) -> f64;
}

/// Reads and discards the first `count` frames so exposure settles; returns
/// the last one.
pub fn warm_up<S: FrameSource + ?Sized>(source: &mut S, count: usize) -> anyhow::Result<Option<Frame>> {
    let mut last = None;
    for i in 0..count {
        match source.next_frame()? {
            Some(frame) => last = Some(frame),
            None => bail!("capture ended during warm-up after {} frames", i),
        }
    }
    Ok(last)
}
