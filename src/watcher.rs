// src/watcher.rs
//
// Capture loop: source -> classifier -> engine, until stopped, end of stream
// or capture failure.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::capture::{FrameDiffDetector, FrameSource};
use crate::engine::{ClipEngine, JobDispatcher};
use crate::types::FrameEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    EndOfStream,
    CaptureFailed(String),
}

#[derive(Debug, Clone)]
pub struct WatchSummary {
    pub frames: u64,
    pub motion_frames: u64,
    pub reason: StopReason,
}

pub fn watch<S, D>(
    source: &mut S,
    detector: &mut FrameDiffDetector,
    engine: &mut ClipEngine<D>,
    running: &AtomicBool,
) -> WatchSummary
where
    S: FrameSource + ?Sized,
    D: JobDispatcher,
{
    let mut frames = 0u64;
    let mut motion_frames = 0u64;

    let reason = loop {
        if !running.load(Ordering::Relaxed) {
            break StopReason::Requested;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("[watch] capture stream ended");
                break StopReason::EndOfStream;
            }
            Err(e) => {
                log::error!("[watch] could not read frame: {:#}", e);
                break StopReason::CaptureFailed(format!("{:#}", e));
            }
        };

        let motion = detector.classify(&frame);
        let event = FrameEvent::new(frame, motion);
        if event.motion.is_detected() {
            motion_frames += 1;
            log::debug!("[watch] motion in frame {}", event.frame.seq);
        }

        engine.ingest_event(event);
        frames += 1;
    };

    WatchSummary {
        frames,
        motion_frames,
        reason,
    }
}
