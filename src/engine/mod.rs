// src/engine/mod.rs
//
// Idle/Recording state machine over the pre-roll ring and the clip buffer.
// Runs entirely on the ingest thread: no I/O, completed clips are handed to
// a `JobDispatcher`.

pub mod job;

pub use job::{JobDispatcher, SaveJob};

use crate::core::error::{EngineError, EngineResult};
use crate::core::logging::{ComponentLogger, LogContext};
use crate::ring::{AccumulationBuffer, PreMotionBuffer};
use crate::types::{Frame, FrameEvent, MotionFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Plain values the engine is sized from.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub pre_roll_secs: f64,
    pub max_clip_secs: f64,
}

impl EngineSettings {
    pub fn pre_roll_frames(&self) -> usize {
        frames_for(self.pre_roll_secs, self.fps)
    }

    pub fn max_clip_frames(&self) -> usize {
        frames_for(self.max_clip_secs, self.fps)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(EngineError::frame_rate(self.fps));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidFrameSize {
                width: self.width,
                height: self.height,
            });
        }

        let pre_roll_frames = self.pre_roll_frames();
        if pre_roll_frames == 0 {
            return Err(EngineError::InvalidPreRoll {
                secs: self.pre_roll_secs,
                fps: self.fps,
            });
        }

        let max_frames = self.max_clip_frames();
        if max_frames < pre_roll_frames {
            return Err(EngineError::InvalidClipLength {
                max_frames,
                pre_roll_frames,
            });
        }
        Ok(())
    }
}

fn frames_for(secs: f64, fps: f64) -> usize {
    let n = (secs * fps).floor();
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub frames_ingested: u64,
    pub clips_dispatched: u64,
}

pub struct ClipEngine<D: JobDispatcher> {
    settings: EngineSettings,
    state: RecordingState,
    pre_roll: PreMotionBuffer,
    clip: AccumulationBuffer,
    dispatcher: D,
    stats: EngineStats,
}

impl<D: JobDispatcher> ClipEngine<D> {
    /// Fails before allocating anything if the settings cannot size the buffers.
    pub fn new(settings: EngineSettings, dispatcher: D) -> EngineResult<Self> {
        settings.validate()?;

        let pre_roll = PreMotionBuffer::new(settings.pre_roll_frames(), settings.width, settings.height);
        let clip = AccumulationBuffer::new(settings.max_clip_frames());

        let engine = Self {
            settings,
            state: RecordingState::Idle,
            pre_roll,
            clip,
            dispatcher,
            stats: EngineStats::default(),
        };
        engine.info(&format!(
            "ready: {} fps, pre-roll {} frames, max clip {} frames",
            engine.settings.fps,
            engine.pre_roll.capacity(),
            engine.clip.capacity()
        ));
        Ok(engine)
    }

    pub fn ingest_event(&mut self, event: FrameEvent) {
        self.ingest(event.frame, event.motion);
    }

    pub fn ingest(&mut self, frame: Frame, motion: MotionFlag) {
        self.stats.frames_ingested += 1;

        match self.state {
            RecordingState::Recording => {
                self.clip.push(frame.clone());
                self.pre_roll.push(frame);
                if log::log_enabled!(log::Level::Trace) {
                    self.trace(&format!("recording {}/{}", self.clip.len(), self.clip.capacity()));
                }
                if self.clip.is_full() {
                    self.finish_clip();
                }
            }
            RecordingState::Idle => {
                // the trigger becomes the newest entry of the seeded pre-roll
                self.pre_roll.push(frame);
                if motion.is_detected() {
                    self.start_clip();
                }
            }
        }

        debug_assert_eq!(self.clip.is_empty(), self.state == RecordingState::Idle);
    }

    fn start_clip(&mut self) {
        self.clip.seed(self.pre_roll.snapshot());
        self.state = RecordingState::Recording;
        self.info(&format!(
            "motion detected, recording (seeded {} pre-roll frames)",
            self.clip.len()
        ));

        // pre-roll as long as the clip itself
        if self.clip.is_full() {
            self.finish_clip();
        }
    }

    fn finish_clip(&mut self) {
        let frames = self.clip.drain_and_clear();
        self.state = RecordingState::Idle;

        let job = SaveJob::new(frames, self.settings.fps, self.settings.width, self.settings.height);
        self.stats.clips_dispatched += 1;
        self.info(&format!("clip complete ({} frames), dispatching {}", job.len(), job.id));
        self.dispatcher.dispatch(job);
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Frames currently held for the clip being assembled.
    pub fn pending_frames(&self) -> usize {
        self.clip.len()
    }

    pub fn pre_roll_snapshot(&self) -> Vec<Frame> {
        self.pre_roll.snapshot()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Drops the buffers (and any partial clip) and returns the dispatcher,
    /// typically so the caller can shut the scheduler down.
    pub fn into_dispatcher(self) -> D {
        if self.state == RecordingState::Recording {
            self.warn(&format!("discarding partial clip of {} frames", self.clip.len()));
        }
        self.dispatcher
    }
}

impl<D: JobDispatcher> ComponentLogger for ClipEngine<D> {
    fn log_context(&self) -> LogContext {
        LogContext::new("Engine", &format!("{}x{}", self.settings.width, self.settings.height))
    }
}
