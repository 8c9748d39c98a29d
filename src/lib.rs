// src/lib.rs
pub mod capture;
pub mod config;
pub mod core;
pub mod engine;
pub mod notify;
pub mod recorder;
pub mod ring;
pub mod testing;
pub mod types;
pub mod watcher;

// Re-export the types most callers need
pub use crate::core::{ComponentLogger, EngineError, LogContext};
pub use engine::{ClipEngine, EngineSettings, JobDispatcher, RecordingState, SaveJob};
pub use recorder::SaveScheduler;
pub use ring::{AccumulationBuffer, PreMotionBuffer};
pub use types::{Frame, FrameEvent, MotionFlag};
