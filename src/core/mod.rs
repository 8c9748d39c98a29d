pub mod error;
pub mod logging;
pub mod timestamp;

pub use error::{EngineError, EngineResult};
pub use logging::{ComponentLogger, LogContext};
pub use timestamp::*;
