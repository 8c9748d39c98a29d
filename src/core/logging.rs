// src/core/logging.rs
use std::sync::atomic::{AtomicU64, Ordering};

use super::timestamp::utc_ns_now;

// process-wide sequence for correlating log lines
static LOG_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub instance_id: String,
    pub clip_id: Option<String>,
    pub sequence: u64,
    pub timestamp_ns: u64,
}

impl LogContext {
    pub fn new(component: &str, instance_id: &str) -> Self {
        Self {
            component: component.to_string(),
            instance_id: instance_id.to_string(),
            clip_id: None,
            sequence: LOG_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            timestamp_ns: utc_ns_now(),
        }
    }

    pub fn with_clip(mut self, clip_id: &str) -> Self {
        self.clip_id = Some(clip_id.to_string());
        self
    }

    pub fn format(&self, message: &str) -> String {
        let clip_info = match &self.clip_id {
            Some(clip) => format!(" clip={}", clip),
            None => String::new(),
        };

        format!(
            "[seq={:06}][{}:{}{}] {}",
            self.sequence, self.component, self.instance_id, clip_info, message
        )
    }
}

/// Uniform `[component:instance]` prefixed logging on top of the `log` facade.
pub trait ComponentLogger {
    fn log_context(&self) -> LogContext;

    fn trace(&self, message: &str) {
        log::trace!("{}", self.log_context().format(message));
    }

    fn debug(&self, message: &str) {
        log::debug!("{}", self.log_context().format(message));
    }

    fn info(&self, message: &str) {
        log::info!("{}", self.log_context().format(message));
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", self.log_context().format(message));
    }

    fn error(&self, message: &str) {
        log::error!("{}", self.log_context().format(message));
    }
}
