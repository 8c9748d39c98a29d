// src/notify/mod.rs

use std::path::Path;

use chrono::{DateTime, Local};

pub mod email;

pub use email::EmailNotifier;

/// Delivers "a clip was saved" to whatever channel is configured.
pub trait Notifier: Send {
    fn notify_video(&self, subject: &str, message: &str, video: &Path) -> anyhow::Result<()>;
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_video(&self, subject: &str, message: &str, video: &Path) -> anyhow::Result<()> {
        log::info!(
            "[notify] subject='{}' message='{}' video={:?}",
            subject,
            message,
            video
        );
        Ok(())
    }
}

pub fn clip_subject(ts: &DateTime<Local>) -> String {
    format!("Motion detected in your house at {}", ts.format("%Y-%m-%d"))
}

pub fn clip_message(ts: &DateTime<Local>) -> String {
    format!(
        "Motion detected at {}. More information on your server.",
        ts.format("%Hh%M:%S")
    )
}
