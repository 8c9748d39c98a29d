use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebcamConfig {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub default_fps: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Ffmpeg,
    Raw,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub pre_roll_secs: f64,
    pub max_clip_secs: f64,
    pub output_dir: PathBuf,
    pub encoder: EncoderKind,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub codec: String,
    pub warm_up_frames: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub threshold: u8,
    pub min_area: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub webcam: WebcamConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub email_notification: EmailConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("configuration file '{}' not found", path))?;
        let config = Self::parse(&content)?;
        log::debug!("[config] loaded {}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate().context("config validation failed")?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.webcam;
        if w.width == 0 || w.height == 0 {
            bail!("webcam.width and webcam.height must be > 0");
        }
        if w.default_fps == 0 {
            bail!("webcam.default_fps must be > 0");
        }

        let r = &self.recording;
        if !(r.pre_roll_secs > 0.0) {
            bail!("recording.pre_roll_secs must be > 0");
        }
        if !(r.max_clip_secs > 0.0) {
            bail!("recording.max_clip_secs must be > 0");
        }
        if r.pre_roll_secs > r.max_clip_secs {
            bail!(
                "recording.pre_roll_secs ({}) exceeds recording.max_clip_secs ({})",
                r.pre_roll_secs,
                r.max_clip_secs
            );
        }
        if r.output_dir.as_os_str().is_empty() {
            bail!("recording.output_dir must not be empty");
        }

        if self.motion.min_area == 0 {
            bail!("motion.min_area must be > 0");
        }

        let e = &self.email_notification;
        if e.enabled {
            for (name, value) in [
                ("smtp_host", &e.smtp_host),
                ("sender_email", &e.sender_email),
                ("sender_password", &e.sender_password),
                ("receiver_email", &e.receiver_email),
            ] {
                if value.trim().is_empty() {
                    bail!("email_notification.{} must not be empty when enabled", name);
                }
            }
            if e.smtp_port == 0 {
                bail!("email_notification.smtp_port must be > 0");
            }
        }

        Ok(())
    }

    /// Engine sizing for a resolved frame rate.
    pub fn engine_settings(&self, fps: f64) -> EngineSettings {
        EngineSettings {
            fps,
            width: self.webcam.width,
            height: self.webcam.height,
            pre_roll_secs: self.recording.pre_roll_secs,
            max_clip_secs: self.recording.max_clip_secs,
        }
    }
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 1280,
            height: 720,
            default_fps: 10,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            pre_roll_secs: 1.0,
            max_clip_secs: 10.0,
            output_dir: PathBuf::from("output"),
            encoder: EncoderKind::Ffmpeg,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            codec: "mpeg4".to_string(),
            warm_up_frames: 5,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            threshold: 25,
            min_area: 500,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 465,
            sender_email: String::new(),
            sender_password: String::new(),
            receiver_email: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[webcam]
device_index = 0
width = 640
height = 480
default_fps = 15
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = Config::parse(MINIMAL).unwrap();
        assert_eq!(cfg.webcam.width, 640);
        assert_eq!(cfg.recording.pre_roll_secs, 1.0);
        assert_eq!(cfg.recording.max_clip_secs, 10.0);
        assert_eq!(cfg.recording.encoder, EncoderKind::Ffmpeg);
        assert_eq!(cfg.motion.min_area, 500);
        assert!(!cfg.email_notification.enabled);

        let s = cfg.engine_settings(15.0);
        assert_eq!(s.pre_roll_frames(), 15);
        assert_eq!(s.max_clip_frames(), 150);
    }

    #[test]
    fn test_full_config() {
        let text = format!(
            "{}{}",
            MINIMAL,
            r#"
[recording]
pre_roll_secs = 2.0
max_clip_secs = 5.0
output_dir = "/var/lib/clips"
encoder = "raw"

[email_notification]
enabled = true
smtp_host = "smtp.example.org"
smtp_port = 465
sender_email = "cam@example.org"
sender_password = "pw"
receiver_email = "me@example.org"
"#
        );
        let cfg = Config::parse(&text).unwrap();
        assert_eq!(cfg.recording.encoder, EncoderKind::Raw);
        assert_eq!(cfg.recording.output_dir, PathBuf::from("/var/lib/clips"));
        assert_eq!(cfg.recording.ffmpeg_bin, "ffmpeg");
        assert_eq!(cfg.recording.ffprobe_bin, "ffprobe");
        assert!(cfg.email_notification.enabled);
    }

    #[test]
    fn test_rejects_pre_roll_longer_than_clip() {
        let text = format!("{}\n[recording]\npre_roll_secs = 20.0\n", MINIMAL);
        let err = Config::parse(&text).unwrap_err();
        assert!(format!("{:#}", err).contains("exceeds"));
    }

    #[test]
    fn test_rejects_enabled_email_without_host() {
        let text = format!("{}\n[email_notification]\nenabled = true\n", MINIMAL);
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_rejects_zero_fps() {
        let text = MINIMAL.replace("default_fps = 15", "default_fps = 0");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/config.toml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
