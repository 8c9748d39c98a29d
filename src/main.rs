// src/main.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use log::info;

use clipwatch::capture::{self, FfmpegSource, FrameDiffDetector, FrameSource};
use clipwatch::config::{Config, EncoderKind};
use clipwatch::notify::{EmailNotifier, LogNotifier, Notifier};
use clipwatch::recorder::{ClipEncoder, FfmpegEncoder, RawClipEncoder, SaveScheduler, SchedulerConfig};
use clipwatch::watcher::{self, StopReason};
use clipwatch::ClipEngine;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // ------------------------------------------------------------
    // Config
    // ------------------------------------------------------------
    let cfg_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".into());

    let cfg = Config::load(&cfg_path)?;
    info!("[clipwatch] loaded {}", cfg_path);

    // ------------------------------------------------------------
    // Graceful shutdown
    // ------------------------------------------------------------
    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || {
            info!("[clipwatch] shutdown requested");
            r.store(false, Ordering::SeqCst);
        })?;
    }

    // ------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------
    let mut source = FfmpegSource::open(
        &cfg.recording.ffmpeg_bin,
        &cfg.recording.ffprobe_bin,
        &cfg.webcam,
    )?;
    let fps = source.fps();
    info!("[clipwatch] frames per second: {}", fps);

    // ------------------------------------------------------------
    // Save pipeline
    // ------------------------------------------------------------
    let scheduler = SaveScheduler::start(
        SchedulerConfig::new(&cfg.recording.output_dir),
        build_encoder(&cfg),
        build_notifier(&cfg)?,
    )?;

    let mut engine = ClipEngine::new(cfg.engine_settings(fps), scheduler)
        .context("cannot size clip buffers")?;

    // ------------------------------------------------------------
    // Main loop
    // ------------------------------------------------------------
    let mut detector = FrameDiffDetector::new(cfg.motion.threshold, cfg.motion.min_area);
    if let Some(last) = capture::warm_up(&mut source, cfg.recording.warm_up_frames)? {
        detector.prime(&last);
    }
    info!("[clipwatch] warm-up done, watching – Ctrl+C to stop");

    let summary = watcher::watch(&mut source, &mut detector, &mut engine, &running);

    info!(
        "[clipwatch] stopped after {} frames ({} with motion)",
        summary.frames, summary.motion_frames
    );

    // ------------------------------------------------------------
    // Shutdown: outstanding save first, then the device
    // ------------------------------------------------------------
    let stats = engine.stats();
    engine.into_dispatcher().shutdown();
    source.close();
    info!(
        "[clipwatch] shutdown complete ({} clips dispatched)",
        stats.clips_dispatched
    );

    if let StopReason::CaptureFailed(e) = summary.reason {
        anyhow::bail!("capture failed: {}", e);
    }
    Ok(())
}

fn build_encoder(cfg: &Config) -> Box<dyn ClipEncoder> {
    match cfg.recording.encoder {
        EncoderKind::Ffmpeg => Box::new(FfmpegEncoder::new(
            cfg.recording.ffmpeg_bin.clone(),
            cfg.recording.codec.clone(),
        )),
        EncoderKind::Raw => Box::new(RawClipEncoder::new()),
    }
}

fn build_notifier(cfg: &Config) -> anyhow::Result<Box<dyn Notifier>> {
    if cfg.email_notification.enabled {
        info!("[clipwatch] email notification is enabled");
        Ok(Box::new(EmailNotifier::new(&cfg.email_notification)?))
    } else {
        info!("[clipwatch] email notification is disabled, logging only");
        Ok(Box::new(LogNotifier))
    }
}
