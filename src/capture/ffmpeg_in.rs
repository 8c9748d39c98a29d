// src/capture/ffmpeg_in.rs
use std::io::{ErrorKind, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{Context, Result, bail};

use super::FrameSource;
use crate::config::WebcamConfig;
use crate::core::timestamp::utc_ns_now;
use crate::types::{Frame, frame_len};

/// Webcam capture through an `ffmpeg` child emitting raw BGR24 on stdout.
pub struct FfmpegSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    fps: f64,
    next_seq: u64,
}

impl FfmpegSource {
    /// Opens the device at the rate it reports through `ffprobe_bin`, or at
    /// `cam.default_fps` when the query fails.
    pub fn open(bin: &str, ffprobe_bin: &str, cam: &WebcamConfig) -> Result<Self> {
        let device = format!("/dev/video{}", cam.device_index);
        let fps = match device_frame_rate(ffprobe_bin, &device) {
            Ok(fps) => {
                log::info!("[capture] {} reports {} fps", device, fps);
                fps
            }
            Err(e) => {
                log::warn!(
                    "[capture] frame rate of {} unknown ({:#}), using configured default {} fps",
                    device,
                    e,
                    cam.default_fps
                );
                cam.default_fps as f64
            }
        };

        let mut child = Command::new(bin)
            .args(capture_args(&device, cam, fps))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("spawning {} for {}", bin, device))?;

        let stdout = child.stdout.take().context("ffmpeg stdout not captured")?;
        log::info!("[capture] {} opened at {}x{} @ {} fps", device, cam.width, cam.height, fps);

        Ok(Self {
            child,
            stdout,
            width: cam.width,
            height: cam.height,
            fps,
            next_seq: 1,
        })
    }

    pub fn close(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Asks `ffprobe` for the average frame rate of the first video stream.
pub fn device_frame_rate(ffprobe_bin: &str, device: &str) -> Result<f64> {
    let output = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-f",
            "v4l2",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=avg_frame_rate",
            "-of",
            "default=nw=1:nk=1",
            device,
        ])
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("running {}", ffprobe_bin))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            ffprobe_bin,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let text = String::from_utf8_lossy(&output.stdout);
    parse_frame_rate(&text).with_context(|| format!("unusable frame rate {:?}", text.trim()))
}

/// Parses `30`, `30/1` or `30000/1001`. Zero, negative and non-finite rates
/// are rejected.
pub fn parse_frame_rate(text: &str) -> Option<f64> {
    let text = text.lines().next()?.trim();
    let fps = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

pub fn capture_args(device: &str, cam: &WebcamConfig, fps: f64) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "v4l2".into(),
        "-framerate".into(),
        fps.to_string(),
        "-video_size".into(),
        format!("{}x{}", cam.width, cam.height),
        "-i".into(),
        device.to_string(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "bgr24".into(),
        "-".into(),
    ]
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut pixels = vec![0u8; frame_len(self.width, self.height)];
        let mut filled = 0;

        while filled < pixels.len() {
            match self.stdout.read(&mut pixels[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => bail!("capture stream ended mid-frame ({} bytes)", filled),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("reading frame from ffmpeg"),
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        Ok(Some(Frame::new(seq, utc_ns_now(), self.width, self.height, pixels)))
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.close();
    }
}
