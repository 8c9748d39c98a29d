// src/recorder/sink_ffmpeg.rs
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result, bail};

use super::ClipEncoder;
use crate::engine::SaveJob;
use crate::types::frame_len;

/// Pipes raw BGR24 frames into an `ffmpeg` child and lets it write an mp4.
pub struct FfmpegEncoder {
    bin: String,
    codec: String,
    extension: String,
    last_pid: Option<u32>,
}

impl FfmpegEncoder {
    pub fn new(bin: impl Into<String>, codec: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            codec: codec.into(),
            extension: "mp4".to_string(),
            last_pid: None,
        }
    }

    pub fn args(&self, job: &SaveJob, out: &Path) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "bgr24".into(),
            "-s".into(),
            format!("{}x{}", job.width, job.height),
            "-r".into(),
            format!("{}", job.fps),
            "-i".into(),
            "-".into(),
            "-an".into(),
            "-c:v".into(),
            self.codec.clone(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            out.to_string_lossy().into_owned(),
        ]
    }
}

impl FfmpegEncoder {
    /// Pid of the most recently spawned ffmpeg child.
    pub fn last_pid(&self) -> Option<u32> {
        self.last_pid
    }
}

impl ClipEncoder for FfmpegEncoder {
    fn encode(&mut self, job: &SaveJob, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", job.id, self.extension));
        let expected = frame_len(job.width, job.height);

        let mut child = Command::new(&self.bin)
            .args(self.args(job, &path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning {}", self.bin))?;
        self.last_pid = Some(child.id());

        // drained concurrently so a chatty ffmpeg cannot fill the pipe and stall
        let stderr_reader = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = err.read_to_string(&mut text);
                text
            })
        });

        if let Err(e) = feed_frames(&mut child, job, expected) {
            abort(&mut child);
            if let Some(reader) = stderr_reader {
                let _ = reader.join();
            }
            return Err(e);
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();
        if !status.success() {
            bail!("ffmpeg failed with {}: {}", status, stderr.trim());
        }

        log::debug!("[ffmpeg_sink] wrote {} frames to {:?}", job.frames.len(), path);
        Ok(path)
    }
}

fn feed_frames(child: &mut Child, job: &SaveJob, expected: usize) -> Result<()> {
    let mut stdin = child.stdin.take().context("ffmpeg stdin not captured")?;
    for (i, frame) in job.frames.iter().enumerate() {
        if frame.pixels.len() != expected {
            bail!("frame {} has {} bytes, expected {}", i, frame.pixels.len(), expected);
        }
        stdin
            .write_all(&frame.pixels)
            .context("writing frame to ffmpeg")?;
    }
    // stdin dropped here: EOF finalizes the container
    Ok(())
}

/// Kill and reap, so a failed encode leaves no zombie behind.
fn abort(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frame;

    #[test]
    fn test_args_describe_raw_input() {
        let enc = FfmpegEncoder::new("ffmpeg", "mpeg4");
        let job = SaveJob::new(vec![Frame::blank(640, 480)], 10.0, 640, 480);
        let args = enc.args(&job, Path::new("/tmp/out.mp4"));

        let pos = |s: &str| args.iter().position(|a| a == s).unwrap();
        assert_eq!(args[pos("-s") + 1], "640x480");
        assert_eq!(args[pos("-r") + 1], "10");
        assert_eq!(args[pos("-c:v") + 1], "mpeg4");
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut enc = FfmpegEncoder::new("/nonexistent/ffmpeg-bin", "mpeg4");
        let job = SaveJob::new(vec![Frame::blank(2, 2)], 10.0, 2, 2);
        assert!(enc.encode(&job, dir.path()).is_err());
    }

    #[cfg(target_os = "linux")]
    fn assert_reaped(enc: &FfmpegEncoder) {
        let pid = enc.last_pid().expect("child was spawned");
        assert!(
            !Path::new(&format!("/proc/{}", pid)).exists(),
            "child {} left behind",
            pid
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_child_reaped_after_broken_pipe() {
        let dir = tempfile::tempdir().unwrap();
        // `sh` rejects the ffmpeg flags and exits, so writing frames fails
        let mut enc = FfmpegEncoder::new("sh", "mpeg4");
        let frames = (1..=50u64)
            .map(|seq| Frame::new(seq, seq, 640, 480, vec![0; 640 * 480 * 3]))
            .collect();
        let job = SaveJob::new(frames, 10.0, 640, 480);

        let err = enc.encode(&job, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("ffmpeg"));
        assert_reaped(&enc);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_child_reaped_after_bad_frame_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut enc = FfmpegEncoder::new("sleep", "mpeg4");
        let job = SaveJob::new(vec![Frame::new(1, 1, 2, 2, vec![0; 5])], 10.0, 2, 2);

        let err = enc.encode(&job, dir.path()).unwrap_err();
        assert!(err.to_string().contains("expected 12"));
        assert_reaped(&enc);
    }
}
