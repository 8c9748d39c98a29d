// src/recorder/sink_raw.rs
//
// Lossless clip container: a small header followed by length-prefixed BGR24
// frames, all integers big endian.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::ClipEncoder;
use crate::engine::SaveJob;
use crate::types::{Frame, frame_len};

const MAGIC: &[u8; 4] = b"RFMV";
const VERSION: u16 = 1;
pub const RAW_EXTENSION: &str = "rfmv";

pub struct RawClipEncoder;

impl RawClipEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RawClipEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipEncoder for RawClipEncoder {
    fn encode(&mut self, job: &SaveJob, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", job.id, RAW_EXTENSION));
        let mut w = BufWriter::new(File::create(&path)?);

        w.write_all(MAGIC)?;
        w.write_u16::<BigEndian>(VERSION)?;
        w.write_u32::<BigEndian>(job.width)?;
        w.write_u32::<BigEndian>(job.height)?;
        w.write_f64::<BigEndian>(job.fps)?;
        w.write_u32::<BigEndian>(job.frames.len() as u32)?;

        for frame in &job.frames {
            w.write_u64::<BigEndian>(frame.seq)?;
            w.write_u64::<BigEndian>(frame.utc_ns)?;
            w.write_u32::<BigEndian>(frame.pixels.len() as u32)?;
            w.write_all(&frame.pixels)?;
        }

        w.flush()?;
        log::debug!("[raw_sink] wrote {} frames to {:?}", job.frames.len(), path);
        Ok(path)
    }
}

#[derive(Debug)]
pub struct RawClip {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frames: Vec<Frame>,
}

pub fn read_raw_clip(path: &Path) -> Result<RawClip> {
    let mut r = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(anyhow!("invalid RFMV magic in {:?}", path));
    }

    let version = r.read_u16::<BigEndian>()?;
    if version != VERSION {
        bail!("unsupported RFMV version {}", version);
    }

    let width = r.read_u32::<BigEndian>()?;
    let height = r.read_u32::<BigEndian>()?;
    let fps = r.read_f64::<BigEndian>()?;
    let count = r.read_u32::<BigEndian>()? as usize;
    let expected = frame_len(width, height);

    let mut frames = Vec::with_capacity(count);
    for i in 0..count {
        let seq = r.read_u64::<BigEndian>()?;
        let utc_ns = r.read_u64::<BigEndian>()?;
        let len = r.read_u32::<BigEndian>()? as usize;
        if len != expected {
            bail!("frame {} has {} bytes, expected {}", i, len, expected);
        }

        let mut pixels = vec![0u8; len];
        r.read_exact(&mut pixels)?;
        frames.push(Frame::new(seq, utc_ns, width, height, pixels));
    }

    Ok(RawClip {
        width,
        height,
        fps,
        frames,
    })
}
