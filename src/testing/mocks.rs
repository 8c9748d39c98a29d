use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};

use crate::capture::FrameSource;
use crate::engine::{JobDispatcher, SaveJob};
use crate::notify::Notifier;
use crate::recorder::ClipEncoder;
use crate::types::Frame;

/// Keeps every dispatched job, single-threaded.
#[derive(Default)]
pub struct CollectingDispatcher {
    jobs: RefCell<Vec<SaveJob>>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<SaveJob> {
        self.jobs.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.borrow().is_empty()
    }
}

impl JobDispatcher for CollectingDispatcher {
    fn dispatch(&self, job: SaveJob) {
        self.jobs.borrow_mut().push(job);
    }
}

#[derive(Debug, Clone)]
pub struct EncodeRecord {
    pub job_id: String,
    pub frame_seqs: Vec<u64>,
    pub started: Instant,
    pub finished: Instant,
}

#[derive(Default)]
pub struct EncodeLog {
    pub records: Mutex<Vec<EncodeRecord>>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl EncodeLog {
    pub fn records(&self) -> Vec<EncodeRecord> {
        self.records.lock().expect("lock records").clone()
    }
}

/// Pretends to encode: sleeps, records timing and concurrency, writes an
/// empty file.
pub struct MockEncoder {
    log: Arc<EncodeLog>,
    delay: Duration,
    fail_every: Option<usize>,
    calls: usize,
}

impl MockEncoder {
    pub fn new(delay: Duration) -> (Self, Arc<EncodeLog>) {
        let log = Arc::new(EncodeLog::default());
        (
            Self {
                log: log.clone(),
                delay,
                fail_every: None,
                calls: 0,
            },
            log,
        )
    }

    /// Fail on every `n`-th call (1-based).
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }
}

impl ClipEncoder for MockEncoder {
    fn encode(&mut self, job: &SaveJob, dir: &Path) -> Result<PathBuf> {
        self.calls += 1;
        let started = Instant::now();

        let active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_active.fetch_max(active, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.log.active.fetch_sub(1, Ordering::SeqCst);

        self.log.records.lock().expect("lock records").push(EncodeRecord {
            job_id: job.id.clone(),
            frame_seqs: job.frames.iter().map(|f| f.seq).collect(),
            started,
            finished: Instant::now(),
        });

        if matches!(self.fail_every, Some(n) if self.calls % n == 0) {
            bail!("mock encoder failure on call {}", self.calls);
        }

        let path = dir.join(format!("{}-{}.mock", job.id, self.calls));
        std::fs::write(&path, b"")?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    pub video: PathBuf,
}

/// Records notifications; optionally fails every call.
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> (Self, Arc<Mutex<Vec<Notification>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: sent.clone(),
                fail: false,
            },
            sent,
        )
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<Notification>>>) {
        let (mut n, sent) = Self::new();
        n.fail = true;
        (n, sent)
    }
}

impl Notifier for MockNotifier {
    fn notify_video(&self, subject: &str, message: &str, video: &Path) -> Result<()> {
        self.sent.lock().expect("lock notifications").push(Notification {
            subject: subject.to_string(),
            message: message.to_string(),
            video: video.to_path_buf(),
        });
        if self.fail {
            bail!("mock notifier failure");
        }
        Ok(())
    }
}

/// Replays a fixed list of frames, optionally failing at the end.
pub struct VecSource {
    frames: VecDeque<Frame>,
    fps: f64,
    fail_at_end: bool,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        Self {
            frames: frames.into(),
            fps,
            fail_at_end: false,
        }
    }

    pub fn failing_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.fail_at_end => bail!("device unplugged"),
            None => Ok(None),
        }
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}

/// Frame whose pixels are all `value`, for tests.
pub fn solid_frame(seq: u64, width: u32, height: u32, value: u8) -> Frame {
    Frame::new(seq, seq * 1_000, width, height, vec![value; crate::types::frame_len(width, height)])
}
