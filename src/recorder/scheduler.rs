// src/recorder/scheduler.rs
//
// Single worker thread fed through a bounded channel: jobs are encoded and
// notified strictly one after another, in dispatch order.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, Sender, bounded};

use super::{ClipEncoder, SchedulerConfig};
use crate::core::logging::{ComponentLogger, LogContext};
use crate::engine::{JobDispatcher, SaveJob};
use crate::notify::{Notifier, clip_message, clip_subject};

#[derive(Default)]
struct Shared {
    dispatched: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicBool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: bool,
}

/// Marks the one job currently being encoded; cleared on drop.
pub struct EncodeHandle<'a> {
    shared: &'a Shared,
    job_id: String,
    started: Instant,
}

impl<'a> EncodeHandle<'a> {
    fn acquire(shared: &'a Shared, job_id: &str) -> Self {
        let was_busy = shared.in_flight.swap(true, Ordering::SeqCst);
        assert!(!was_busy, "second encode started while {} in flight", job_id);
        Self {
            shared,
            job_id: job_id.to_string(),
            started: Instant::now(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for EncodeHandle<'_> {
    fn drop(&mut self) {
        self.shared.in_flight.store(false, Ordering::SeqCst);
    }
}

pub struct SaveScheduler {
    tx: Option<Sender<SaveJob>>,
    worker: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
    output_dir: PathBuf,
}

impl SaveScheduler {
    pub fn start(
        cfg: SchedulerConfig,
        encoder: Box<dyn ClipEncoder>,
        notifier: Box<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&cfg.output_dir)?;

        let (tx, rx) = bounded::<SaveJob>(cfg.queue_depth.max(1));
        let shared = Arc::new(Shared::default());

        let worker = {
            let shared = shared.clone();
            let dir = cfg.output_dir.clone();
            std::thread::Builder::new()
                .name("clip-saver".into())
                .spawn(move || run_save_worker(rx, encoder, notifier, &dir, &shared))?
        };

        let scheduler = Self {
            tx: Some(tx),
            worker: Some(worker),
            shared,
            output_dir: cfg.output_dir,
        };
        scheduler.info(&format!("started, output dir {:?}", scheduler.output_dir));
        Ok(scheduler)
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            dispatched: self.shared.dispatched.load(Ordering::Relaxed),
            completed: self.shared.completed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
            in_flight: self.shared.in_flight.load(Ordering::SeqCst),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Waits until every dispatched job has finished (or failed).
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let s = self.stats();
            if !s.in_flight && s.completed + s.failed >= s.dispatched {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Closes the queue and joins the worker once all queued jobs ran.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // dropping the sender ends the worker loop after the queue drains
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            self.info("waiting for outstanding clip saves");
            if handle.join().is_err() {
                self.error("save worker panicked");
            }
            let s = self.stats();
            self.info(&format!(
                "stopped: {} dispatched, {} saved, {} failed",
                s.dispatched, s.completed, s.failed
            ));
        }
    }
}

impl JobDispatcher for SaveScheduler {
    fn dispatch(&self, job: SaveJob) {
        let Some(tx) = &self.tx else {
            self.error(&format!("scheduler closed, dropping {}", job.id));
            return;
        };

        let id = job.id.clone();
        self.shared.dispatched.fetch_add(1, Ordering::Relaxed);
        // blocks only while a job is running and another is already queued
        if tx.send(job).is_err() {
            self.shared.failed.fetch_add(1, Ordering::Relaxed);
            self.error(&format!("save worker gone, dropping {}", id));
        } else {
            self.debug(&format!("queued {}", id));
        }
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        self.close();
    }
}

impl ComponentLogger for SaveScheduler {
    fn log_context(&self) -> LogContext {
        LogContext::new("Scheduler", "clip-saver")
    }
}

fn run_save_worker(
    rx: Receiver<SaveJob>,
    mut encoder: Box<dyn ClipEncoder>,
    notifier: Box<dyn Notifier>,
    dir: &Path,
    shared: &Shared,
) {
    for job in rx.iter() {
        let ctx = LogContext::new("SaveWorker", "clip-saver").with_clip(&job.id);
        let handle = EncodeHandle::acquire(shared, &job.id);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            save_clip(&job, encoder.as_mut(), notifier.as_ref(), dir)
        }));

        match outcome {
            Ok(Ok(path)) => {
                shared.completed.fetch_add(1, Ordering::Relaxed);
                log::info!(
                    "{}",
                    ctx.format(&format!(
                        "saved {} frames to {:?} in {:.2?}",
                        job.len(),
                        path,
                        handle.elapsed()
                    ))
                );
            }
            Ok(Err(e)) => {
                shared.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("{}", ctx.format(&format!("clip save failed: {:#}", e)));
            }
            Err(_) => {
                shared.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("{}", ctx.format("clip save panicked"));
            }
        }
        drop(handle);
    }
}

fn save_clip(
    job: &SaveJob,
    encoder: &mut dyn ClipEncoder,
    notifier: &dyn Notifier,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    let path = encoder
        .encode(job, dir)
        .with_context(|| format!("encoding {}", job.id))?;

    notifier
        .notify_video(&clip_subject(&job.created), &clip_message(&job.created), &path)
        .with_context(|| format!("notifying {:?}", path))?;

    Ok(path)
}
