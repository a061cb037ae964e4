//! Sequential capture sessions on a dedicated worker thread.
//!
//! A [`Recorder`] owns one worker thread that owns the
//! [`StreamingWavWriter`]. Start, sample delivery, stop and delete requests
//! are queued on a channel and executed strictly in submission order, so at
//! most one file mutation is ever in flight.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{ConfigError, RecorderConfig};
use crate::error::WavError;
use crate::wav::{StreamingWavWriter, WavFormat};

/// Errors reported by a [`Recorder`].
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The session's writer failed; the session was abandoned.
    #[error(transparent)]
    Wav(#[from] WavError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A session is in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// No session is in progress.
    #[error("not recording")]
    NotRecording,

    /// The worker thread could not be started.
    #[error("failed to spawn recorder thread: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread has exited.
    #[error("recorder worker is no longer running")]
    WorkerGone,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    /// File the session wrote.
    pub path: PathBuf,
    /// Samples kept after the end margin was trimmed.
    pub samples: u64,
    /// Duration kept, in milliseconds.
    pub duration_ms: u64,
    /// Whether the session hit the maximum duration.
    pub auto_stopped: bool,
}

type Reply<T> = Sender<Result<T, RecorderError>>;

enum Command {
    Start(Reply<()>),
    Push(Vec<i16>),
    Stop(Reply<RecordingSummary>),
    IsRecording(Sender<bool>),
    Delete(Reply<bool>),
    Shutdown,
}

/// Handle to a capture worker.
///
/// Dropping the handle stops any active session (trimming the end margin)
/// and joins the worker.
#[derive(Debug)]
pub struct Recorder {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl Recorder {
    /// Validates `config` and starts the worker thread.
    pub fn spawn(config: RecorderConfig) -> Result<Self, RecorderError> {
        config.validate()?;
        let (commands, inbox) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("wavtail-recorder".to_string())
            .spawn(move || Worker::new(config).run(inbox))
            .map_err(RecorderError::Spawn)?;

        Ok(Self {
            commands,
            worker: Some(worker),
        })
    }

    /// Starts a session, creating (or truncating) the output file.
    pub fn start(&self) -> Result<(), RecorderError> {
        self.request(Command::Start)?
    }

    /// Queues a buffer of samples. Buffers sent while idle are dropped.
    pub fn push(&self, samples: Vec<i16>) -> Result<(), RecorderError> {
        self.commands
            .send(Command::Push(samples))
            .map_err(|_| RecorderError::WorkerGone)
    }

    /// Stops the session, trims the end margin and closes the file.
    ///
    /// If the session already ended on its own (maximum duration reached or
    /// a write failure), that outcome is returned instead.
    pub fn stop(&self) -> Result<RecordingSummary, RecorderError> {
        self.request(Command::Stop)?
    }

    /// Whether a session is in progress.
    pub fn is_recording(&self) -> Result<bool, RecorderError> {
        self.request(Command::IsRecording)
    }

    /// Deletes the output file. Returns false if there was nothing to delete.
    pub fn delete(&self) -> Result<bool, RecorderError> {
        self.request(Command::Delete)?
    }

    /// Stops any active session and waits for the worker to exit.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn request<T>(&self, command: impl FnOnce(Sender<T>) -> Command) -> Result<T, RecorderError> {
        let (reply, response) = mpsc::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| RecorderError::WorkerGone)?;
        response.recv().map_err(|_| RecorderError::WorkerGone)
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.commands.send(Command::Shutdown);
            if worker.join().is_err() {
                warn!("recorder worker panicked");
            }
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.join();
    }
}

struct Session {
    writer: StreamingWavWriter,
    lead_in_remaining: u64,
}

struct Worker {
    config: RecorderConfig,
    format: WavFormat,
    session: Option<Session>,
    finished: Option<Result<RecordingSummary, RecorderError>>,
}

impl Worker {
    fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            format: WavFormat::CAPTURE,
            session: None,
            finished: None,
        }
    }

    fn run(mut self, inbox: Receiver<Command>) {
        while let Ok(command) = inbox.recv() {
            match command {
                Command::Start(reply) => {
                    let _ = reply.send(self.start());
                }
                Command::Push(samples) => self.push(&samples),
                Command::Stop(reply) => {
                    let _ = reply.send(self.stop());
                }
                Command::IsRecording(reply) => {
                    let _ = reply.send(self.session.is_some());
                }
                Command::Delete(reply) => {
                    let _ = reply.send(self.delete());
                }
                Command::Shutdown => break,
            }
        }

        if self.session.is_some() {
            match self.stop() {
                Ok(summary) => info!(
                    "stopped recording '{}' on shutdown",
                    summary.path.display()
                ),
                Err(err) => warn!("recording abandoned on shutdown: {}", err),
            }
        }
    }

    fn samples_for_millis(&self, millis: u64) -> u64 {
        self.format.bytes_for_millis(millis) / u64::from(self.format.block_align())
    }

    fn max_samples(&self) -> Option<u64> {
        match self.config.max_duration_ms {
            0 => None,
            ms => Some(self.samples_for_millis(ms)),
        }
    }

    fn start(&mut self) -> Result<(), RecorderError> {
        if self.session.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        let writer = StreamingWavWriter::create(&self.config.output_path)?;
        info!("recording to '{}'", writer.path().display());
        self.finished = None;
        self.session = Some(Session {
            writer,
            lead_in_remaining: self.samples_for_millis(self.config.lead_in_ms),
        });
        Ok(())
    }

    fn push(&mut self, samples: &[i16]) {
        let max_samples = self.max_samples();
        let Some(session) = self.session.as_mut() else {
            debug!("dropped {} samples while idle", samples.len());
            return;
        };

        let skip = session.lead_in_remaining.min(samples.len() as u64) as usize;
        session.lead_in_remaining -= skip as u64;
        let samples = &samples[skip..];

        let count = match max_samples {
            Some(max) => {
                let room = max.saturating_sub(session.writer.sample_count());
                samples.len().min(usize::try_from(room).unwrap_or(usize::MAX))
            }
            None => samples.len(),
        };

        if let Err(err) = session.writer.append(samples, count) {
            warn!("recording abandoned: {}", err);
            self.session = None;
            self.finished = Some(Err(err.into()));
            return;
        }

        let reached_max = max_samples.is_some_and(|max| session.writer.sample_count() >= max);
        if reached_max {
            info!("maximum duration reached, stopping");
            let result = self.finish(true);
            self.finished = Some(result);
        }
    }

    fn stop(&mut self) -> Result<RecordingSummary, RecorderError> {
        if self.session.is_some() {
            return self.finish(false);
        }
        self.finished.take().unwrap_or(Err(RecorderError::NotRecording))
    }

    fn finish(&mut self, auto_stopped: bool) -> Result<RecordingSummary, RecorderError> {
        let Some(Session { mut writer, .. }) = self.session.take() else {
            return Err(RecorderError::NotRecording);
        };

        writer.truncate_tail(self.config.end_margin_ms)?;
        let summary = RecordingSummary {
            path: writer.path().to_path_buf(),
            samples: writer.sample_count(),
            duration_ms: writer.duration_millis(),
            auto_stopped,
        };
        writer.close()?;

        info!(
            "saved {} ms to '{}'",
            summary.duration_ms,
            summary.path.display()
        );
        Ok(summary)
    }

    fn delete(&mut self) -> Result<bool, RecorderError> {
        if self.session.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        self.finished = None;
        match fs::remove_file(&self.config.output_path) {
            Ok(()) => {
                info!("deleted '{}'", self.config.output_path.display());
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(WavError::Io(err).into()),
        }
    }
}
