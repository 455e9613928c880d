//! Sequential script execution with dead-reckoned position tracking.
//!
//! A [`ScriptRunner`] owns one job slot. A job sends its frames in order and
//! waits after each one for as long as the motors need to finish it, which
//! is the only thing that tells us where the head is.
//!
//! Cancellation interrupts the wait immediately and sends nothing further.
//! The frame already on the head keeps running, so the estimate goes on
//! extrapolating toward that frame's target; [`ScriptRunner::halt`] also
//! sends a stop frame and freezes the estimate where it stands.

use crate::transport::{Transport, TransportError};
use orbit_core::{Calibration, Kinematics, MotionFrame, Vector2};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::oneshot::{self, error::TryRecvError},
    task::JoinHandle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("script {0} is still running")]
    AlreadyRunning(JobId),
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("frame {index} could not be sent: {source}")]
    Transport {
        index: usize,
        #[source]
        source: TransportError,
    },
    #[error("frame {index} has no usable speed for its displacement")]
    InvalidPacing { index: usize },
    #[error("worker stopped before reporting an outcome")]
    Abandoned,
}

/// How a job ended.
#[derive(Clone, Debug)]
pub enum JobOutcome {
    Completed,
    Cancelled,
    Failed(Arc<JobError>),
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Called once every frame of a job has finished.
pub type CompletionHandler<T> = Box<dyn FnOnce(&[MotionFrame], &ScriptRunner<T>) + Send>;

enum SlotState {
    Idle,
    Running {
        id: JobId,
        cancel: Option<oneshot::Sender<()>>,
    },
}

struct Slot {
    next_id: u64,
    state: SlotState,
    last_outcome: Option<JobOutcome>,
}

struct Inner<T> {
    transport: T,
    calibration: Calibration,
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
    // Serialises writes so a halt's stop frame cannot be overtaken by a
    // move the worker is about to send. Never taken by position queries.
    send: Mutex<()>,
    kinematics: Mutex<Kinematics>,
}

/// Runs one script at a time against a transport.
///
/// Cloning is cheap and every clone drives the same slot and estimate.
/// Positions are relative to wherever the head was when the runner was
/// created.
pub struct ScriptRunner<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ScriptRunner<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

impl<T: Transport> ScriptRunner<T> {
    /// Creates a runner with the default head calibration that spawns its
    /// jobs on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(transport: T) -> Self {
        Self::with_runtime(transport, Calibration::default(), Handle::current())
    }

    pub fn with_runtime(transport: T, calibration: Calibration, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                calibration,
                runtime,
                slot: Arc::new(Mutex::new(Slot {
                    next_id: 1,
                    state: SlotState::Idle,
                    last_outcome: None,
                })),
                send: Mutex::new(()),
                kinematics: Mutex::new(Kinematics::new(now())),
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn calibration(&self) -> &Calibration {
        &self.inner.calibration
    }

    /// Starts executing `frames` in order.
    ///
    /// Fails without side effects while another script is running. The
    /// returned handle can be awaited for the outcome or dropped to let the
    /// job run detached. `on_complete` only runs when every frame finished;
    /// the slot is already free by then, so it may start the next script.
    pub fn run(
        &self,
        frames: Vec<MotionFrame>,
        on_complete: Option<CompletionHandler<T>>,
    ) -> Result<ScriptHandle, RunError> {
        let (cancel, cancelled) = oneshot::channel();
        let id = {
            let mut slot = self.inner.slot.lock();
            if let SlotState::Running { id, .. } = slot.state {
                tracing::debug!(running = %id, "rejecting script submission");
                return Err(RunError::AlreadyRunning(id));
            }
            let id = JobId(slot.next_id);
            slot.next_id += 1;
            slot.state = SlotState::Running {
                id,
                cancel: Some(cancel),
            };
            id
        };

        // owned by the task so the slot is freed even if it never gets polled
        let release = SlotRelease {
            slot: self.inner.slot.clone(),
            id,
            outcome: None,
        };
        let runner = self.clone();
        let task = self.inner.runtime.spawn(async move {
            runner
                .execute(id, frames, cancelled, on_complete, release)
                .await
        });

        Ok(ScriptHandle { id, task })
    }

    /// Interrupts the running script, if any. Returns whether a job was
    /// signalled.
    pub fn abort(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        let SlotState::Running { id, cancel } = &mut slot.state else {
            return false;
        };
        let Some(cancel) = cancel.take() else {
            return false;
        };
        tracing::info!(job = %id, "abort requested");
        // the worker may have just finished on its own
        let _ = cancel.send(());
        true
    }

    /// Aborts the running script, stops both motors and freezes the
    /// position estimate at its current value.
    pub fn halt(&self) -> Result<(), TransportError> {
        self.abort();
        let _send = self.inner.send.lock();
        self.inner.transport.send(&MotionFrame::stop())?;
        self.inner.kinematics.lock().settle(now());
        tracing::info!("head halted");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.inner.slot.lock().state, SlotState::Running { .. })
    }

    pub fn last_outcome(&self) -> Option<JobOutcome> {
        self.inner.slot.lock().last_outcome.clone()
    }

    /// Estimated position in steps.
    pub fn position_steps(&self) -> Vector2 {
        self.inner.kinematics.lock().position_at(now())
    }

    /// Estimated position in degrees.
    pub fn position_degrees(&self) -> Vector2 {
        self.inner.calibration.to_degrees(self.position_steps())
    }

    pub fn kinematics(&self) -> Kinematics {
        *self.inner.kinematics.lock()
    }

    async fn execute(
        self,
        id: JobId,
        frames: Vec<MotionFrame>,
        mut cancelled: oneshot::Receiver<()>,
        on_complete: Option<CompletionHandler<T>>,
        release: SlotRelease,
    ) -> JobOutcome {
        tracing::info!(
            job = %id,
            frames = frames.len(),
            mode = ?self.inner.transport.write_mode(),
            "script started"
        );

        let outcome = self.play(id, &frames, &mut cancelled).await;
        match &outcome {
            JobOutcome::Completed => tracing::info!(job = %id, "script completed"),
            JobOutcome::Cancelled => tracing::warn!(job = %id, "script cancelled"),
            JobOutcome::Failed(err) => tracing::error!(job = %id, error = %err, "script failed"),
        }
        release.finish(outcome.clone());

        if let (JobOutcome::Completed, Some(on_complete)) = (&outcome, on_complete) {
            on_complete(&frames, &self);
        }
        outcome
    }

    async fn play(
        &self,
        id: JobId,
        frames: &[MotionFrame],
        cancelled: &mut oneshot::Receiver<()>,
    ) -> JobOutcome {
        for (index, frame) in frames.iter().enumerate() {
            let Some(pacing) = frame.pacing() else {
                return JobOutcome::Failed(Arc::new(JobError::InvalidPacing { index }));
            };

            {
                let _send = self.inner.send.lock();
                if !matches!(cancelled.try_recv(), Err(TryRecvError::Empty)) {
                    return JobOutcome::Cancelled;
                }
                self.inner
                    .kinematics
                    .lock()
                    .begin(frame.steps(), frame.speed(), now());
                if let Err(source) = self.inner.transport.send(frame) {
                    self.inner.kinematics.lock().discard();
                    return JobOutcome::Failed(Arc::new(JobError::Transport { index, source }));
                }
            }
            tracing::debug!(
                job = %id,
                index,
                pacing_ms = pacing.as_millis() as u64,
                "sent {}",
                frame
            );

            tokio::select! {
                _ = tokio::time::sleep(pacing) => {}
                _ = &mut *cancelled => return JobOutcome::Cancelled,
            }

            self.inner.kinematics.lock().complete();
        }
        JobOutcome::Completed
    }
}

/// Frees the job slot when the worker ends, however it ends.
struct SlotRelease {
    slot: Arc<Mutex<Slot>>,
    id: JobId,
    outcome: Option<JobOutcome>,
}

impl SlotRelease {
    fn finish(mut self, outcome: JobOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| JobOutcome::Failed(Arc::new(JobError::Abandoned)));
        let mut slot = self.slot.lock();
        if matches!(slot.state, SlotState::Running { id, .. } if id == self.id) {
            slot.state = SlotState::Idle;
        }
        slot.last_outcome = Some(outcome);
    }
}

/// Handle to a submitted script.
#[derive(Debug)]
pub struct ScriptHandle {
    id: JobId,
    task: JoinHandle<JobOutcome>,
}

impl ScriptHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the script to end.
    pub async fn join(self) -> JobOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(job = %self.id, error = %err, "script worker did not finish");
                JobOutcome::Failed(Arc::new(JobError::Abandoned))
            }
        }
    }
}
