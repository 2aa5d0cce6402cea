//! Background execution - one-shot simulation requests over channels
//!
//! A `SimulationWorker` owns a thread that runs the same engine logic as
//! `simulate`, fed by a job channel and answering on a reply channel. Each
//! job is tagged with a sequence number; `SequenceGate` decides whether a
//! reply still matters, so results for abandoned inputs never overwrite the
//! outcome of a newer request.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::error::LabError;
use crate::engine::{simulate, SimulationOptions, SimulationRequest};
use crate::entities::SimulationResult;

/// A unit of work for the worker thread
#[derive(Debug, Clone)]
pub struct SimulationJob {
    pub seq: u64,
    pub request: SimulationRequest,
    pub options: SimulationOptions,
}

/// The worker's answer to one job
#[derive(Debug)]
pub struct SimulationReply {
    pub seq: u64,
    pub outcome: Result<SimulationResult, LabError>,
}

/// The worker thread is gone and cannot take jobs
#[derive(Debug, Error)]
#[error("Simulation worker has stopped")]
pub struct WorkerStopped;

/// Dedicated simulation thread
pub struct SimulationWorker {
    jobs: Option<Sender<SimulationJob>>,
    replies: Receiver<SimulationReply>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    /// Spawn the worker thread
    pub fn spawn() -> std::io::Result<Self> {
        let (job_tx, job_rx) = unbounded::<SimulationJob>();
        let (reply_tx, reply_rx) = unbounded::<SimulationReply>();

        let handle = thread::Builder::new()
            .name("sanity-lab-sim".into())
            .spawn(move || {
                for job in job_rx.iter() {
                    tracing::debug!(seq = job.seq, "worker picked up job");
                    let outcome = simulate(&job.request, &job.options);
                    if reply_tx
                        .send(SimulationReply {
                            seq: job.seq,
                            outcome,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                tracing::debug!("simulation worker exiting");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            replies: reply_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job
    pub fn submit(&self, job: SimulationJob) -> Result<(), WorkerStopped> {
        match self.jobs {
            Some(ref jobs) => jobs.send(job).map_err(|_| WorkerStopped),
            None => Err(WorkerStopped),
        }
    }

    /// Channel carrying replies in completion order
    pub fn replies(&self) -> &Receiver<SimulationReply> {
        &self.replies
    }

    /// Close the job channel and wait for the thread to finish its queue
    pub fn shutdown(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Issues increasing sequence numbers and recognises the latest one
#[derive(Debug, Clone, Default)]
pub struct SequenceGate {
    latest: u64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number; it becomes the only current one
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// The most recently issued number, if any
    pub fn latest(&self) -> Option<u64> {
        (self.latest > 0).then_some(self.latest)
    }

    /// True only for the most recently issued number
    pub fn is_current(&self, seq: u64) -> bool {
        seq != 0 && seq == self.latest
    }
}

/// One worker plus a gate: the background runner behind a single lab panel
pub struct SimulationPanel {
    worker: SimulationWorker,
    gate: SequenceGate,
    delivered: bool,
}

impl SimulationPanel {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            worker: SimulationWorker::spawn()?,
            gate: SequenceGate::new(),
            delivered: false,
        })
    }

    /// Submit new inputs; any pending older request becomes stale
    pub fn submit(
        &mut self,
        request: SimulationRequest,
        options: SimulationOptions,
    ) -> Result<u64, WorkerStopped> {
        let seq = self.gate.issue();
        self.delivered = false;
        self.worker.submit(SimulationJob {
            seq,
            request,
            options,
        })?;
        Ok(seq)
    }

    /// Sequence number of the request whose result is wanted
    pub fn latest_seq(&self) -> Option<u64> {
        self.gate.latest()
    }

    /// Non-blocking: the current request's outcome if it has arrived
    pub fn try_latest(&mut self) -> Option<Result<SimulationResult, LabError>> {
        loop {
            match self.worker.replies().try_recv() {
                Ok(reply) => {
                    if let Some(outcome) = self.accept(reply) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Block up to `timeout` for the current request's outcome
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<Result<SimulationResult, LabError>> {
        if self.delivered || self.gate.latest().is_none() {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.worker.replies().recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(outcome) = self.accept(reply) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }

    fn accept(&mut self, reply: SimulationReply) -> Option<Result<SimulationResult, LabError>> {
        if self.gate.is_current(reply.seq) && !self.delivered {
            self.delivered = true;
            Some(reply.outcome)
        } else {
            tracing::debug!(
                seq = reply.seq,
                latest = self.gate.latest(),
                "dropping stale simulation result"
            );
            None
        }
    }
}
