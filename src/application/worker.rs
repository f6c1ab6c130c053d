//! Background submission worker.
//!
//! The prediction call blocks on the network, so it runs on its own thread
//! and reports back over a channel. The UI loop polls the handle and never
//! waits on the request itself.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::domain::{PredictionError, PredictionResult, RequestPayload, ServiceHealth};
use crate::ports::PredictionApi;

/// Settled outcome of one submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// Generation of the submission that produced this outcome
    pub generation: u64,
    pub result: Result<PredictionResult, PredictionError>,
}

/// Handle to a running submission.
///
/// Dropping the handle drops the receiver: a late response is then sent
/// into a closed channel and discarded.
pub struct SubmissionHandle {
    generation: u64,
    outcome_rx: Receiver<SubmissionOutcome>,
    _handle: JoinHandle<()>,
}

impl SubmissionHandle {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking check for the outcome.
    ///
    /// # Errors
    /// `TryRecvError::Empty` while in flight, `Disconnected` if the worker
    /// died without answering.
    pub fn try_recv(&self) -> Result<SubmissionOutcome, TryRecvError> {
        self.outcome_rx.try_recv()
    }

    /// Block up to `timeout` for the outcome.
    ///
    /// # Errors
    /// `RecvTimeoutError::Timeout` if still in flight, `Disconnected` if the
    /// worker died without answering.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SubmissionOutcome, RecvTimeoutError> {
        self.outcome_rx.recv_timeout(timeout)
    }
}

/// Runs one prediction request off the calling thread.
pub struct SubmissionWorker;

impl SubmissionWorker {
    /// Spawn a background request.
    pub fn spawn<A>(api: Arc<A>, payload: RequestPayload, generation: u64) -> SubmissionHandle
    where
        A: PredictionApi + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run(&*api, &payload, generation, &tx);
        });

        SubmissionHandle {
            generation,
            outcome_rx: rx,
            _handle: handle,
        }
    }

    /// Query the service's health off the calling thread.
    ///
    /// The receiver yields exactly one answer; it reports `Disconnected` if
    /// the thread died first.
    pub fn spawn_health<A>(api: Arc<A>) -> Receiver<Result<ServiceHealth, PredictionError>>
    where
        A: PredictionApi + 'static,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            if tx.send(api.health()).is_err() {
                tracing::debug!("Health check answered after its receiver was dropped");
            }
        });

        rx
    }

    fn run<A>(api: &A, payload: &RequestPayload, generation: u64, tx: &Sender<SubmissionOutcome>)
    where
        A: PredictionApi + ?Sized,
    {
        tracing::debug!("Submission {} started", generation);
        let result = api.predict(payload);

        if tx.send(SubmissionOutcome { generation, result }).is_err() {
            tracing::debug!("Submission {} settled after being abandoned", generation);
        }
    }
}
