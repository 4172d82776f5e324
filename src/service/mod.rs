//! The motion service: a cloneable handle in front of a single worker that
//! owns the backend.
//!
//! Web handlers never touch the backend directly. Each call is queued on a
//! bounded channel and executed by the worker one at a time, in arrival order,
//! so the backend is never entered concurrently.

pub mod request;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::backend::MotionBackend;
use crate::motion::{EventRecord, MotionError, MotionStatus, TriggerId};
use request::{MotionRequest, Reply};

#[derive(Debug, Clone)]
pub struct MotionService {
    tx: mpsc::Sender<MotionRequest>,
}

impl MotionService {
    /// Start the worker on a blocking thread and return a handle to it.
    ///
    /// The worker exits once every `MotionService` clone has been dropped.
    pub fn spawn(backend: Box<dyn MotionBackend>, queue: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue.max(1));
        let worker = tokio::task::spawn_blocking(move || run_worker(backend, rx));
        (Self { tx }, worker)
    }

    async fn call<T>(&self, build: impl FnOnce(Reply<T>) -> MotionRequest) -> Result<T, MotionError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        if self.tx.send(build(resp_tx)).await.is_err() {
            tracing::error!("Motion worker channel closed");
            return Err(MotionError::WorkerUnavailable);
        }
        resp_rx.await.map_err(|_| MotionError::WorkerUnavailable)?
    }

    pub async fn initialize(&self) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::Initialize { respond_to }).await
    }

    pub async fn home_all(&self) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::HomeAll { respond_to }).await
    }

    pub async fn move_to(&self, positions: Vec<f64>) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::MoveTo { positions, respond_to }).await
    }

    pub async fn emergency_stop(&self) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::EmergencyStop { respond_to }).await
    }

    pub async fn clear_emergency_stop(&self) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::ClearEmergencyStop { respond_to }).await
    }

    pub async fn status(&self) -> Result<MotionStatus, MotionError> {
        self.call(|respond_to| MotionRequest::GetStatus { respond_to }).await
    }

    pub async fn events(&self) -> Result<Vec<EventRecord>, MotionError> {
        self.call(|respond_to| MotionRequest::GetEvents { respond_to }).await
    }

    pub async fn set_trigger(&self, id: TriggerId, active: bool) -> Result<(), MotionError> {
        self.call(|respond_to| MotionRequest::SetTrigger { id, active, respond_to }).await
    }

    pub async fn trigger_state(&self, id: TriggerId) -> Result<bool, MotionError> {
        self.call(|respond_to| MotionRequest::GetTrigger { id, respond_to }).await
    }
}

fn run_worker(mut backend: Box<dyn MotionBackend>, mut rx: mpsc::Receiver<MotionRequest>) {
    tracing::info!("Motion worker started with {} backend", backend.name());
    while let Some(request) = rx.blocking_recv() {
        let operation = request.operation();
        tracing::debug!("Executing {}", operation);
        // A dropped receiver only means the HTTP client went away.
        let delivered = match request {
            MotionRequest::Initialize { respond_to } => {
                respond_to.send(log_result(operation, backend.initialize())).is_ok()
            }
            MotionRequest::HomeAll { respond_to } => {
                respond_to.send(log_result(operation, backend.home_all())).is_ok()
            }
            MotionRequest::MoveTo { positions, respond_to } => {
                respond_to.send(log_result(operation, backend.move_to(&positions))).is_ok()
            }
            MotionRequest::EmergencyStop { respond_to } => {
                respond_to.send(log_result(operation, backend.emergency_stop())).is_ok()
            }
            MotionRequest::ClearEmergencyStop { respond_to } => {
                respond_to.send(log_result(operation, backend.clear_emergency_stop())).is_ok()
            }
            MotionRequest::GetStatus { respond_to } => respond_to.send(backend.status()).is_ok(),
            MotionRequest::GetEvents { respond_to } => respond_to.send(backend.events()).is_ok(),
            MotionRequest::SetTrigger { id, active, respond_to } => {
                respond_to.send(log_result(operation, backend.set_trigger(id, active))).is_ok()
            }
            MotionRequest::GetTrigger { id, respond_to } => respond_to.send(backend.trigger_state(id)).is_ok(),
        };
        if !delivered {
            tracing::debug!("Caller for {} went away before the reply", operation);
        }
    }
    tracing::info!("Motion worker stopped");
}

fn log_result(operation: &str, result: Result<(), MotionError>) -> Result<(), MotionError> {
    match &result {
        Ok(()) => tracing::info!("{} succeeded", operation),
        Err(e) => tracing::warn!("{} failed (code {}): {}", operation, e.code(), e),
    }
    result
}
