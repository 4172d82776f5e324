// Integration tests for the motion service worker

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use motion_host::motion::MotionError;
use motion_host::{MotionBackend, MotionService};

/// Detects overlapping backend calls.
struct OverlapDetector {
    in_flight: Arc<AtomicUsize>,
    max_seen: Arc<AtomicUsize>,
    moves: Arc<AtomicUsize>,
}

impl OverlapDetector {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MotionBackend for OverlapDetector {
    fn name(&self) -> &'static str {
        "overlap"
    }

    fn initialize(&mut self) -> Result<(), MotionError> {
        self.enter();
        Ok(())
    }

    fn home_all(&mut self) -> Result<(), MotionError> {
        self.enter();
        Ok(())
    }

    fn move_to(&mut self, _positions: &[f64]) -> Result<(), MotionError> {
        self.enter();
        self.moves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_serialized() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let moves = Arc::new(AtomicUsize::new(0));
    let backend = OverlapDetector {
        in_flight: in_flight.clone(),
        max_seen: max_seen.clone(),
        moves: moves.clone(),
    };
    let (service, worker) = MotionService::spawn(Box::new(backend), 4);

    let mut tasks = Vec::new();
    for i in 0..32 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            match i % 3 {
                0 => service.initialize().await,
                1 => service.home_all().await,
                _ => service.move_to(vec![i as f64]).await,
            }
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(moves.load(Ordering::SeqCst), 10);

    drop(service);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_worker_stops_when_handles_dropped() {
    let backend = OverlapDetector {
        in_flight: Arc::new(AtomicUsize::new(0)),
        max_seen: Arc::new(AtomicUsize::new(0)),
        moves: Arc::new(AtomicUsize::new(0)),
    };
    let (service, worker) = MotionService::spawn(Box::new(backend), 1);
    let clone = service.clone();
    assert!(clone.initialize().await.is_ok());
    drop(service);
    drop(clone);
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_default_optional_operations_report_unsupported() {
    let backend = OverlapDetector {
        in_flight: Arc::new(AtomicUsize::new(0)),
        max_seen: Arc::new(AtomicUsize::new(0)),
        moves: Arc::new(AtomicUsize::new(0)),
    };
    let (service, _worker) = MotionService::spawn(Box::new(backend), 1);
    let err = service.events().await.unwrap_err();
    assert_eq!(
        err,
        MotionError::Unsupported {
            operation: "events",
            backend: "overlap"
        }
    );
    assert!(service.trigger_state(1).await.is_err());
    assert!(service.clear_emergency_stop().await.is_err());
}
