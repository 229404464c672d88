//! Background worker: one OS thread hosting a single-threaded tokio runtime.
//!
//! Blocking callers hand async jobs to the worker with [`Worker::submit`]
//! and wait for the outcome with a bounded [`Ticket::wait`]. A caller that
//! stops waiting does not cancel the job; it keeps running on the worker.

use crate::types::{AppError, Result};
use std::future::Future;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

pub struct Worker {
    name: String,
    handle: Handle,
    stop: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the thread and wait up to `ready_timeout` for its runtime.
    pub fn start(name: &str, ready_timeout: Duration) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Handle>>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(AppError::Internal(format!(
                            "Failed to build worker runtime: {}",
                            e
                        ))));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(runtime.handle().clone()));

                // Spawned jobs run while this future is being driven.
                runtime.block_on(async {
                    let _ = stop_rx.await;
                });
            })
            .map_err(|e| AppError::Internal(format!("Failed to spawn worker thread: {}", e)))?;

        let handle = match ready_rx.recv_timeout(ready_timeout) {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(e),
            Err(RecvTimeoutError::Timeout) => {
                return Err(AppError::Timeout(format!(
                    "Worker '{}' did not start within {}s",
                    name,
                    ready_timeout.as_secs()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(AppError::Internal(format!(
                    "Worker '{}' exited during startup",
                    name
                )))
            }
        };

        debug!(worker = name, "worker started");
        Ok(Self {
            name: name.to_string(),
            handle,
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a job on the worker's runtime.
    pub fn submit<F, T>(&self, job: F) -> Ticket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.handle.spawn(async move {
            let _ = tx.send(job.await);
        });
        Ticket { rx }
    }

    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    /// Stop the runtime and join the thread. Jobs still running are dropped.
    pub fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!(worker = %self.name, "worker thread panicked");
            } else {
                debug!(worker = %self.name, "worker stopped");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pending outcome of a submitted job.
pub struct Ticket<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Ticket<T> {
    /// Block for at most `timeout`. On timeout the job keeps running.
    pub fn wait(self, timeout: Duration) -> Result<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "worker job timed out");
                Err(AppError::Timeout(format!(
                    "No response within {}s",
                    timeout.as_secs_f64()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AppError::Internal(
                "Worker dropped the job before it finished".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> Worker {
        Worker::start("test-worker", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_submit_and_wait() {
        let worker = worker();
        let ticket = worker.submit(async { 6 * 7 });
        assert_eq!(ticket.wait(Duration::from_secs(5)).unwrap(), 42);
        assert!(worker.is_alive());
    }

    #[test]
    fn test_wait_times_out_without_cancelling() {
        let worker = worker();
        let (tx, rx) = mpsc::channel();
        let ticket = worker.submit(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send("finished");
        });

        let err = ticket.wait(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "finished");
    }

    #[test]
    fn test_panicking_job_is_an_error() {
        let worker = worker();
        let ticket = worker.submit(async {
            if true {
                panic!("boom");
            }
        });
        assert!(matches!(
            ticket.wait(Duration::from_secs(5)),
            Err(AppError::Internal(_))
        ));
        assert!(worker.is_alive());
    }

    #[test]
    fn test_shutdown() {
        let mut worker = worker();
        worker.shutdown();
        assert!(!worker.is_alive());

        let ticket = worker.submit(async { 1 });
        assert!(ticket.wait(Duration::from_millis(100)).is_err());
    }
}
