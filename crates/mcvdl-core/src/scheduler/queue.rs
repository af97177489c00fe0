//! Closed-ended job queue shared by all workers.
//!
//! Capacity is fixed up front; the producer enqueues everything and closes
//! the queue. Each job is handed to exactly one worker.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::job::Job;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job queue is full (capacity {capacity})")]
    Full { capacity: usize },
    #[error("job queue has no consumer")]
    Closed,
}

/// Producer side. Dropping it (or calling `close`) closes the queue.
pub struct JobSender {
    tx: mpsc::Sender<Arc<dyn Job>>,
    capacity: usize,
}

impl JobSender {
    /// Enqueue without waiting; fails if the queue is already at capacity.
    pub fn enqueue(&self, job: Arc<dyn Job>) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// No more jobs will follow.
    pub fn close(self) {}
}

/// Consumer side, shared by the workers.
pub struct JobQueue {
    rx: Mutex<mpsc::Receiver<Arc<dyn Job>>>,
    capacity: usize,
}

impl JobQueue {
    /// Bounded queue holding at most `capacity` jobs.
    pub fn bounded(capacity: usize) -> (JobSender, JobQueue) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        (
            JobSender { tx, capacity },
            JobQueue {
                rx: Mutex::new(rx),
                capacity,
            },
        )
    }

    /// Queue sized to `jobs`, filled in order and already closed.
    pub fn from_jobs(jobs: Vec<Arc<dyn Job>>) -> Result<JobQueue, QueueError> {
        let (sender, queue) = Self::bounded(jobs.len());
        for job in jobs {
            sender.enqueue(job)?;
        }
        sender.close();
        Ok(queue)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Next job, or `None` once the queue is closed and drained.
    pub async fn next(&self) -> Option<Arc<dyn Job>> {
        self.rx.lock().await.recv().await
    }
}
