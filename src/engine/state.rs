use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::config::DEBUG_FLAGS;

use super::error::DispatchError;
use super::messages::{JobId, JobOutput, JobResponse};

pub type Reply = Result<JobOutput, DispatchError>;

/// Bookkeeping for one outstanding call.
#[derive(Debug)]
pub struct PendingRequest {
    pub kind: String,
    pub issued_at: Instant,
    pub deadline: Instant,
    reply: oneshot::Sender<Reply>,
}

impl PendingRequest {
    pub fn new(kind: String, issued_at: Instant, deadline: Instant, reply: oneshot::Sender<Reply>) -> Self {
        Self {
            kind,
            issued_at,
            deadline,
            reply,
        }
    }

    /// Hand the outcome to the waiting caller. A caller that already went away is ignored.
    pub fn resolve(self, outcome: Reply) {
        let _ = self.reply.send(outcome);
    }
}

/// The pending-request table, keyed by correlation id.
///
/// Invariant: at most one record per id, and each record is removed exactly
/// once, either by `complete` (response) or by `remove` (deadline/cancel).
/// Shared between the caller side and the response router, hence the mutex.
#[derive(Debug, Default)]
pub struct PendingTable {
    inner: Mutex<HashMap<JobId, PendingRequest>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, PendingRequest>> {
        // The map holds no invariants a panicking holder could break halfway
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false (and keeps the existing record) if `id` is already pending.
    pub fn insert(&self, id: JobId, record: PendingRequest) -> bool {
        let mut table = self.lock();
        if table.contains_key(&id) {
            return false;
        }
        if DEBUG_FLAGS.print_pending_table {
            log::debug!("pending + {} ({}), {} outstanding", id, record.kind, table.len() + 1);
        }
        table.insert(id, record);
        true
    }

    pub fn remove(&self, id: &JobId) -> Option<PendingRequest> {
        let removed = self.lock().remove(id);
        if DEBUG_FLAGS.print_pending_table && removed.is_some() {
            log::debug!("pending - {}", id);
        }
        removed
    }

    /// Route a response to its caller by id, regardless of arrival order.
    /// Returns false when nobody is waiting (the caller already timed out).
    pub fn complete(&self, response: JobResponse) -> bool {
        match self.remove(&response.id) {
            Some(record) => {
                record.resolve(response.result.map_err(DispatchError::from));
                true
            }
            None => {
                if DEBUG_FLAGS.print_late_responses {
                    log::debug!("Discarding late response for {}", response.id);
                }
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of records whose deadline has passed but have not been reaped yet.
    pub fn overdue(&self, now: Instant) -> usize {
        self.lock().values().filter(|r| r.deadline <= now).count()
    }

    /// Drop every record, failing their callers with `Unavailable`.
    pub fn fail_all(&self) {
        let drained: Vec<PendingRequest> = self.lock().drain().map(|(_, r)| r).collect();
        for record in drained {
            record.resolve(Err(DispatchError::Unavailable));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::messages::JobFault;
    use std::time::Duration;

    fn record(reply: oneshot::Sender<Reply>) -> PendingRequest {
        let now = Instant::now();
        PendingRequest::new("kelly-criterion".to_string(), now, now + Duration::from_secs(5), reply)
    }

    #[test]
    fn complete_resolves_exactly_once() {
        let table = PendingTable::new();
        let id = JobId::new();
        let (tx, mut rx) = oneshot::channel();
        assert!(table.insert(id, record(tx)));

        let response = JobResponse {
            id,
            duration_ms: 0,
            result: Ok(JobOutput::KellyCriterion(0.25)),
        };
        assert!(table.complete(response.clone()));
        assert_eq!(rx.try_recv().unwrap(), Ok(JobOutput::KellyCriterion(0.25)));

        // Second delivery of the same id finds nothing
        assert!(!table.complete(response));
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let table = PendingTable::new();
        let id = JobId::new();
        let (tx1, _rx1) = oneshot::channel();
        let (tx2, _rx2) = oneshot::channel();
        assert!(table.insert(id, record(tx1)));
        assert!(!table.insert(id, record(tx2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn faults_are_mapped_to_dispatch_errors() {
        let table = PendingTable::new();
        let id = JobId::new();
        let (tx, mut rx) = oneshot::channel();
        table.insert(id, record(tx));
        table.complete(JobResponse {
            id,
            duration_ms: 1,
            result: Err(JobFault::UnknownKind("x".to_string())),
        });
        assert_eq!(rx.try_recv().unwrap(), Err(DispatchError::UnknownKind("x".to_string())));
    }

    #[test]
    fn response_after_removal_is_discarded() {
        let table = PendingTable::new();
        let id = JobId::new();
        let (tx, _rx) = oneshot::channel();
        table.insert(id, record(tx));
        assert!(table.remove(&id).is_some());
        assert!(!table.complete(JobResponse {
            id,
            duration_ms: 1,
            result: Ok(JobOutput::FractalDimension(1.5)),
        }));
    }

    #[test]
    fn fail_all_drains_the_table() {
        let table = PendingTable::new();
        let (tx, mut rx) = oneshot::channel();
        table.insert(JobId::new(), record(tx));
        table.fail_all();
        assert!(table.is_empty());
        assert_eq!(rx.try_recv().unwrap(), Err(DispatchError::Unavailable));
    }
}
