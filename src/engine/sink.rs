use super::error::DispatchError;
use super::messages::JobRequest;

/// Outbound side of the dispatch protocol: anything that can carry a job to a
/// computation context. Implementations must not block on the job itself.
pub trait JobSink: Send + Sync {
    fn submit(&self, request: JobRequest) -> Result<(), DispatchError>;
}
