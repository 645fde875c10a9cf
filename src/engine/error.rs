use thiserror::Error;

use super::messages::{JobFault, JobKind};

/// Why a dispatched call did not produce a result.
/// Every variant is terminal for its own call only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("computation context is unavailable")]
    Unavailable,

    #[error("{kind} job timed out after {after_ms} ms")]
    Timeout { kind: String, after_ms: u64 },

    #[error("unknown job kind: {0}")]
    UnknownKind(String),

    #[error("algorithm fault: {0}")]
    AlgorithmFault(String),

    #[error("expected {expected} output, got {got}")]
    UnexpectedOutput { expected: JobKind, got: JobKind },
}

impl From<JobFault> for DispatchError {
    fn from(fault: JobFault) -> Self {
        match fault {
            JobFault::UnknownKind(tag) => DispatchError::UnknownKind(tag),
            JobFault::AlgorithmFault(message) => DispatchError::AlgorithmFault(message),
        }
    }
}
