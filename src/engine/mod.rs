pub mod core;
pub mod error;
pub mod messages;
pub mod sink;
pub mod state;
pub mod worker;

// Re-export key components
pub use self::core::QuantEngine;
pub use error::DispatchError;
pub use messages::{JobFault, JobId, JobKind, JobOutput, JobPayload, JobRequest, JobResponse};
pub use sink::JobSink;
pub use state::{PendingRequest, PendingTable};
pub use worker::ComputeContext;
