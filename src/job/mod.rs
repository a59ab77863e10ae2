mod orchestrator;
mod types;
mod worker;


pub use orchestrator::{JobOrchestrator, JobOrchestratorBuilder};
pub use types::{JobError, JobView, SubmitRequest};
