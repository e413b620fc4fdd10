pub mod config;
pub mod metrics_reporter;
pub mod orchestrator;
pub mod synchronizer;

pub use config::{GapPolicy, SessionConfig};
pub use metrics_reporter::MetricsReporter;
pub use orchestrator::{SessionOrchestrator, SessionOutcome, ShutdownHandle};
pub use synchronizer::Synchronizer;
