//! Presentation Layer - Outbound interfaces to downstream consumers
//!
//! This layer contains adapters for systems that consume from us:
//! - TracingReporter: writes reports and summaries to the log
//! - ChannelReporter: forwards them over an mpsc channel
//!
//! Follows Hexagonal Architecture:
//! - Infrastructure = inbound (exchange → gateway)
//! - Presentation = outbound (gateway → report consumers)

mod reporter;

pub use reporter::{ChannelReporter, ReportEvent, TracingReporter};
