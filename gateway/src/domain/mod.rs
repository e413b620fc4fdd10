pub mod events;
pub mod sequence;
pub mod session;
pub mod traits;

pub use events::{DiffEvent, Snapshot, StreamData, WsEvent, WsRequest, WsResponse};
pub use sequence::{Classification, SequenceCursor};
pub use session::{SessionState, SessionSummary, StopReason};
pub use traits::{
    DiffSource, FeedConnector, FeedError, FetchError, ReportSink, SnapshotProvider, StreamParser,
};
