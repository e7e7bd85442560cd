//! The variable binding and rendering pipeline.
//!
//! [`ReportSession`] holds the per-session state (bindings, working dataset,
//! display state). Each backend round trip is split into a `begin` step that
//! snapshots state and issues a request token, and a `complete` step that
//! applies the result only if the token is still the latest. The
//! [`ReportPipeline`] orchestrator drives these steps against a
//! [`ReportBackend`](docbind_backend::ReportBackend).

pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod preview;
pub mod quick_edit;
pub mod request;
pub mod session;

pub use display::{DisplayState, VariableDisplay};
pub use error::PipelineError;
pub use export::{ExportOptions, ExportedDocument};
pub use pipeline::{PipelineOptions, ReportPipeline, StartupReport};
pub use preview::PreviewOptions;
pub use quick_edit::QuickEdit;
pub use request::{Completion, RequestGuard, RequestToken};
pub use session::ReportSession;
