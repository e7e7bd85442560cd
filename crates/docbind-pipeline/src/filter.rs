//! Dataset filter: narrows the full dataset to a date range.

use tracing::{debug, info};

use docbind_backend::ReportBackend;
use docbind_core::validation::validate_range;
use docbind_core::{DateRange, Dataset, ValidationError};

use crate::error::Result;
use crate::request::{Completion, RequestToken};
use crate::session::ReportSession;

/// A validated filter request waiting for its backend answer.
#[derive(Debug)]
pub struct PendingFilter {
    token: RequestToken,
    range: DateRange,
}

impl PendingFilter {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }
}

/// Validates `range` and issues a filter token.
///
/// An empty or unparseable date fails here, so no request is ever sent
/// for it.
pub fn begin(
    session: &mut ReportSession,
    range: DateRange,
) -> std::result::Result<PendingFilter, ValidationError> {
    validate_range(&range)?;
    let token = session.issue_filter();
    debug!(%token, start = %range.start, end = %range.end, "filter issued");
    Ok(PendingFilter { token, range })
}

/// Applies a filter answer unless a newer filter has been issued since.
pub fn complete(session: &mut ReportSession, pending: PendingFilter, dataset: Dataset) -> Completion {
    if !session.filter_is_current(pending.token) {
        debug!(token = %pending.token, "discarding stale filter result");
        return Completion::Superseded;
    }
    info!(
        start = %pending.range.start,
        end = %pending.range.end,
        rows = dataset.len(),
        "working dataset replaced"
    );
    session.install_filter(pending.range, dataset);
    Completion::Applied
}

/// Runs one filter round trip. On a backend failure the session is left
/// as it was.
pub fn run<B: ReportBackend>(
    session: &mut ReportSession,
    backend: &B,
    range: DateRange,
) -> Result<Completion> {
    let pending = begin(session, range)?;
    let dataset = backend.filter(pending.range())?;
    Ok(complete(session, pending, dataset))
}
