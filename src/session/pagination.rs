//! Sequential cursor-driven fetch loop.
//!
//! One fetch outstanding at a time: step N+1 is issued only after step N
//! resolves, preserving cursor ordering. The loop is explicit rather than
//! recursive so cancellation is checkable at every page boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::AcquireError;
use crate::materialize::RowMaterializer;
use crate::progress::{emit, LoadEvent, ProgressSender};
use crate::remote::RemoteApi;
use crate::types::{Cursor, FilterBounds, Record};

/// Identity of one load sub-session.
///
/// The session bumps the shared counter to start a new load; a controller
/// whose token no longer matches stops at the next page boundary, so a
/// late-arriving chain can never append to a successor's records.
#[derive(Debug, Clone)]
pub struct LoadToken {
    id: u64,
    active: Arc<AtomicU64>,
}

impl LoadToken {
    pub fn new(id: u64, active: Arc<AtomicU64>) -> Self {
        Self { id, active }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this token still identifies the active load.
    pub fn is_current(&self) -> bool {
        self.active.load(Ordering::SeqCst) == self.id
    }
}

/// How one run of the controller ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// End-of-sequence reached; the accumulated records are complete.
    Complete(Vec<Record>),
    /// A page fetch failed. `partial` holds what accumulated before the
    /// failure, for diagnostics only — never to be presented as complete.
    Failed {
        partial: Vec<Record>,
        error: AcquireError,
    },
    /// The load was superseded; its records are discarded.
    Cancelled,
}

/// Drives one load sub-session to completion.
///
/// Not restartable: `run` consumes the controller, and a fresh one is built
/// for every new load.
pub struct PaginationController {
    remote: Arc<dyn RemoteApi>,
    materializer: RowMaterializer,
    bounds: FilterBounds,
    total_expected: u64,
    token: LoadToken,
    progress: Option<ProgressSender>,
}

impl PaginationController {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        materializer: RowMaterializer,
        bounds: FilterBounds,
        total_expected: u64,
        token: LoadToken,
        progress: Option<ProgressSender>,
    ) -> Self {
        Self {
            remote,
            materializer,
            bounds,
            total_expected,
            token,
            progress,
        }
    }

    /// Fetch pages sequentially until end-of-sequence, failure, or
    /// cancellation.
    pub async fn run(mut self) -> FetchOutcome {
        let mut cursor = Cursor::start(&self.bounds);
        let mut records: Vec<Record> = Vec::new();

        loop {
            // Cancellation takes effect here, between pages — never mid-fetch.
            if !self.token.is_current() {
                tracing::debug!(
                    generation = self.token.id(),
                    page = cursor.page,
                    "load superseded, stopping"
                );
                return FetchOutcome::Cancelled;
            }

            let page = match self.remote.fetch_page(&cursor, &self.bounds).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        generation = self.token.id(),
                        page = cursor.page,
                        error = %e,
                        loaded = records.len(),
                        "page fetch failed, aborting load"
                    );
                    return FetchOutcome::Failed {
                        partial: records,
                        error: AcquireError::PageFetch {
                            page: cursor.page,
                            source: e.into(),
                        },
                    };
                }
            };

            let next = page.advance();
            let batch = self.materializer.materialize(page.rows);
            let total_loaded = self.materializer.total_loaded();
            let percent = progress_percent(total_loaded, self.total_expected);

            tracing::debug!(
                generation = self.token.id(),
                page = cursor.page,
                rows = batch.len(),
                total_loaded,
                percent,
                "page loaded"
            );
            emit(
                &self.progress,
                LoadEvent::PageLoaded {
                    generation: self.token.id(),
                    page: cursor.page,
                    rows: batch.len(),
                    total_loaded,
                    percent,
                },
            );
            records.extend(batch);

            match next {
                Some(next_cursor) => cursor = next_cursor,
                None => return FetchOutcome::Complete(records),
            }
        }
    }
}

/// `floor(loaded / expected * 100)`, clamped to 0..=100.
///
/// An expected count of zero yields 0 and suppresses the division. The
/// clamp also absorbs a live count drifting below what actually loads.
pub fn progress_percent(loaded: u64, expected: u64) -> u8 {
    if expected == 0 {
        return 0;
    }
    (loaded.saturating_mul(100) / expected).min(100) as u8
}
