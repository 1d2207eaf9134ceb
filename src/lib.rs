// Copyright 2026 Pivotfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pivotfeed — incremental acquisition pipeline for paginated tabular data.
//!
//! The pipeline fetches a large, filterable dataset from a cursor-paged
//! remote source, gates the load on a configurable size threshold (auto-load
//! small datasets, require a bounding filter for big ones), resolves
//! relative-date presets into concrete bounds, and materializes positional
//! rows into named-field records for a downstream aggregation engine.
//!
//! Entry point is [`session::AcquisitionSession`] over any
//! [`remote::RemoteApi`] implementation; [`remote::http::HttpRemote`] is the
//! bundled JSON transport. Subscribe to [`progress::LoadEvent`]s for
//! progress bars and completion signals.

pub mod error;
pub mod filter;
pub mod materialize;
pub mod progress;
pub mod remote;
pub mod session;
pub mod types;

pub use error::{AcquireError, Result};
pub use session::{
    AcquisitionSession, CancelHandle, Dataset, LoadOutcome, SessionConfig, SessionHooks,
    SessionState,
};
pub use types::{CalendarParams, Cursor, EntityMetadata, FilterBounds, Header, Page, RawRow, Record};
