// Copyright 2026 Pivotfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! The acquisition session: orchestrates metadata fetch, strategy
//! selection, and cursor-paged loading.
//!
//! One session is one complete logical load, from metadata fetch through
//! completion or failure. Applying a new filter or reloading discards the
//! accumulated dataset wholesale and starts a fresh load sub-session; each
//! sub-session carries a generation id so a late-arriving page chain from a
//! superseded filter can never touch its successor's records.

pub mod pagination;
pub mod strategy;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{AcquireError, Result};
use crate::filter::defaults::{apply_defaults, resolve_defaults, FieldDescriptor};
use crate::filter::relative;
use crate::materialize::RowMaterializer;
use crate::progress::{self, emit, LoadEvent, ProgressReceiver, ProgressSender};
use crate::remote::RemoteApi;
use crate::types::{EntityMetadata, FilterBounds, Header, Record};

use pagination::{FetchOutcome, LoadToken, PaginationController};
use strategy::{select_strategy, LoadStrategy};

/// Where the session currently stands.
///
/// The strategy decision happens synchronously between `MetadataFetch` and
/// the first `Loading` / `AwaitingFilterInput` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    MetadataFetch,
    AwaitingFilterInput,
    Loading,
    Complete,
    Failed,
}

/// How a load request ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// End-of-sequence reached; the dataset is available.
    Complete { total_loaded: u64 },
    /// The strategy requires a bounding filter and none was supplied yet.
    AwaitingFilter,
    /// The supplied filter matched zero records. Not an error: loading was
    /// skipped entirely and the session awaits another filter.
    NoMatchingData,
    /// The load was superseded before it finished.
    Cancelled,
}

/// The finished dataset handed to the aggregation engine.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    pub header: &'a Header,
    pub records: &'a [Record],
}

/// Caller-injected capabilities, supplied at session construction.
pub trait SessionHooks: Send + Sync {
    /// Bounding filter to use when the strategy requires one. Unbounded
    /// means "wait for caller input".
    fn initial_filter(&self) -> FilterBounds {
        FilterBounds::default()
    }

    /// Extra parameters for the remote count query.
    fn count_params(&self, bounds: &FilterBounds) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(from) = &bounds.from {
            params.insert("keyvalue_from".into(), Value::String(from.clone()));
        }
        if let Some(to) = &bounds.to {
            params.insert("keyvalue_to".into(), Value::String(to.clone()));
        }
        params
    }

    /// External defaults for custom filter inputs, by field name. These win
    /// over the built-in "today" default for date fields.
    fn custom_filter_defaults(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// No-op hooks: no initial filter, key bounds as count params, no custom
/// defaults.
pub struct DefaultHooks;

impl SessionHooks for DefaultHooks {}

/// Static session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Record count above which a bounding filter is required before any
    /// load. Zero disables the gate.
    pub threshold: u64,
    /// Custom filter form fields, for default-value resolution.
    pub filter_fields: Vec<FieldDescriptor>,
}

/// Cancels the active load from outside the session.
///
/// Bumping the generation invalidates any in-flight fetch chain; the
/// controller notices at its next page boundary.
#[derive(Clone)]
pub struct CancelHandle {
    active: Arc<AtomicU64>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }
}

/// Top-level orchestrator owning the accumulated dataset.
pub struct AcquisitionSession {
    remote: Arc<dyn RemoteApi>,
    hooks: Box<dyn SessionHooks>,
    config: SessionConfig,
    state: SessionState,
    metadata: Option<EntityMetadata>,
    strategy: Option<LoadStrategy>,
    total_expected: u64,
    total_loaded: u64,
    records: Vec<Record>,
    filter_defaults: Map<String, Value>,
    active: Arc<AtomicU64>,
    generation: u64,
    progress: Option<ProgressSender>,
}

impl AcquisitionSession {
    pub fn new(remote: Arc<dyn RemoteApi>, config: SessionConfig) -> Self {
        Self::with_hooks(remote, config, Box::new(DefaultHooks))
    }

    pub fn with_hooks(
        remote: Arc<dyn RemoteApi>,
        config: SessionConfig,
        hooks: Box<dyn SessionHooks>,
    ) -> Self {
        Self {
            remote,
            hooks,
            config,
            state: SessionState::Idle,
            metadata: None,
            strategy: None,
            total_expected: 0,
            total_loaded: 0,
            records: Vec::new(),
            filter_defaults: Map::new(),
            active: Arc::new(AtomicU64::new(0)),
            generation: 0,
            progress: None,
        }
    }

    /// Subscribe to load progress events.
    pub fn subscribe(&mut self) -> ProgressReceiver {
        match &self.progress {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = progress::channel();
                self.progress = Some(tx);
                rx
            }
        }
    }

    /// Fetch metadata and the a-priori count, resolve filter defaults, pick
    /// a strategy, and load accordingly.
    ///
    /// With an `Auto` strategy this loads everything; with `Filtered` it
    /// loads by the hook-supplied initial filter, or returns
    /// [`LoadOutcome::AwaitingFilter`] when the hook has none.
    pub async fn start(&mut self) -> Result<LoadOutcome> {
        self.state = SessionState::MetadataFetch;
        let remote = self.remote.clone();

        let metadata = match remote.metadata().await {
            Ok(m) => m,
            Err(e) => return Err(self.fail_metadata(e)),
        };

        let params = self.hooks.count_params(&FilterBounds::default());
        let total = match remote.count(&params).await {
            Ok(t) => t,
            Err(e) => return Err(self.fail_metadata(e)),
        };

        // Defaults are resolved once, before the first fetch. Date fields
        // from metadata join any configured custom filter fields.
        let mut fields = self.config.filter_fields.clone();
        for name in &metadata.date_fields {
            if !fields.iter().any(|f| &f.name == name) {
                fields.push(FieldDescriptor::date(name.clone()));
            }
        }
        self.filter_defaults = resolve_defaults(&fields, &self.hooks.custom_filter_defaults());

        self.metadata = Some(metadata);
        self.total_expected = total;

        let strategy = select_strategy(total, self.config.threshold);
        self.strategy = Some(strategy);
        tracing::info!(
            total,
            threshold = self.config.threshold,
            ?strategy,
            "session metadata ready"
        );

        match strategy {
            LoadStrategy::Auto => self.load_all().await,
            LoadStrategy::Filtered => {
                self.state = SessionState::AwaitingFilterInput;
                let bounds = self.hooks.initial_filter();
                if bounds.is_unbounded() {
                    Ok(LoadOutcome::AwaitingFilter)
                } else {
                    self.apply_filter(bounds).await
                }
            }
        }
    }

    /// Discard the current dataset and load the whole entity.
    pub async fn load_all(&mut self) -> Result<LoadOutcome> {
        let generation = self.begin_load();

        let params = self.hooks.count_params(&FilterBounds::default());
        let total = match self.remote.clone().count(&params).await {
            Ok(t) => t,
            Err(e) => return Err(self.fail_metadata(e)),
        };
        self.total_expected = total;

        self.run_load(generation, FilterBounds::default(), total).await
    }

    /// Discard the current dataset and load records within `bounds`.
    pub async fn apply_filter(&mut self, bounds: FilterBounds) -> Result<LoadOutcome> {
        let generation = self.begin_load();

        let params = self.hooks.count_params(&bounds);
        let total = match self.remote.clone().count(&params).await {
            Ok(t) => t,
            Err(e) => return Err(self.fail_metadata(e)),
        };

        if total == 0 {
            self.state = SessionState::AwaitingFilterInput;
            tracing::info!(generation, "no records match the supplied filter");
            emit(&self.progress, LoadEvent::NoMatchingData { generation });
            return Ok(LoadOutcome::NoMatchingData);
        }

        self.total_expected = total;
        self.run_load(generation, bounds, total).await
    }

    /// Resolve a relative-date preset and load by the resulting bounds.
    ///
    /// The id must belong to the session's enumerated preset set; anything
    /// else is rejected before any fetch. The empty id means "any" and
    /// loads without date restriction.
    pub async fn apply_preset(&mut self, preset_id: &str) -> Result<LoadOutcome> {
        let metadata = self.require_metadata()?;
        let id = preset_id.trim();
        if !id.is_empty() && !metadata.relative_filter_presets.iter().any(|p| p.id == id) {
            return Err(AcquireError::InvalidFilterPreset(id.to_string()));
        }

        let range = relative::resolve(id, &metadata.calendar)?;
        self.apply_filter(range.to_bounds()).await
    }

    /// Fill empty entries in `values` from the session's resolved filter
    /// defaults. Caller-entered values are never overwritten.
    pub fn apply_filter_defaults(&self, values: &mut Map<String, Value>) {
        apply_defaults(values, &self.filter_defaults);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn strategy(&self) -> Option<LoadStrategy> {
        self.strategy
    }

    pub fn total_expected(&self) -> u64 {
        self.total_expected
    }

    /// Rows accumulated by the current load. Equals `records().len()` at
    /// every observable point.
    pub fn total_loaded(&self) -> u64 {
        self.total_loaded
    }

    /// Accumulated records, including a failed load's partial rows (kept
    /// for diagnostics; [`Self::dataset`] gates on completion).
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn metadata(&self) -> Option<&EntityMetadata> {
        self.metadata.as_ref()
    }

    pub fn filter_defaults(&self) -> &Map<String, Value> {
        &self.filter_defaults
    }

    /// The finished dataset, only once the session is `Complete`. Partial
    /// data is never presented as complete.
    pub fn dataset(&self) -> Option<Dataset<'_>> {
        match (&self.state, &self.metadata) {
            (SessionState::Complete, Some(metadata)) => Some(Dataset {
                header: &metadata.header,
                records: &self.records,
            }),
            _ => None,
        }
    }

    /// A handle that cancels the active load from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            active: self.active.clone(),
        }
    }

    /// Invalidate any in-flight load and discard the accumulated dataset.
    fn begin_load(&mut self) -> u64 {
        let generation = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.generation = generation;
        self.records = Vec::new();
        self.total_loaded = 0;
        generation
    }

    async fn run_load(
        &mut self,
        generation: u64,
        bounds: FilterBounds,
        total_expected: u64,
    ) -> Result<LoadOutcome> {
        let header = self.require_metadata()?.header.clone();
        self.state = SessionState::Loading;
        tracing::info!(
            generation,
            total_expected,
            from = ?bounds.from,
            to = ?bounds.to,
            "load started"
        );
        emit(
            &self.progress,
            LoadEvent::LoadStarted {
                generation,
                total_expected,
            },
        );

        let controller = PaginationController::new(
            self.remote.clone(),
            RowMaterializer::new(header),
            bounds,
            total_expected,
            LoadToken::new(generation, self.active.clone()),
            self.progress.clone(),
        );

        match controller.run().await {
            FetchOutcome::Complete(records) => {
                // A cancel may land between the last page and this commit.
                if self.active.load(Ordering::SeqCst) != generation {
                    tracing::debug!(generation, "load superseded at commit, discarding");
                    self.state = self.post_cancel_state();
                    return Ok(LoadOutcome::Cancelled);
                }
                self.total_loaded = records.len() as u64;
                self.records = records;
                self.state = SessionState::Complete;
                tracing::info!(generation, total_loaded = self.total_loaded, "load complete");
                emit(
                    &self.progress,
                    LoadEvent::LoadComplete {
                        generation,
                        total_loaded: self.total_loaded,
                    },
                );
                Ok(LoadOutcome::Complete {
                    total_loaded: self.total_loaded,
                })
            }
            FetchOutcome::Cancelled => {
                self.state = self.post_cancel_state();
                Ok(LoadOutcome::Cancelled)
            }
            FetchOutcome::Failed { partial, error } => {
                self.state = SessionState::Failed;
                self.total_loaded = partial.len() as u64;
                self.records = partial;
                emit(
                    &self.progress,
                    LoadEvent::LoadFailed {
                        generation,
                        kind: error.kind().to_string(),
                        message: error.to_string(),
                    },
                );
                Err(error)
            }
        }
    }

    /// A cancelled load leaves no load active: a filter-gated session goes
    /// back to awaiting input, anything else back to idle.
    fn post_cancel_state(&self) -> SessionState {
        match self.strategy {
            Some(LoadStrategy::Filtered) => SessionState::AwaitingFilterInput,
            _ => SessionState::Idle,
        }
    }

    fn require_metadata(&self) -> Result<&EntityMetadata> {
        self.metadata
            .as_ref()
            .ok_or_else(|| AcquireError::MetadataFetch("session not started".into()))
    }

    fn fail_metadata(&mut self, source: AcquireError) -> AcquireError {
        self.state = SessionState::Failed;
        let error = AcquireError::MetadataFetch(source.to_string());
        tracing::warn!(error = %error, "metadata fetch failed");
        emit(
            &self.progress,
            LoadEvent::LoadFailed {
                generation: self.generation,
                kind: error.kind().to_string(),
                message: error.to_string(),
            },
        );
        error
    }
}
