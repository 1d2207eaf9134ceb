// Copyright 2026 Pivotfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for load telemetry.
//!
//! The session emits [`LoadEvent`]s while a load runs; they flow through a
//! `tokio::sync::broadcast` channel to all subscribers (progress bars, logs,
//! socket clients). When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// An event emitted during a load sub-session.
///
/// `generation` identifies the load sub-session that produced the event, so
/// consumers can ignore stragglers from a superseded filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadEvent {
    /// A load sub-session started with an a-priori expected count.
    LoadStarted { generation: u64, total_expected: u64 },
    /// One page was fetched and materialized.
    PageLoaded {
        generation: u64,
        page: u32,
        rows: usize,
        total_loaded: u64,
        /// Whole percent in 0..=100, floored and clamped.
        percent: u8,
    },
    /// The cursor walk reached end-of-sequence.
    LoadComplete { generation: u64, total_loaded: u64 },
    /// A supplied filter matched zero records; no fetch was issued.
    NoMatchingData { generation: u64 },
    /// The load aborted. `kind` is a stable machine tag.
    LoadFailed {
        generation: u64,
        kind: String,
        message: String,
    },
}

/// Sender handle for emitting load events.
pub type ProgressSender = tokio::sync::broadcast::Sender<LoadEvent>;

/// Receiver handle for consuming load events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<LoadEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 64 events covers a full load of typical page counts plus terminal events.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(64)
}

/// Emit an event, silently ignoring send errors (which occur when no
/// receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, event: LoadEvent) {
    if let Some(sender) = tx {
        let _ = sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_loaded_serializes_with_tag() {
        let event = LoadEvent::PageLoaded {
            generation: 3,
            page: 1,
            rows: 50,
            total_loaded: 100,
            percent: 40,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("PageLoaded"));
        assert!(json.contains("\"percent\":40"));

        let parsed: LoadEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            LoadEvent::PageLoaded { total_loaded, .. } => assert_eq!(total_loaded, 100),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn emit_without_receivers_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        emit(
            &Some(tx),
            LoadEvent::LoadComplete {
                generation: 1,
                total_loaded: 10,
            },
        );
    }

    #[test]
    fn emit_none_sender_is_noop() {
        emit(&None, LoadEvent::NoMatchingData { generation: 1 });
    }
}
