//! Error types for the acquisition pipeline.
//!
//! An empty filter result is deliberately not an error kind: the session
//! surfaces it as `LoadOutcome::NoMatchingData` since the caller flow
//! treats it as a normal "adjust your filter" signal.

/// All errors the acquisition pipeline can surface.
#[derive(thiserror::Error, Debug)]
pub enum AcquireError {
    /// The count/header/preset fetch failed. Fatal to session start;
    /// there is no retry at this layer.
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(String),

    /// A page fetch failed mid-load. Fatal to this load, not to the
    /// application; partial data is kept for diagnostics only.
    #[error("page fetch failed at page {page}: {source}")]
    PageFetch {
        page: u32,
        #[source]
        source: anyhow::Error,
    },

    /// A relative filter preset id outside the session's enumerated set.
    /// Rejected before any fetch is issued.
    #[error("unknown relative filter preset: {0:?}")]
    InvalidFilterPreset(String),

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered with something the pipeline cannot use.
    #[error("invalid remote response: {0}")]
    InvalidResponse(String),
}

impl AcquireError {
    /// Stable kind tag carried in progress failure events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetadataFetch(_) => "metadata_fetch_failure",
            Self::PageFetch { .. } => "page_fetch_failure",
            Self::InvalidFilterPreset(_) => "invalid_filter_preset",
            Self::Transport(_) => "transport_error",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AcquireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            AcquireError::MetadataFetch("x".into()).kind(),
            "metadata_fetch_failure"
        );
        assert_eq!(
            AcquireError::PageFetch {
                page: 2,
                source: anyhow::anyhow!("boom"),
            }
            .kind(),
            "page_fetch_failure"
        );
        assert_eq!(
            AcquireError::InvalidFilterPreset("bogus".into()).kind(),
            "invalid_filter_preset"
        );
    }

    #[test]
    fn page_fetch_display_names_the_page() {
        let err = AcquireError::PageFetch {
            page: 7,
            source: anyhow::anyhow!("connection reset"),
        };
        let msg = err.to_string();
        assert!(msg.contains("page 7"));
    }
}
