//! Deprecation signals - reported, never raised
//!
//! Legacy configuration keys and legacy `definitions` sections on current
//! documents still work, but each use is reported through a [`DeprecationSink`].

use std::sync::Mutex;

/// A deprecated construct that was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecation {
    /// Current-version document carries a top-level `definitions` section
    LegacyDefinitions {
        /// Version tag of the document
        version: String,
    },
    /// Declaration uses `strict_mode` instead of `strict`
    LegacyStrictFlag {
        /// Status code of the declaration
        code: String,
    },
    /// Configuration uses a renamed key
    LegacyConfigKey {
        /// Deprecated key
        key: &'static str,
        /// Key to use instead
        replacement: &'static str,
    },
}

impl std::fmt::Display for Deprecation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LegacyDefinitions { version } => write!(
                f,
                "`definitions` is deprecated for OpenAPI {version} documents, move shared schemas to `components.schemas`"
            ),
            Self::LegacyStrictFlag { code } => write!(
                f,
                "response {code}: `strict_mode` is deprecated, use `strict`"
            ),
            Self::LegacyConfigKey { key, replacement } => {
                write!(f, "config key `{key}` is deprecated, use `{replacement}`")
            }
        }
    }
}

/// Receiver for deprecation signals.
pub trait DeprecationSink: Send + Sync {
    fn deprecated(&self, notice: &Deprecation);
}

/// Default sink: one `warn` event per notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DeprecationSink for TracingSink {
    fn deprecated(&self, notice: &Deprecation) {
        tracing::warn!(target: "respcontract::deprecation", "{notice}");
    }
}

/// Keeps every notice in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Deprecation>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Deprecation> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl DeprecationSink for RecordingSink {
    fn deprecated(&self, notice: &Deprecation) {
        match self.notices.lock() {
            Ok(mut n) => n.push(notice.clone()),
            Err(poisoned) => poisoned.into_inner().push(notice.clone()),
        }
    }
}
