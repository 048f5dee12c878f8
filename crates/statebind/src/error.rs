#![forbid(unsafe_code)]

//! Engine error types.

use statebind_scan::PatternError;
use thiserror::Error;

/// Failure of one [`Engine::apply`](crate::Engine::apply) cycle.
///
/// Configuration errors (malformed declaration patterns) surface here on
/// the first cycle; they are not detected at build time. Callback panics
/// are not caught and unwind through `apply` — fail-fast, no
/// partial-cycle rollback.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A declared pattern failed to parse.
    #[error("malformed pattern {pattern:?}")]
    Pattern {
        /// The offending declaration text.
        pattern: String,
        /// Parser diagnosis.
        #[source]
        source: PatternError,
    },
}
