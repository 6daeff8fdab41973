//! Unified error types for dynsync.
//!
//! Every rejection in this crate is synchronous and caller-visible: a
//! returned error means no state was changed. There are no retryable
//! errors — flush primitives are fire-and-forget and redundant scheduling
//! calls are idempotent no-ops rather than failures.

use thiserror::Error;

/// All dynsync errors.
///
/// This is the canonical error type for all controller and control-surface
/// operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Control surface received a key it does not expose.
    #[error("unknown control key: {0}")]
    UnknownKey(String),

    /// Control surface received a write for a read-only key.
    #[error("control key is read-only: {0}")]
    ReadOnly(&'static str),

    /// Control surface received a value that does not parse for the key.
    #[error("invalid value {value:?} for control key {key}")]
    InvalidValue {
        /// Key the write targeted.
        key: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// A mutator was asked to set a field to its current value.
    ///
    /// No-op transitions are rejected so the caller can tell "applied" from
    /// "nothing to do".
    #[error("{0} already set to the requested value")]
    Unchanged(&'static str),

    /// A display-dependent operation was attempted before any blanking
    /// event was ever observed.
    #[error("display state has never been observed")]
    DisplayStateUnknown,

    /// A delay mutation was attempted while display-driven policy is off.
    #[error("display-driven policy is not active")]
    DisplayDrivenInactive,

    /// The deferred-flush worker thread could not be spawned.
    ///
    /// Fatal to controller startup: no event sources get registered.
    #[error("failed to spawn flush worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Result type for dynsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a rejected no-op transition.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Error::Unchanged(_))
    }

    /// Check if this error rejected an operation because of missing or
    /// inactive display-driven state.
    pub fn is_display_rejection(&self) -> bool {
        matches!(
            self,
            Error::DisplayStateUnknown | Error::DisplayDrivenInactive
        )
    }

    /// Check if this error is fatal to controller startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::WorkerSpawn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_predicate() {
        assert!(Error::Unchanged("enabled").is_unchanged());
        assert!(!Error::DisplayStateUnknown.is_unchanged());
    }

    #[test]
    fn test_display_rejection_predicate() {
        assert!(Error::DisplayStateUnknown.is_display_rejection());
        assert!(Error::DisplayDrivenInactive.is_display_rejection());
        assert!(!Error::ReadOnly("version").is_display_rejection());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::InvalidValue {
            key: "delay_ms",
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"abc\" for control key delay_ms"
        );
        assert_eq!(
            Error::UnknownKey("bogus".to_string()).to_string(),
            "unknown control key: bogus"
        );
    }

    #[test]
    fn test_worker_spawn_is_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads");
        let err = Error::from(io);
        assert!(err.is_fatal());
    }
}
