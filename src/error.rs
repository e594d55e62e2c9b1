//! Error types for the execution engine

use crate::instructions::{Handle, HandleKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading or executing a module
///
/// Serializable so failed ensemble slots survive export intact.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineError {
    /// RecordOutput referenced a result no prior Measure produced in this shot
    #[error("record output for result {result:?} (index {index}) with no prior measurement")]
    UnrecordedResult { result: Handle, index: usize },

    /// Resolver was not configured to track this handle kind
    #[error("handle kind {kind:?} is not tracked by this resolver")]
    UnknownHandleKind { kind: HandleKind },

    /// Handle was not seen during the module pre-scan
    #[error("{kind:?} handle {handle:?} was never assigned an index")]
    UnresolvedHandle { handle: Handle, kind: HandleKind },

    /// Gate parameter count does not match the opcode
    #[error("{op} expects {expected} parameter(s), got {found}")]
    ParamArityMismatch {
        op: String,
        expected: usize,
        found: usize,
    },

    /// Backend rejected an operation
    #[error("backend rejected {op}: {reason}")]
    Backend { op: String, reason: String },

    /// Run configuration rejected before any shot started
    #[error("invalid run configuration: {0}")]
    Configuration(String),
}

/// Machine-checkable error category, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed instruction references; fatal to the affected shot only
    StructuralModule,
    /// Backend refused an operation; fatal to the shot, retry is the caller's call
    BackendOperation,
    /// Bad run options; rejected before any backend is constructed
    Configuration,
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::UnrecordedResult { .. }
            | EngineError::UnknownHandleKind { .. }
            | EngineError::UnresolvedHandle { .. }
            | EngineError::ParamArityMismatch { .. } => ErrorCategory::StructuralModule,
            EngineError::Backend { .. } => ErrorCategory::BackendOperation,
            EngineError::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Convenience constructor for backend refusals.
    pub fn backend(op: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Backend {
            op: op.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_variants() {
        let e = EngineError::Configuration("shot_count must be > 0".into());
        assert_eq!(e.category(), ErrorCategory::Configuration);

        let e = EngineError::backend("measure", "index out of range");
        assert_eq!(e.category(), ErrorCategory::BackendOperation);

        let e = EngineError::UnrecordedResult {
            result: Handle::from_raw(7),
            index: 0,
        };
        assert_eq!(e.category(), ErrorCategory::StructuralModule);
    }
}
