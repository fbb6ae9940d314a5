// src/display/error.rs
//! Error type shared by the selector, the registry and the backends.

use crate::display::BackendKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    /// The selected backend's device or windowing system could not be opened.
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    /// The caller broke a usage contract (e.g. asked for the active screen
    /// before any display was registered).
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),

    #[error("misconfigured display backend: {0}")]
    Misconfigured(String),

    #[error("a {active} backend is already initialized")]
    AlreadyInitialized { active: BackendKind },

    #[error("invalid flush: {0}")]
    InvalidFlush(String),

    #[error("unknown display id {0}")]
    UnknownDisplay(u32),

    #[error("unknown input id {0}")]
    UnknownInput(u32),

    #[error("device i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DisplayError {
    pub(crate) fn unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        DisplayError::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }
}
