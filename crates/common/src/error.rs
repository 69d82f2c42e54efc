use thiserror::Error;

/// How a venue failure should be treated by the caller.
///
/// The classification is decided by the venue adapter (HTTP status, rate
/// limits, connectivity), never by string inspection in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueErrorKind {
    /// Network/rate-limit/5xx: skip this symbol this tick, retry next tick.
    Transient,
    /// Rejected request or malformed response: retrying won't help.
    Permanent,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("venue error ({kind:?}): {message}")]
    Venue {
        kind: VenueErrorKind,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// A broken data-model invariant, e.g. a close with no pending trade
    /// record. Not recoverable in-band; must be surfaced, never swallowed.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn transient(message: impl Into<String>) -> Self {
        Error::Venue {
            kind: VenueErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Error::Venue {
            kind: VenueErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Venue {
                kind: VenueErrorKind::Transient,
                ..
            }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
