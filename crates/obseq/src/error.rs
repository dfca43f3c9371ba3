#![forbid(unsafe_code)]

//! Error taxonomy for sequence operations.

use std::fmt;

use crate::event::EventKind;

/// Error produced by a fallible listener registered with
/// [`ObservableSeq::try_on`](crate::ObservableSeq::try_on).
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Crate result alias.
pub type Result<T, E = SeqError> = std::result::Result<T, E>;

/// Errors from sequence operations.
#[derive(Debug)]
pub enum SeqError {
    /// An argument failed a precondition. Raised before any mutation or
    /// dispatch takes place.
    InvalidArgument(String),
    /// A single-event trigger named an event with no live listeners.
    MissingEventHandlers(EventKind),
    /// A listener failed while handling `event`. Remaining listeners for
    /// this and any later events of the same trigger were skipped.
    Listener {
        event: EventKind,
        source: ListenerError,
    },
}

impl SeqError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns true for [`SeqError::InvalidArgument`].
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true for [`SeqError::MissingEventHandlers`].
    #[must_use]
    pub fn is_missing_handlers(&self) -> bool {
        matches!(self, Self::MissingEventHandlers(_))
    }
}

impl fmt::Display for SeqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::MissingEventHandlers(kind) => {
                write!(f, "no handlers registered for event '{kind}'")
            }
            Self::Listener { event, source } => {
                write!(f, "listener for '{event}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for SeqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Listener { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_messages() {
        let err = SeqError::invalid("index 7 exceeds maximum length 4");
        assert_eq!(
            err.to_string(),
            "invalid argument: index 7 exceeds maximum length 4"
        );

        let err = SeqError::MissingEventHandlers(EventKind::Update);
        assert_eq!(err.to_string(), "no handlers registered for event 'update'");
    }

    #[test]
    fn listener_error_exposes_source() {
        let err = SeqError::Listener {
            event: EventKind::Change,
            source: "binding detached".into(),
        };
        assert_eq!(
            err.to_string(),
            "listener for 'change' failed: binding detached"
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("binding detached"));
    }

    #[test]
    fn predicates() {
        assert!(SeqError::invalid("x").is_invalid_argument());
        assert!(!SeqError::invalid("x").is_missing_handlers());
        assert!(SeqError::MissingEventHandlers(EventKind::Insert).is_missing_handlers());
    }
}
