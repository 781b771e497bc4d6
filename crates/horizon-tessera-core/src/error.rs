//! Error types for Horizon Tessera core.

use std::fmt;

/// The main error type for core operations.
#[derive(Debug)]
pub enum CoreError {
    /// An observer failed while handling a dispatched event.
    Observer(ObserverError),
    /// Update-queue related error.
    Update(UpdateError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observer(err) => write!(f, "Observer error: {err}"),
            Self::Update(err) => write!(f, "Update queue error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Observer(err) => Some(err),
            Self::Update(err) => Some(err),
        }
    }
}

impl From<ObserverError> for CoreError {
    fn from(err: ObserverError) -> Self {
        Self::Observer(err)
    }
}

impl From<UpdateError> for CoreError {
    fn from(err: UpdateError) -> Self {
        Self::Update(err)
    }
}

/// A failure reported by (or caught from) a single connected observer.
///
/// Observer failures are isolated: one failing observer never prevents
/// delivery to the remaining observers. The emitter receives every failure
/// through the dispatch report instead of a swallowed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverError {
    message: String,
    panicked: bool,
}

impl ObserverError {
    /// Creates an observer error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            panicked: false,
        }
    }

    /// Creates an observer error from a caught panic payload.
    pub fn panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "observer panicked".to_string()
        };
        Self {
            message,
            panicked: true,
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `true` if this failure was recovered from a panic rather than an
    /// error return.
    pub fn is_panic(&self) -> bool {
        self.panicked
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(f, "observer panicked: {}", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ObserverError {}

/// Update-queue specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// The update task ID is invalid or has already been unregistered.
    InvalidTaskId,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTaskId => write!(f, "Invalid or unregistered update task ID"),
        }
    }
}

impl std::error::Error for UpdateError {}

/// A specialized Result type for Horizon Tessera core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
