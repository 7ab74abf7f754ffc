//! Common error types for the navigation core
//!
//! This module provides standardized error handling across all systems
//! so fallible paths surface a single error enum instead of panics.

use std::fmt;

/// Core error type for the navigation engine
#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorError {
    /// No path exists (failure timeout elapsed or a movement reported Unreachable)
    Unreachable(String),

    /// The cumulative planning timeout was hit
    Timeout(String),

    /// The agent left the current movement's valid positions, or a
    /// higher-priority process preempted the active one
    Interrupted(String),

    /// Invalid input at construction time (NaN heuristic, empty composite
    /// goal, zero direction vector)
    InvalidInput(String),

    /// A required block lookup returned null at a committed step
    WorldUnavailable(String),

    /// Chunk cache read/write failed; the cache continues in memory
    Persistence(String),

    /// Generic error with custom message
    Generic(String),
}

impl fmt::Display for NavigatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigatorError::Unreachable(msg) => write!(f, "Unreachable: {}", msg),
            NavigatorError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            NavigatorError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
            NavigatorError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            NavigatorError::WorldUnavailable(msg) => write!(f, "World Unavailable: {}", msg),
            NavigatorError::Persistence(msg) => write!(f, "Persistence Error: {}", msg),
            NavigatorError::Generic(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for NavigatorError {}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Error construction helpers
impl NavigatorError {
    /// Create an unreachable error
    pub fn unreachable<S: Into<String>>(msg: S) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an interrupted error
    pub fn interrupted<S: Into<String>>(msg: S) -> Self {
        Self::Interrupted(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a world-unavailable error
    pub fn world_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::WorldUnavailable(msg.into())
    }

    /// Create a persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Self::Generic(msg.into())
    }
}

impl From<std::io::Error> for NavigatorError {
    fn from(e: std::io::Error) -> Self {
        NavigatorError::persistence(format!("IO error: {}", e))
    }
}

impl From<ron::error::SpannedError> for NavigatorError {
    fn from(e: ron::error::SpannedError) -> Self {
        NavigatorError::generic(format!("RON parse error: {}", e))
    }
}

impl From<ron::Error> for NavigatorError {
    fn from(e: ron::Error) -> Self {
        NavigatorError::generic(format!("RON serialization error: {}", e))
    }
}
