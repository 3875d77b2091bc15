//! Utility types for trait definitions.
use std::{
    fmt,
    time::{Duration, Instant},
};

/// Type to handle FMM related errors
#[derive(Debug)]
pub enum FmmError {
    /// Failure to run some business logic
    Failed(String),

    /// Rejected options or inputs, detected before any evaluation work is done
    InvalidConfig(String),

    /// I/O failure
    Io(std::io::Error),
}

impl std::fmt::Display for FmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmmError::Failed(e) => write!(f, "Failed: {}", e),
            FmmError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
            FmmError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FmmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FmmError::Io(e) => Some(e),
            FmmError::Failed(_e) => None,
            FmmError::InvalidConfig(_e) => None,
        }
    }
}

impl From<std::io::Error> for FmmError {
    fn from(value: std::io::Error) -> Self {
        FmmError::Io(value)
    }
}

/// Enumeration of the stages of an evaluation, used to label timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FmmOperatorType {
    /// Initialisation of multipole and local storage
    Init,

    /// Upward pass, particle to multipole and multipole to multipole
    Upward,

    /// Interaction traversal of the tree, M2L, M2P and P2P
    Interaction,

    /// Downward pass, local to local and local to particle
    Downward,
}

impl fmt::Display for FmmOperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmmOperatorType::Init => write!(f, "init"),
            FmmOperatorType::Upward => write!(f, "upward"),
            FmmOperatorType::Interaction => write!(f, "interaction"),
            FmmOperatorType::Downward => write!(f, "downward"),
        }
    }
}

/// Wall clock time of a single evaluation stage.
#[derive(Debug, Clone, Copy)]
pub struct FmmOperatorTime {
    /// Stage being timed
    pub operator: FmmOperatorType,

    /// Time in milliseconds
    pub time: u64,
}

impl FmmOperatorTime {
    /// Record the time elapsed since `start`.
    pub fn from_instant(operator: FmmOperatorType, start: Instant) -> Self {
        Self::from_duration(operator, start.elapsed())
    }

    /// Record a measured duration.
    pub fn from_duration(operator: FmmOperatorType, duration: Duration) -> Self {
        Self {
            operator,
            time: duration.as_millis() as u64,
        }
    }
}
