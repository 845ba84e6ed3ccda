use thiserror::Error;

/// Errors that can occur while preparing or running a simulation.
///
/// All variants are detected before virtual time starts advancing; a run
/// that has begun dispatching events never fails mid-flight (malformed
/// graph branches are dropped and surfaced as warnings instead).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A scenario parameter change targets a step that does not exist in
    /// the process definition.
    #[error("invalid scenario: parameter change targets unknown step '{step}'")]
    UnknownChangeTarget {
        /// The step id named by the parameter change.
        step: String,
    },
    /// A scenario resource-capacity change coerces to a capacity below 1.
    #[error("invalid scenario: capacity for step '{step}' must be >= 1, got {value}")]
    InvalidCapacity {
        /// The step id whose capacity was changed.
        step: String,
        /// The offending raw value from the parameter change.
        value: f64,
    },
}

/// A type alias for `Result<T, EngineError>`.
pub type SimResult<T> = Result<T, EngineError>;
