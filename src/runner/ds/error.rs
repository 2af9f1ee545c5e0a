use thiserror::Error;

use crate::runner::ds::value::JsValue;

/// Every way an evaluation can fail.
///
/// The first five kinds are program-level errors: they unwind like a `throw`, run `finally`
/// blocks and can be caught. `Internal` and `Interrupted` abort the whole evaluation.
#[derive(Debug, Clone, Error)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}")]
    TypeError(String),
    #[error("Uncaught range error: {0}")]
    RangeError(String),
    #[error("Uncaught syntax error: {0}")]
    SyntaxError(String),
    #[error("Uncaught {0}")]
    Thrown(JsValue),
    /// Malformed tree shape or a broken engine invariant.
    #[error("Internal engine error: {0}")]
    Internal(String),
    #[error("Evaluation interrupted by host")]
    Interrupted,
}
impl JErrorType {
    pub fn is_catchable(&self) -> bool {
        !matches!(self, JErrorType::Internal(_) | JErrorType::Interrupted)
    }

    /// Constructor name of the error object this kind materializes as.
    pub fn constructor_name(&self) -> Option<&'static str> {
        match self {
            JErrorType::ReferenceError(_) => Some("ReferenceError"),
            JErrorType::TypeError(_) => Some("TypeError"),
            JErrorType::RangeError(_) => Some("RangeError"),
            JErrorType::SyntaxError(_) => Some("SyntaxError"),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::Internal(m) => m.to_string(),
            JErrorType::Thrown(v) => v.to_string(),
            JErrorType::Interrupted => "interrupted".to_string(),
        }
    }
}
