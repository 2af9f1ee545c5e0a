//! Evaluation module for executing JavaScript AST.
//!
//! Statements produce [`Completion`] records; expressions produce values, or a [`Reference`]
//! where the operator needs a binding rather than its value. Thrown values travel as
//! `Err(JErrorType)`.
//!
//! [`JErrorType`]: crate::runner::ds::error::JErrorType

pub mod expression;
pub mod function;
mod stack;
pub mod statement;
pub mod types;

pub use expression::evaluate_expression;
pub use function::{call_function, construct};
pub use statement::{evaluate_program, execute_statement};
pub use types::{Completion, CompletionType, Reference, ReferenceBase};
