//! Standard library built-in objects.
//!
//! Every module describes its objects with the [`BuiltInObject`] builder and hands them to the
//! registry; nothing here is known to the evaluator by name.
//!
//! [`BuiltInObject`]: crate::runner::plugin::types::BuiltInObject

pub mod array;
pub mod boolean;
pub mod console;
pub mod core;
pub mod error;
pub mod function;
pub mod global;
pub mod number;
pub mod object;
pub mod string;

pub use self::core::register_core_builtins;

use crate::runner::ds::value::JsValue;

/// Argument `index`, or `undefined` when the caller passed fewer.
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}
