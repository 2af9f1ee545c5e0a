//! Values, the object model and the abstract operations over them.

pub mod arguments_object;
pub mod array_object;
pub mod error;
pub mod execution_context;
pub mod function_object;
pub mod js_string;
pub mod object;
pub mod object_property;
pub mod operations;
pub mod realm;
pub mod scope;
pub mod string_object;
pub mod value;
