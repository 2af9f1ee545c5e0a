//! Evaluation context, engine configuration and the builtin registry.
//!
//! Builtins are described as data ([`BuiltInObject`]) and materialized by
//! [`BuiltInRegistry::install`] as ordinary function and object values on the global object.
//! The evaluator never special-cases their names: a script can shadow, delete or replace any of
//! them like any other global binding.
//!
//! ```
//! use walkjs::runner::plugin::{BuiltInObject, BuiltInRegistry, EvalContext};
//! use walkjs::runner::ds::value::JsValue;
//! use walkjs::runner::ds::error::JErrorType;
//!
//! fn double(_: &mut EvalContext, _: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
//!     match args.first() {
//!         Some(JsValue::Number(n)) => Ok(JsValue::from_f64(n.to_f64() * 2.0)),
//!         _ => Ok(JsValue::Undefined),
//!     }
//! }
//!
//! let mut registry = BuiltInRegistry::with_core();
//! registry.register_object(BuiltInObject::new("Utils").add_static_method("double", double, 1));
//! let mut ctx = EvalContext::default();
//! registry.install(&mut ctx);
//! ```

pub mod config;
pub mod registry;
pub mod types;

pub use config::EngineConfig;
pub use registry::{BuiltInRegistry, GlobalValueKind};
pub use types::{BuiltInFn, BuiltInObject, EvalContext, NativeFn};
