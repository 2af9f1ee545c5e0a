//! # walkjs - a tree-walking ECMAScript engine
//!
//! A PEG parser producing a hoisting-aware AST, and an interpreter that evaluates it directly
//! against an ES5-style object model: attributed property slots, prototype chains, scope chains
//! of variable objects, completion records for control flow and catchable engine errors.
//!
//! ## Quick Start
//!
//! ### Parsing JavaScript
//!
//! ```
//! use walkjs::parser::JsParser;
//!
//! let code = "var x = 5 + 3;";
//! let ast = JsParser::parse_to_ast_from_str(code).unwrap();
//! assert_eq!(ast.body.len(), 1);
//! assert_eq!(ast.declarations.var_names.len(), 1);
//! ```
//!
//! ### Running JavaScript
//!
//! ```
//! use walkjs::runner::api::Engine;
//! use walkjs::runner::ds::value::JsValue;
//! use walkjs::runner::plugin::EngineConfig;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let result = engine
//!     .evaluate_source("function fact(n) { return n < 2 ? 1 : n * fact(n - 1); } fact(5)")
//!     .unwrap();
//! assert_eq!(result, JsValue::from_i64(120));
//! ```
//!
//! ### Catching engine errors
//!
//! Errors raised by the engine itself (`TypeError`, `ReferenceError`, ...) are ordinary error
//! objects by the time a script's `catch` clause sees them:
//!
//! ```
//! use walkjs::runner::api::Engine;
//! use walkjs::runner::ds::value::JsValue;
//!
//! let mut engine = Engine::default();
//! let result = engine
//!     .evaluate_source("try { undefined.x; } catch (e) { e instanceof TypeError; }")
//!     .unwrap();
//! assert_eq!(result, JsValue::Boolean(true));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser, early errors and AST types
//! - **[`runner`]** - The interpreter
//!   - **[`runner::ds`]** - Values, strings, property slots, objects and abstract operations
//!   - **[`runner::eval`]** - Statement and expression evaluation, function calls
//!   - **[`runner::plugin`]** - Evaluation context, configuration and builtin registry
//!   - **[`runner::std_lib`]** - The builtin library
//!   - **[`runner::api`]** - The host-facing [`Engine`](runner::api::Engine)

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
