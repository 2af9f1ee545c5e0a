//! The evaluator and everything it runs on.
//!
//! `ds` holds the object model and the abstract operations over it, `eval` walks the syntax
//! tree, `plugin` carries the evaluation context and builtin registry, `std_lib` is the builtin
//! library and `api` is the host-facing [`Engine`](api::Engine).

pub mod api;
pub mod ds;
pub mod eval;
pub mod plugin;
pub mod std_lib;
