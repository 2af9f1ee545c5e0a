mod api;
pub mod ast;
mod static_semantics;

pub use api::{parse_to_token_tree, JsParser, Rule};
