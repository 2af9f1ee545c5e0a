//! Early-error checks and other facts the AST builder derives from source text.

use pest::iterators::Pair;
use rustc_hash::{FxHashMap, FxHashSet};

use super::api::Rule;
use super::ast::{IdentifierData, PropertyValue};
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object_property::PropertyKey;

/// True when `text` is exactly one string literal, quotes included.
pub(crate) fn is_string_literal_text(text: &str) -> bool {
    let mut chars = text.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return false,
    };
    let mut escaped = false;
    let mut closed = false;
    for c in chars {
        if closed {
            return false;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            closed = true;
        }
    }
    closed
}

/// Scans the directive prologue (the leading string-literal expression statements) of a body.
pub(crate) fn has_use_strict_directive(statements: &[Pair<Rule>]) -> bool {
    for statement in statements {
        if statement.as_rule() != Rule::expression_statement {
            return false;
        }
        let text = match statement.clone().into_inner().next() {
            Some(expression) => expression.as_str(),
            None => return false,
        };
        if !is_string_literal_text(text) {
            return false;
        }
        if text == "\"use strict\"" || text == "'use strict'" {
            return true;
        }
    }
    false
}

lazy_static! {
    /// Future reserved words that only strict code rejects as identifiers.
    static ref STRICT_MODE_RESERVED_WORDS: FxHashSet<&'static str> = [
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "static",
        "yield",
    ]
    .into_iter()
    .collect();
}

/// Names strict code may not bind or assign.
pub(crate) fn is_restricted_in_strict_mode(name: &JsString) -> bool {
    *name == JsString::from("eval") || *name == JsString::from("arguments")
}

pub(crate) fn is_strict_mode_reserved_word(name: &JsString) -> bool {
    STRICT_MODE_RESERVED_WORDS.contains(name.to_string().as_str())
}

/// First parameter name that appears twice.
pub(crate) fn find_duplicate_parameter(params: &[IdentifierData]) -> Option<&IdentifierData> {
    let mut seen = FxHashSet::default();
    params.iter().find(|p| !seen.insert(p.name.clone()))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PropertyShape {
    Data,
    Getter,
    Setter,
    Accessor,
}

/// Tracks the properties of one object literal. A key may be either a data property or a
/// getter/setter pair, never both; strict code also rejects repeated data keys.
pub(crate) struct ObjectLiteralKeys {
    shapes: FxHashMap<PropertyKey, PropertyShape>,
    strict: bool,
}

impl ObjectLiteralKeys {
    pub(crate) fn new(strict: bool) -> Self {
        ObjectLiteralKeys {
            shapes: FxHashMap::default(),
            strict,
        }
    }

    /// Records `key`; returns an error message when it conflicts with an earlier definition.
    pub(crate) fn add(&mut self, key: &PropertyKey, value: &PropertyValue) -> Result<(), String> {
        let incoming = match value {
            PropertyValue::Init(_) => PropertyShape::Data,
            PropertyValue::Get(_) => PropertyShape::Getter,
            PropertyValue::Set(_) => PropertyShape::Setter,
        };
        let merged = match (self.shapes.get(key).copied(), incoming) {
            (None, shape) => shape,
            (Some(PropertyShape::Data), PropertyShape::Data) if !self.strict => PropertyShape::Data,
            (Some(PropertyShape::Data), PropertyShape::Data) => {
                return Err(format!(
                    "Duplicate data property '{}' in object literal not allowed in strict mode",
                    key
                ));
            }
            (Some(PropertyShape::Data), _) | (Some(_), PropertyShape::Data) => {
                return Err(format!(
                    "Object literal may not have data and accessor property '{}' with the same name",
                    key
                ));
            }
            (Some(PropertyShape::Getter), PropertyShape::Setter)
            | (Some(PropertyShape::Setter), PropertyShape::Getter) => PropertyShape::Accessor,
            (Some(_), _) => {
                return Err(format!(
                    "Object literal may not have multiple get/set accessors with the same name '{}'",
                    key
                ));
            }
        };
        self.shapes.insert(key.clone(), merged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_text() {
        assert!(is_string_literal_text("\"use strict\""));
        assert!(is_string_literal_text("'a\\'b'"));
        assert!(!is_string_literal_text("\"a\" + \"b\""));
        assert!(!is_string_literal_text("x"));
        assert!(!is_string_literal_text("\"unterminated"));
    }
}
