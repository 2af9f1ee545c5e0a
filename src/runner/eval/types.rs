//! Core types for the evaluation engine.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::ObjectClass;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{get, get_v, put, put_v};
use crate::runner::ds::scope::{ScopeKind, ScopeRef};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

/// Completion record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    /// Execution continues with the next statement.
    Normal,
    Return,
    Break,
    Continue,
}

/// Completion record.
///
/// Every statement evaluation returns one. Thrown values are not completions: they travel as
/// the `Err` side of [`EvalResult`] so that `?` unwinds them.
#[derive(Debug, Clone)]
pub struct Completion {
    pub completion_type: CompletionType,
    /// `None` is the "empty" value, which enclosing statement lists fill in.
    pub value: Option<JsValue>,
    /// Target label for break/continue.
    pub target: Option<JsString>,
}

impl Completion {
    /// Create a normal completion with no value.
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
            target: None,
        }
    }

    /// Create a normal completion with a value.
    pub fn normal_with_value(value: JsValue) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: Some(value),
            target: None,
        }
    }

    pub fn normal_with(value: Option<JsValue>) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value,
            target: None,
        }
    }

    /// Create a return completion.
    pub fn return_value(value: JsValue) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
            target: None,
        }
    }

    /// Create a break completion.
    pub fn break_completion(target: Option<JsString>) -> Self {
        Completion {
            completion_type: CompletionType::Break,
            value: None,
            target,
        }
    }

    /// Create a continue completion.
    pub fn continue_completion(target: Option<JsString>) -> Self {
        Completion {
            completion_type: CompletionType::Continue,
            value: None,
            target,
        }
    }

    /// Check if this is a normal completion.
    pub fn is_normal(&self) -> bool {
        self.completion_type == CompletionType::Normal
    }

    /// Check if this is an abrupt completion (not normal).
    pub fn is_abrupt(&self) -> bool {
        !self.is_normal()
    }

    /// Get the value, or undefined if none.
    pub fn get_value(&self) -> JsValue {
        self.value.clone().unwrap_or(JsValue::Undefined)
    }

    /// Fills an empty value with `value`, whatever the completion type.
    pub fn update_empty(mut self, value: Option<JsValue>) -> Self {
        if self.value.is_none() {
            self.value = value;
        }
        self
    }
}

/// Result of executing a statement.
pub type EvalResult = Result<Completion, JErrorType>;

/// Result of evaluating an expression to a value.
pub type ValueResult = Result<JsValue, JErrorType>;

/// Result of evaluating an expression to a reference.
pub type ReferenceResult = Result<Reference, JErrorType>;

/// What a reference resolves against.
#[derive(Clone)]
pub enum ReferenceBase {
    /// A property of a value; primitives are wrapped only for the duration of the access.
    Value(JsValue),
    /// A binding held by the variable object of a scope node.
    Environment(ScopeRef),
    /// The name was not found anywhere on the scope chain.
    Unresolvable,
}

/// A resolved name or property access, produced only for assignment targets, `delete`,
/// `typeof` operands and call callees.
#[derive(Clone)]
pub struct Reference {
    pub base: ReferenceBase,
    pub name: PropertyKey,
    pub strict: bool,
}

impl Reference {
    pub fn property(base: JsValue, name: PropertyKey, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Value(base),
            name,
            strict,
        }
    }

    pub fn environment(scope: ScopeRef, name: PropertyKey, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Environment(scope),
            name,
            strict,
        }
    }

    pub fn unresolvable(name: PropertyKey, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Unresolvable,
            name,
            strict,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn get_value(&self, ctx: &mut EvalContext) -> ValueResult {
        match &self.base {
            ReferenceBase::Unresolvable => Err(JErrorType::ReferenceError(format!(
                "{} is not defined",
                self.name
            ))),
            ReferenceBase::Value(base) => get_v(ctx, base, &self.name),
            ReferenceBase::Environment(scope) => {
                let object = scope.variable_object.clone();
                get(ctx, &object, &self.name)
            }
        }
    }

    pub fn put_value(&self, ctx: &mut EvalContext, value: JsValue) -> Result<(), JErrorType> {
        match &self.base {
            ReferenceBase::Unresolvable => {
                if self.strict {
                    return Err(JErrorType::ReferenceError(format!(
                        "{} is not defined",
                        self.name
                    )));
                }
                let global = ctx.global_object();
                put(ctx, &global, self.name.clone(), value, false)
            }
            ReferenceBase::Value(base) => {
                let base = base.clone();
                put_v(ctx, &base, self.name.clone(), value, self.strict)
            }
            ReferenceBase::Environment(scope) => {
                if self.is_immutable_binding(scope) {
                    return Err(JErrorType::TypeError(
                        "Assignment to constant variable.".to_string(),
                    ));
                }
                let object = scope.variable_object.clone();
                put(ctx, &object, self.name.clone(), value, self.strict)
            }
        }
    }

    /// A read-only own binding of a declarative or activation object is a `const`. The name
    /// binding of a function expression and read-only globals follow ordinary property rules.
    fn is_immutable_binding(&self, scope: &ScopeRef) -> bool {
        if matches!(
            scope.kind,
            ScopeKind::FunctionName | ScopeKind::Global | ScopeKind::With
        ) {
            return false;
        }
        let object = scope.variable_object.borrow();
        let object = object.as_js_object();
        if !matches!(
            object.class(),
            ObjectClass::Declarative | ObjectClass::Activation
        ) {
            return false;
        }
        object
            .get_own_property(&self.name)
            .map_or(false, |d| d.is_data_descriptor() && !d.is_writable())
    }

    /// The `this` a call through this reference receives.
    pub fn this_for_call(&self) -> JsValue {
        match &self.base {
            ReferenceBase::Value(base) => base.clone(),
            ReferenceBase::Environment(scope) if scope.kind == ScopeKind::With => {
                JsValue::Object(scope.variable_object.clone())
            }
            _ => JsValue::Undefined,
        }
    }
}
