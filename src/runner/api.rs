//! Host-facing engine API.
//!
//! ```
//! use walkjs::runner::api::Engine;
//! use walkjs::runner::ds::value::JsValue;
//! use walkjs::runner::plugin::EngineConfig;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.register_native_function("twice", 1, |_, _, args| match args.first() {
//!     Some(JsValue::Number(n)) => Ok(JsValue::from_f64(n.to_f64() * 2.0)),
//!     _ => Ok(JsValue::Undefined),
//! });
//! let result = engine.evaluate_source("twice(21)").unwrap();
//! assert_eq!(result, JsValue::from_i64(42));
//! ```

use std::rc::Rc;

use thiserror::Error;

use crate::parser::ast::ProgramData;
use crate::parser::{JsParser, Rule};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::function_object::create_native_function;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{create_method_property, put};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function;
use crate::runner::eval::statement::{evaluate_program, get_global_binding};
use crate::runner::plugin::config::EngineConfig;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInFn, EvalContext, InterruptHandler};

/// Why a host-level evaluation did not produce a value.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Parse(#[from] pest::error::Error<Rule>),
    /// An uncaught program-level error, or an internal engine failure.
    #[error("{0}")]
    Runtime(JErrorType),
    #[error("Evaluation interrupted by host")]
    Interrupted,
}

impl From<JErrorType> for EngineError {
    fn from(error: JErrorType) -> Self {
        match error {
            JErrorType::Interrupted => EngineError::Interrupted,
            JErrorType::Internal(message) => {
                tracing::error!(%message, "internal engine error");
                EngineError::Runtime(JErrorType::Internal(message))
            }
            other => EngineError::Runtime(other),
        }
    }
}

/// One engine instance: a realm with the standard library installed and its evaluation
/// context. Instances share nothing and are not `Send`.
pub struct Engine {
    ctx: EvalContext,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, BuiltInRegistry::with_core())
    }

    /// Engine whose globals come from `registry` instead of the default library.
    pub fn with_registry(config: EngineConfig, registry: BuiltInRegistry) -> Self {
        let mut ctx = EvalContext::new(config);
        registry.install(&mut ctx);
        Engine { ctx }
    }

    /// Parses and runs a script, returning its completion value.
    pub fn evaluate_source(&mut self, source: &str) -> Result<JsValue, EngineError> {
        let program = JsParser::parse_to_ast_with_strictness(source, self.ctx.config.strict)?;
        self.evaluate_program(&program)
    }

    /// Runs an already parsed program. With `EngineConfig::strict` set, global code and every
    /// function created during the run execute as strict code. Strict-only early errors are a
    /// parse-time check, so a tree parsed in sloppy mode does not get them.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_program(&mut self, program: &ProgramData) -> Result<JsValue, EngineError> {
        let result = evaluate_program(program, &mut self.ctx);
        tracing::debug!(ok = result.is_ok(), "program finished");
        Ok(result?)
    }

    pub fn call_function(
        &mut self,
        f: &JsValue,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Result<JsValue, EngineError> {
        self.with_host_context(|ctx| function::call_function(ctx, f, this, args))
    }

    pub fn construct(&mut self, f: &JsValue, args: Vec<JsValue>) -> Result<JsValue, EngineError> {
        self.with_host_context(|ctx| function::construct(ctx, f, args))
    }

    /// Reads a global binding, `let`/`const` included.
    pub fn get_global(&mut self, name: &str) -> Result<JsValue, EngineError> {
        self.with_host_context(|ctx| get_global_binding(ctx, name))
    }

    /// Assigns a global binding the way strict global code would, creating it on the global
    /// object if it does not exist.
    pub fn put_global(&mut self, name: &str, value: JsValue) -> Result<(), EngineError> {
        self.with_host_context(|ctx| {
            let key = PropertyKey::from(name);
            let target = match ctx.realm.global_scope.lookup(&key) {
                Some(scope) => scope.variable_object.clone(),
                None => ctx.global_object(),
            };
            put(ctx, &target, key, value, true)
        })
    }

    /// Binds a host closure as a global function.
    pub fn register_native_function<F>(&mut self, name: &str, length: u32, f: F)
    where
        F: Fn(&mut EvalContext, JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
    {
        let function_prototype = self.ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);
        let function = create_native_function(
            name,
            length,
            BuiltInFn::Host(Rc::new(f)),
            None,
            Some(function_prototype),
        );
        create_method_property(
            &self.ctx.global_object(),
            PropertyKey::from(name),
            JsValue::Object(function),
        );
    }

    pub fn set_interrupt_handler(&mut self, handler: InterruptHandler) {
        self.ctx.set_interrupt_handler(handler);
    }

    pub fn global_object(&self) -> JsObjectType {
        self.ctx.global_object()
    }

    pub fn context_mut(&mut self) -> &mut EvalContext {
        &mut self.ctx
    }

    /// Renders an error for people, running a thrown object's `toString` when it has one.
    pub fn describe_error(&mut self, error: &EngineError) -> String {
        match error {
            EngineError::Runtime(JErrorType::Thrown(value)) => {
                let value = value.clone();
                match self.with_host_context(|ctx| to_string(ctx, &value)) {
                    Ok(text) => format!("Uncaught {}", text),
                    Err(_) => error.to_string(),
                }
            }
            _ => error.to_string(),
        }
    }

    /// Host calls made outside a running script get a global execution context of their own.
    fn with_host_context<T>(
        &mut self,
        f: impl FnOnce(&mut EvalContext) -> Result<T, JErrorType>,
    ) -> Result<T, EngineError> {
        let pushed = self.ctx.execution_ctx_stack.is_empty();
        if pushed {
            let global_this = JsValue::Object(self.ctx.global_object());
            let scope = self.ctx.realm.global_scope.clone();
            let strict = self.ctx.config.strict;
            self.ctx.execution_ctx_stack.push_execution_ctx(ExecutionContext {
                function: None,
                scope,
                this_value: global_this,
                strict,
            });
        }
        let result = f(&mut self.ctx);
        if pushed {
            self.ctx.execution_ctx_stack.pop_running_execution_ctx();
        }
        Ok(result?)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_bindings_round_trip() {
        let mut engine = Engine::default();
        engine.put_global("answer", JsValue::from_i64(41)).unwrap();
        engine.evaluate_source("answer = answer + 1;").unwrap();
        assert_eq!(engine.get_global("answer").unwrap(), JsValue::from_i64(42));
    }

    #[test]
    fn calls_script_functions_from_the_host() {
        let mut engine = Engine::default();
        engine
            .evaluate_source("function add(a, b) { return a + b; } function P(x) { this.x = x; }")
            .unwrap();
        let add = engine.get_global("add").unwrap();
        let sum = engine
            .call_function(&add, JsValue::Undefined, vec![JsValue::from_i64(2), JsValue::from_i64(3)])
            .unwrap();
        assert_eq!(sum, JsValue::from_i64(5));

        let p = engine.get_global("P").unwrap();
        let instance = engine.construct(&p, vec![JsValue::from_str("v")]).unwrap();
        assert!(instance.is_object());
    }

    #[test]
    fn uncaught_errors_reach_the_host() {
        let mut engine = Engine::default();
        let error = engine.evaluate_source("null.x").unwrap_err();
        assert!(matches!(error, EngineError::Runtime(JErrorType::TypeError(_))));
        let error = engine.evaluate_source("throw new RangeError('bad');").unwrap_err();
        assert_eq!(engine.describe_error(&error), "Uncaught RangeError: bad");
        let error = engine.evaluate_source("var = ;").unwrap_err();
        assert!(matches!(error, EngineError::Parse(_)));
    }
}
