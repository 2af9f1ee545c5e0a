//! Core types shared by the evaluator and the builtin library.

use std::fmt;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::{ExecutionContext, ExecutionContextStack};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::realm::{CodeRealm, WellKnownIntrinsics};
use crate::runner::ds::scope::ScopeRef;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::config::EngineConfig;

/// Host hook polled between statements; returning `true` aborts the evaluation.
pub type InterruptHandler = Box<dyn FnMut() -> bool>;

/// Everything one engine instance threads through evaluation.
///
/// The running execution context (scope, `this`, strictness) lives on a LIFO stack, so builtins
/// calling back into script and host calls made while a script is running nest safely.
pub struct EvalContext {
    pub realm: CodeRealm,
    pub execution_ctx_stack: ExecutionContextStack,
    pub config: EngineConfig,
    interrupt_handler: Option<InterruptHandler>,
    steps_until_interrupt_check: u32,
    call_depth: usize,
}

impl EvalContext {
    pub fn new(config: EngineConfig) -> Self {
        let steps_until_interrupt_check = config.interrupt_check_interval;
        EvalContext {
            realm: CodeRealm::new(),
            execution_ctx_stack: ExecutionContextStack::new(),
            config,
            interrupt_handler: None,
            steps_until_interrupt_check,
            call_depth: 0,
        }
    }

    pub fn set_interrupt_handler(&mut self, handler: InterruptHandler) {
        self.interrupt_handler = Some(handler);
    }

    /// Counts one statement dispatch and polls the interrupt handler when the interval is up.
    pub fn check_interrupt(&mut self) -> Result<(), JErrorType> {
        self.steps_until_interrupt_check = self.steps_until_interrupt_check.saturating_sub(1);
        if self.steps_until_interrupt_check > 0 {
            return Ok(());
        }
        self.steps_until_interrupt_check = self.config.interrupt_check_interval.max(1);
        let stop = match self.interrupt_handler.as_mut() {
            Some(handler) => handler(),
            None => false,
        };
        if stop {
            tracing::debug!("evaluation interrupted by host");
            return Err(JErrorType::Interrupted);
        }
        Ok(())
    }

    pub fn global_object(&self) -> JsObjectType {
        self.realm.global_this.clone()
    }

    pub fn intrinsic(&self, which: WellKnownIntrinsics) -> JsObjectType {
        self.realm.get_intrinsics_value(which)
    }

    fn running(&self) -> Result<&ExecutionContext, JErrorType> {
        self.execution_ctx_stack
            .get_running_execution_ctx()
            .ok_or_else(|| JErrorType::Internal("no running execution context".to_string()))
    }

    pub fn current_scope(&self) -> Result<ScopeRef, JErrorType> {
        Ok(self.running()?.scope.clone())
    }

    /// Replaces the running context's scope and returns the previous one, which the caller must
    /// hand back to `restore_scope` on every exit path.
    pub fn enter_scope(&mut self, scope: ScopeRef) -> Result<ScopeRef, JErrorType> {
        let running = self
            .execution_ctx_stack
            .get_running_execution_ctx_mut()
            .ok_or_else(|| JErrorType::Internal("no running execution context".to_string()))?;
        Ok(std::mem::replace(&mut running.scope, scope))
    }

    pub fn restore_scope(&mut self, scope: ScopeRef) {
        if let Some(running) = self.execution_ctx_stack.get_running_execution_ctx_mut() {
            running.scope = scope;
        }
    }

    pub fn is_strict(&self) -> bool {
        self.running().map_or(self.config.strict, |c| c.strict)
    }

    pub fn this_value(&self) -> Result<JsValue, JErrorType> {
        Ok(self.running()?.this_value.clone())
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Marks entry into a call, raising `RangeError` past the configured depth.
    pub fn enter_call(&mut self) -> Result<(), JErrorType> {
        if self.call_depth >= self.config.max_call_depth {
            tracing::warn!(depth = self.call_depth, "call depth limit reached");
            return Err(JErrorType::RangeError(
                "Maximum call stack size exceeded".to_string(),
            ));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Function signature for built-in methods.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn =
    fn(ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType>;

/// Host closure form of a builtin.
pub type HostFn = Rc<dyn Fn(&mut EvalContext, JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType>>;

/// Built-in function - either compiled-in or host-provided.
#[derive(Clone)]
pub enum BuiltInFn {
    /// Direct function pointer.
    Native(NativeFn),
    /// Closure registered by the embedding host.
    Host(HostFn),
}

impl BuiltInFn {
    pub fn call(
        &self,
        ctx: &mut EvalContext,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Result<JsValue, JErrorType> {
        match self {
            BuiltInFn::Native(f) => f(ctx, this, args),
            BuiltInFn::Host(f) => f(ctx, this, args),
        }
    }
}

impl fmt::Debug for BuiltInFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltInFn::Native(_) => write!(f, "BuiltInFn::Native"),
            BuiltInFn::Host(_) => write!(f, "BuiltInFn::Host"),
        }
    }
}

/// A named builtin method plus its `length`.
pub struct BuiltInMethod {
    pub name: String,
    pub func: BuiltInFn,
    pub length: u32,
}

pub struct BuiltInConstructor {
    pub call: BuiltInFn,
    /// Behaviour under `new`; `None` makes the constructor reject `new`.
    pub construct: Option<BuiltInFn>,
    pub length: u32,
}

/// Built-in object definition, e.g. `Array` with its static and prototype members.
///
/// Definitions are plain data until `BuiltInRegistry::install` materializes them as ordinary
/// objects on the global object.
pub struct BuiltInObject {
    /// Global binding name (e.g. "Array", "console").
    pub name: String,

    /// Intrinsic that receives the prototype members and becomes the constructor's `prototype`.
    pub prototype: Option<WellKnownIntrinsics>,

    pub constructor: Option<BuiltInConstructor>,

    pub static_methods: Vec<BuiltInMethod>,

    pub prototype_methods: Vec<BuiltInMethod>,

    /// Read-only static values (`Number.MAX_VALUE`).
    pub static_properties: Vec<(String, JsValue)>,

    /// Writable, non-enumerable values placed on the prototype (`Error.prototype.name`).
    pub prototype_properties: Vec<(String, JsValue)>,
}

impl BuiltInObject {
    pub fn new(name: impl Into<String>) -> Self {
        BuiltInObject {
            name: name.into(),
            prototype: None,
            constructor: None,
            static_methods: Vec::new(),
            prototype_methods: Vec::new(),
            static_properties: Vec::new(),
            prototype_properties: Vec::new(),
        }
    }

    pub fn with_prototype(mut self, prototype: WellKnownIntrinsics) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Constructor whose call and `new` behaviour are the same function.
    pub fn with_constructor(self, constructor: NativeFn, length: u32) -> Self {
        self.with_split_constructor(constructor, Some(constructor), length)
    }

    pub fn with_split_constructor(
        mut self,
        call: NativeFn,
        construct: Option<NativeFn>,
        length: u32,
    ) -> Self {
        self.constructor = Some(BuiltInConstructor {
            call: BuiltInFn::Native(call),
            construct: construct.map(BuiltInFn::Native),
            length,
        });
        self
    }

    pub fn add_static_method(mut self, name: impl Into<String>, func: NativeFn, length: u32) -> Self {
        self.static_methods.push(BuiltInMethod {
            name: name.into(),
            func: BuiltInFn::Native(func),
            length,
        });
        self
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn, length: u32) -> Self {
        self.prototype_methods.push(BuiltInMethod {
            name: name.into(),
            func: BuiltInFn::Native(func),
            length,
        });
        self
    }

    pub fn add_property(mut self, name: impl Into<String>, value: JsValue) -> Self {
        self.static_properties.push((name.into(), value));
        self
    }

    pub fn add_prototype_property(mut self, name: impl Into<String>, value: JsValue) -> Self {
        self.prototype_properties.push((name.into(), value));
        self
    }
}
