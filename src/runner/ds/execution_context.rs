use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::scope::ScopeRef;
use crate::runner::ds::value::JsValue;

/// State of one in-flight evaluation: a program, an `eval`, or a function activation.
pub struct ExecutionContext {
    pub function: Option<JsObjectType>,
    /// Current innermost scope. Blocks, `with` and `catch` replace it and restore it on exit.
    pub scope: ScopeRef,
    pub this_value: JsValue,
    pub strict: bool,
}

/// LIFO stack of execution contexts. Every entry into the evaluator pushes one and pops it on
/// the way out, whether it finishes normally or unwinds with an error.
pub struct ExecutionContextStack {
    stack: Vec<ExecutionContext>,
}
impl ExecutionContextStack {
    pub fn new() -> Self {
        ExecutionContextStack { stack: Vec::new() }
    }

    pub fn get_running_execution_ctx(&self) -> Option<&ExecutionContext> {
        self.stack.last()
    }

    pub fn get_running_execution_ctx_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.stack.last_mut()
    }

    pub fn pop_running_execution_ctx(&mut self) -> Option<ExecutionContext> {
        self.stack.pop()
    }

    pub fn push_execution_ctx(&mut self, ctx: ExecutionContext) {
        self.stack.push(ctx)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
impl Default for ExecutionContextStack {
    fn default() -> Self {
        Self::new()
    }
}
