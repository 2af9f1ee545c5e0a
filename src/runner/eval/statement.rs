//! Statement execution.
//!
//! Statements return a [`Completion`]; thrown values and engine errors travel on the `Err` side.
//! Every statement dispatch counts towards the host interrupt check.

use crate::parser::ast::{
    BlockStatementData, CatchClauseData, DeclarationType, ExpressionType, ForIteratorData,
    ProgramData, StatementType, SwitchCaseData, VariableDeclarationData, VariableDeclarationKind,
    VariableDeclarationOrExpression,
};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{object_create_with_class, JsObjectType, ObjectClass};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::operations::object::{enumerate_keys, get, has_property};
use crate::runner::ds::operations::test_and_comparison::strict_equality_comparison;
use crate::runner::ds::operations::type_conversion::{to_boolean, to_object};
use crate::runner::ds::scope::{Scope, ScopeKind, ScopeRef};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;
use crate::runner::std_lib::error::create_error_object;

use super::expression::{evaluate_expression, evaluate_reference, resolve_identifier};
use super::function::{declare_lexical_bindings, instantiate_hoisted};
use super::stack::ensure_sufficient_stack;
use super::types::{Completion, CompletionType, EvalResult, ValueResult};

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    ensure_sufficient_stack(|| execute_labelled_statement(stmt, &[], ctx))
}

/// `labels` is the label set of the statement: the labels directly in front of it.
fn execute_labelled_statement(
    stmt: &StatementType,
    labels: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    ctx.check_interrupt()?;
    match stmt {
        StatementType::ExpressionStatement { expression, .. } => {
            let value = evaluate_expression(expression, ctx)?;
            Ok(Completion::normal_with_value(value))
        }
        StatementType::BlockStatement(block) => execute_block_statement(block, ctx),
        StatementType::EmptyStatement { .. } | StatementType::DebuggerStatement { .. } => {
            Ok(Completion::normal())
        }
        StatementType::DeclarationStatement(declaration) => match declaration {
            DeclarationType::FunctionDeclaration(_) => Ok(Completion::normal()),
            DeclarationType::VariableDeclaration(data) => {
                execute_variable_declaration(data, ctx)?;
                Ok(Completion::normal())
            }
        },
        StatementType::ReturnStatement { argument, .. } => {
            let value = match argument {
                Some(e) => evaluate_expression(e, ctx)?,
                None => JsValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }
        StatementType::BreakStatement { label, .. } => Ok(Completion::break_completion(
            label.as_ref().map(|l| l.name.clone()),
        )),
        StatementType::ContinueStatement { label, .. } => Ok(Completion::continue_completion(
            label.as_ref().map(|l| l.name.clone()),
        )),
        StatementType::ThrowStatement { argument, .. } => {
            let value = evaluate_expression(argument, ctx)?;
            Err(JErrorType::Thrown(value))
        }
        StatementType::LabeledStatement { label, body, .. } => {
            let mut label_set = labels.to_vec();
            label_set.push(label.name.clone());
            let completion = execute_labelled_statement(body, &label_set, ctx)?;
            if completion.completion_type == CompletionType::Break
                && completion.target.as_ref() == Some(&label.name)
            {
                return Ok(Completion::normal_with(completion.value));
            }
            Ok(completion)
        }
        StatementType::IfStatement {
            test,
            consequent,
            alternate,
            ..
        } => {
            let completion = if to_boolean(&evaluate_expression(test, ctx)?) {
                execute_statement(consequent, ctx)?
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, ctx)?
            } else {
                Completion::normal()
            };
            Ok(completion.update_empty(Some(JsValue::Undefined)))
        }
        StatementType::WhileStatement { test, body, .. } => {
            execute_while_statement(test, body, labels, ctx)
        }
        StatementType::DoWhileStatement { test, body, .. } => {
            execute_do_while_statement(test, body, labels, ctx)
        }
        StatementType::ForStatement {
            init,
            test,
            update,
            body,
            ..
        } => execute_for_statement(
            init.as_ref(),
            test.as_deref(),
            update.as_deref(),
            body,
            labels,
            ctx,
        ),
        StatementType::ForInStatement(data) => execute_for_in_statement(data, labels, ctx),
        StatementType::SwitchStatement {
            discriminant,
            cases,
            lexical_names,
            ..
        } => execute_switch_statement(discriminant, cases, lexical_names, ctx),
        StatementType::TryStatement {
            block,
            handler,
            finalizer,
            ..
        } => execute_try_statement(block, handler.as_ref(), finalizer.as_ref(), ctx),
        StatementType::WithStatement { object, body, .. } => {
            let value = evaluate_expression(object, ctx)?;
            let object = to_object(ctx, &value)?;
            let scope = Scope::push(&ctx.current_scope()?, object, ScopeKind::With);
            let completion = with_scope(ctx, scope, |ctx| execute_statement(body, ctx))?;
            Ok(completion.update_empty(Some(JsValue::Undefined)))
        }
    }
}

/// Executes statements in order; the list's value is the last non-empty statement value.
pub fn execute_statement_list(statements: &[StatementType], ctx: &mut EvalContext) -> EvalResult {
    let mut completion = Completion::normal();
    for statement in statements {
        let value = completion.value.take();
        completion = execute_statement(statement, ctx)?.update_empty(value);
        if completion.is_abrupt() {
            break;
        }
    }
    Ok(completion)
}

/// Runs `f` with `scope` as the running scope and restores the previous scope afterwards,
/// whatever the outcome.
fn with_scope<T>(
    ctx: &mut EvalContext,
    scope: ScopeRef,
    f: impl FnOnce(&mut EvalContext) -> Result<T, JErrorType>,
) -> Result<T, JErrorType> {
    let saved = ctx.enter_scope(scope)?;
    let result = f(ctx);
    ctx.restore_scope(saved);
    result
}

/// A new block scope node in front of the running scope, holding `names` as lexical bindings.
fn new_block_scope(ctx: &EvalContext, names: &[JsString]) -> Result<ScopeRef, JErrorType> {
    let object = object_create_with_class(ObjectClass::Declarative, None);
    declare_lexical_bindings(&object, names);
    Ok(Scope::push(&ctx.current_scope()?, object, ScopeKind::Block))
}

fn execute_block_statement(block: &BlockStatementData, ctx: &mut EvalContext) -> EvalResult {
    if block.lexical_names.is_empty() {
        return execute_statement_list(&block.body, ctx);
    }
    let scope = new_block_scope(ctx, &block.lexical_names)?;
    with_scope(ctx, scope, |ctx| execute_statement_list(&block.body, ctx))
}

fn execute_variable_declaration(
    data: &VariableDeclarationData,
    ctx: &mut EvalContext,
) -> Result<(), JErrorType> {
    for declarator in &data.declarations {
        match data.kind {
            VariableDeclarationKind::Var => {
                if let Some(init) = &declarator.init {
                    let reference = resolve_identifier(&declarator.id, ctx)?;
                    let value = evaluate_expression(init, ctx)?;
                    reference.put_value(ctx, value)?;
                }
            }
            VariableDeclarationKind::Let | VariableDeclarationKind::Const => {
                let value = match &declarator.init {
                    Some(init) => evaluate_expression(init, ctx)?,
                    None => JsValue::Undefined,
                };
                let target = ctx.current_scope()?.lexical_scope().variable_object.clone();
                initialize_lexical_binding(&target, declarator.id.key(), value, data.kind);
            }
        }
    }
    Ok(())
}

fn initialize_lexical_binding(
    target: &JsObjectType,
    key: PropertyKey,
    value: JsValue,
    kind: VariableDeclarationKind,
) {
    target.borrow_mut().as_js_object_mut().define_own_property(
        key,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value,
            kind != VariableDeclarationKind::Const,
            false,
            true,
        )),
    );
}

/// Whether a loop goes on after its body completed with `completion`.
fn loop_continues(completion: &Completion, labels: &[JsString]) -> bool {
    match completion.completion_type {
        CompletionType::Normal => true,
        CompletionType::Continue => match &completion.target {
            None => true,
            Some(target) => labels.contains(target),
        },
        _ => false,
    }
}

/// Turns the completion that stopped a loop into the loop's own completion. An unlabelled
/// `break` ends the loop normally; anything else propagates.
fn exit_loop(completion: Completion, value: Option<JsValue>) -> Completion {
    let completion = completion.update_empty(value);
    if completion.completion_type == CompletionType::Break && completion.target.is_none() {
        Completion::normal_with(completion.value)
    } else {
        completion
    }
}

fn execute_while_statement(
    test: &ExpressionType,
    body: &StatementType,
    labels: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut value = None;
    loop {
        if !to_boolean(&evaluate_expression(test, ctx)?) {
            return Ok(Completion::normal_with(value.or(Some(JsValue::Undefined))));
        }
        let completion = execute_statement(body, ctx)?;
        if completion.value.is_some() {
            value = completion.value.clone();
        }
        if !loop_continues(&completion, labels) {
            return Ok(exit_loop(completion, value));
        }
    }
}

fn execute_do_while_statement(
    test: &ExpressionType,
    body: &StatementType,
    labels: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut value = None;
    loop {
        let completion = execute_statement(body, ctx)?;
        if completion.value.is_some() {
            value = completion.value.clone();
        }
        if !loop_continues(&completion, labels) {
            return Ok(exit_loop(completion, value));
        }
        if !to_boolean(&evaluate_expression(test, ctx)?) {
            return Ok(Completion::normal_with(value.or(Some(JsValue::Undefined))));
        }
    }
}

fn execute_for_statement(
    init: Option<&VariableDeclarationOrExpression>,
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    labels: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    match init {
        Some(VariableDeclarationOrExpression::VariableDeclaration(data))
            if data.kind != VariableDeclarationKind::Var =>
        {
            let names: Vec<JsString> = data.declarations.iter().map(|d| d.id.name.clone()).collect();
            let scope = new_block_scope(ctx, &names)?;
            with_scope(ctx, scope, |ctx| {
                execute_variable_declaration(data, ctx)?;
                for_body_loop(test, update, body, labels, Some(&names), ctx)
            })
        }
        Some(VariableDeclarationOrExpression::VariableDeclaration(data)) => {
            execute_variable_declaration(data, ctx)?;
            for_body_loop(test, update, body, labels, None, ctx)
        }
        Some(VariableDeclarationOrExpression::Expression(e)) => {
            evaluate_expression(e, ctx)?;
            for_body_loop(test, update, body, labels, None, ctx)
        }
        None => for_body_loop(test, update, body, labels, None, ctx),
    }
}

/// The test/body/update cycle of a `for` loop. With `per_iteration` bindings, each iteration
/// runs in a copy of the loop scope so closures capture that iteration's values.
fn for_body_loop(
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    labels: &[JsString],
    per_iteration: Option<&[JsString]>,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut value = None;
    if let Some(names) = per_iteration {
        copy_iteration_scope(ctx, names)?;
    }
    loop {
        if let Some(test) = test {
            if !to_boolean(&evaluate_expression(test, ctx)?) {
                return Ok(Completion::normal_with(value.or(Some(JsValue::Undefined))));
            }
        }
        let completion = execute_statement(body, ctx)?;
        if completion.value.is_some() {
            value = completion.value.clone();
        }
        if !loop_continues(&completion, labels) {
            return Ok(exit_loop(completion, value));
        }
        if let Some(names) = per_iteration {
            copy_iteration_scope(ctx, names)?;
        }
        if let Some(update) = update {
            evaluate_expression(update, ctx)?;
        }
    }
}

/// Replaces the running loop scope with a fresh node holding copies of the current bindings.
fn copy_iteration_scope(ctx: &mut EvalContext, names: &[JsString]) -> Result<(), JErrorType> {
    let current = ctx.current_scope()?;
    let parent = current
        .parent
        .clone()
        .ok_or_else(|| JErrorType::Internal("loop scope without a parent".to_string()))?;
    let object = object_create_with_class(ObjectClass::Declarative, None);
    {
        let source = current.variable_object.borrow();
        let source = source.as_js_object();
        let mut copy = object.borrow_mut();
        let copy = copy.as_js_object_mut();
        for name in names {
            let key = PropertyKey::from(name.clone());
            if let Some(desc) = source.get_own_property(&key) {
                copy.define_own_property(
                    key,
                    PropertyDescriptorSetter::new_from_property_descriptor(desc),
                );
            }
        }
    }
    ctx.enter_scope(Scope::push(&parent, object, ScopeKind::Block))?;
    Ok(())
}

fn execute_for_in_statement(
    data: &ForIteratorData,
    labels: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    let subject = evaluate_expression(&data.right, ctx)?;
    if subject.is_nullish() {
        return Ok(Completion::normal_with(Some(JsValue::Undefined)));
    }
    let object = to_object(ctx, &subject)?;
    let mut value = None;
    for key in enumerate_keys(&object) {
        // Properties deleted before being visited are skipped.
        if !has_property(&object, &key) {
            continue;
        }
        let key_value = JsValue::String(key.to_js_string());
        let completion = match &data.left {
            VariableDeclarationOrExpression::VariableDeclaration(decl)
                if decl.kind != VariableDeclarationKind::Var =>
            {
                let names: Vec<JsString> =
                    decl.declarations.iter().map(|d| d.id.name.clone()).collect();
                let scope = new_block_scope(ctx, &names)?;
                with_scope(ctx, scope, |ctx| {
                    let target = ctx.current_scope()?.variable_object.clone();
                    for d in &decl.declarations {
                        initialize_lexical_binding(&target, d.id.key(), key_value.clone(), decl.kind);
                    }
                    execute_statement(&data.body, ctx)
                })?
            }
            VariableDeclarationOrExpression::VariableDeclaration(decl) => {
                for d in &decl.declarations {
                    let reference = resolve_identifier(&d.id, ctx)?;
                    reference.put_value(ctx, key_value.clone())?;
                }
                execute_statement(&data.body, ctx)?
            }
            VariableDeclarationOrExpression::Expression(target) => {
                let reference = evaluate_reference(target, ctx)?;
                reference.put_value(ctx, key_value)?;
                execute_statement(&data.body, ctx)?
            }
        };
        if completion.value.is_some() {
            value = completion.value.clone();
        }
        if !loop_continues(&completion, labels) {
            return Ok(exit_loop(completion, value));
        }
    }
    Ok(Completion::normal_with(value.or(Some(JsValue::Undefined))))
}

fn execute_switch_statement(
    discriminant: &ExpressionType,
    cases: &[SwitchCaseData],
    lexical_names: &[JsString],
    ctx: &mut EvalContext,
) -> EvalResult {
    let subject = evaluate_expression(discriminant, ctx)?;
    let run = |ctx: &mut EvalContext| -> EvalResult {
        let mut start = None;
        for (i, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let candidate = evaluate_expression(test, ctx)?;
                if strict_equality_comparison(&subject, &candidate) {
                    start = Some(i);
                    break;
                }
            }
        }
        let start = match start.or_else(|| cases.iter().position(|c| c.test.is_none())) {
            Some(i) => i,
            None => return Ok(Completion::normal_with(Some(JsValue::Undefined))),
        };
        let mut value = None;
        for case in &cases[start..] {
            let completion = execute_statement_list(&case.consequent, ctx)?;
            if completion.value.is_some() {
                value = completion.value.clone();
            }
            if completion.is_abrupt() {
                return Ok(exit_loop(completion, value));
            }
        }
        Ok(Completion::normal_with(value.or(Some(JsValue::Undefined))))
    };
    if lexical_names.is_empty() {
        run(ctx)
    } else {
        let scope = new_block_scope(ctx, lexical_names)?;
        with_scope(ctx, scope, run)
    }
}

fn execute_try_statement(
    block: &BlockStatementData,
    handler: Option<&CatchClauseData>,
    finalizer: Option<&BlockStatementData>,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut result = execute_block_statement(block, ctx);
    if let Some(handler) = handler {
        let thrown = match &result {
            Err(error) if error.is_catchable() => Some(error_to_js_value(ctx, error)),
            _ => None,
        };
        if let Some(thrown) = thrown {
            result = execute_catch_clause(handler, thrown, ctx);
        }
    }
    let finalizer = match finalizer {
        Some(f) => f,
        None => return result.map(|c| c.update_empty(Some(JsValue::Undefined))),
    };
    // Fatal errors skip `finally`.
    if matches!(&result, Err(error) if !error.is_catchable()) {
        return result;
    }
    let final_completion = execute_block_statement(finalizer, ctx)?;
    if final_completion.is_abrupt() {
        return Ok(final_completion.update_empty(Some(JsValue::Undefined)));
    }
    result.map(|c| c.update_empty(Some(JsValue::Undefined)))
}

fn execute_catch_clause(
    handler: &CatchClauseData,
    thrown: JsValue,
    ctx: &mut EvalContext,
) -> EvalResult {
    let object = object_create_with_class(ObjectClass::Declarative, None);
    object.borrow_mut().as_js_object_mut().define_own_property(
        handler.param.key(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            thrown, true, false, false,
        )),
    );
    let scope = Scope::push(&ctx.current_scope()?, object, ScopeKind::Catch);
    with_scope(ctx, scope, |ctx| execute_block_statement(&handler.body, ctx))
}

/// The value a `catch` clause receives: thrown values as they are, engine errors as `Error`
/// objects of the matching kind.
pub fn error_to_js_value(ctx: &mut EvalContext, error: &JErrorType) -> JsValue {
    match error {
        JErrorType::Thrown(value) => value.clone(),
        other => {
            let name = other.constructor_name().unwrap_or("Error");
            JsValue::Object(create_error_object(ctx, name, &other.message()))
        }
    }
}

/// Runs a whole program in the global scope and returns its completion value.
pub fn evaluate_program(program: &ProgramData, ctx: &mut EvalContext) -> ValueResult {
    run_global_code(program, ctx, false)
}

/// Global code run by the `eval` builtin. `var` bindings it creates are deletable, and strict
/// eval code keeps its declarations in a scope of its own.
pub fn evaluate_eval_code(program: &ProgramData, ctx: &mut EvalContext) -> ValueResult {
    run_global_code(program, ctx, true)
}

fn run_global_code(program: &ProgramData, ctx: &mut EvalContext, is_eval: bool) -> ValueResult {
    let strict = program.strict || ctx.config.strict;
    let global_scope = ctx.realm.global_scope.clone();
    let (scope, variable_scope) = if is_eval && strict {
        let object = object_create_with_class(ObjectClass::Activation, None);
        let scope = Scope::push(&global_scope, object, ScopeKind::Function);
        (scope.clone(), scope)
    } else {
        let variable_scope = global_scope.global();
        (global_scope, variable_scope)
    };
    let global_this = JsValue::Object(ctx.global_object());
    ctx.execution_ctx_stack.push_execution_ctx(ExecutionContext {
        function: None,
        scope,
        this_value: global_this,
        strict,
    });
    instantiate_hoisted(ctx, &program.declarations, &variable_scope, is_eval);
    let result = execute_statement_list(&program.body, ctx);
    ctx.execution_ctx_stack.pop_running_execution_ctx();
    Ok(result?.get_value())
}

/// Reads a global binding the way a bare identifier in global code would.
pub fn get_global_binding(ctx: &mut EvalContext, name: &str) -> ValueResult {
    let key = PropertyKey::from(name);
    let scope = ctx.realm.global_scope.clone();
    match scope.lookup(&key) {
        Some(found) => {
            let object = found.variable_object.clone();
            get(ctx, &object, &key)
        }
        None => Err(JErrorType::ReferenceError(format!("{} is not defined", name))),
    }
}
