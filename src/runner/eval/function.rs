//! Function objects: creation, `[[Call]]` and `[[Construct]]`.
//!
//! A call to a script function builds a fresh activation object (no prototype) holding the
//! parameters, the `arguments` object, hoisted function declarations and `var`/`let`/`const`
//! names, pushes it in front of the function's captured scope (or the global scope for top-level
//! declarations), and runs the body inside a new execution context. The context is popped on
//! every exit path.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::parser::ast::{FunctionData, HoistedDeclarations};
use crate::runner::ds::arguments_object::{ArgumentsObject, ParameterMap};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::function_object::{FunctionKind, FunctionObject};
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{
    object_create, object_create_with_class, JsObject, JsObjectType, ObjectClass, ObjectType,
};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::object::{get, has_property};
use crate::runner::ds::operations::type_conversion::to_object;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::scope::{Scope, ScopeKind, ScopeRef};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::{BuiltInFn, EvalContext};

use super::stack::ensure_sufficient_stack;
use super::statement::execute_statement_list;
use super::types::{CompletionType, ValueResult};

/// What a function object does when invoked, cloned out so no borrow is held during the call.
enum CallTarget {
    Script {
        data: Rc<FunctionData>,
        scope: Option<ScopeRef>,
        strict: bool,
    },
    Native(BuiltInFn, Option<BuiltInFn>),
    Bound {
        target: JsObjectType,
        bound_this: JsValue,
        bound_arguments: Vec<JsValue>,
    },
}

fn call_target(f: &JsObjectType) -> Option<CallTarget> {
    let obj = f.borrow();
    let function = obj.as_function()?;
    Some(match function.kind() {
        FunctionKind::Script {
            data,
            scope,
            strict,
        } => CallTarget::Script {
            data: data.clone(),
            scope: scope.clone(),
            strict: *strict,
        },
        FunctionKind::Native {
            call, construct, ..
        } => CallTarget::Native(call.clone(), construct.clone()),
        FunctionKind::Bound {
            target,
            bound_this,
            bound_arguments,
        } => CallTarget::Bound {
            target: target.clone(),
            bound_this: bound_this.clone(),
            bound_arguments: bound_arguments.clone(),
        },
    })
}

/// `[[Call]]`: invokes `f` with `this_value` and `args`.
pub fn call_function(
    ctx: &mut EvalContext,
    f: &JsValue,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    let f_obj = match f {
        JsValue::Object(o) if o.borrow().is_callable() => o.clone(),
        _ => return Err(JErrorType::TypeError(format!("{} is not a function", f))),
    };
    ctx.enter_call()?;
    let result = ensure_sufficient_stack(|| call_function_object(ctx, &f_obj, this_value, args));
    ctx.exit_call();
    result
}

fn call_function_object(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    match call_target(f) {
        Some(CallTarget::Native(call, _)) => call.call(ctx, this_value, args),
        Some(CallTarget::Bound {
            target,
            bound_this,
            mut bound_arguments,
        }) => {
            bound_arguments.extend(args);
            call_function_object(ctx, &target, bound_this, bound_arguments)
        }
        Some(CallTarget::Script {
            data,
            scope,
            strict,
        }) => call_script_function(ctx, f, &data, scope, strict, this_value, args),
        None => Err(JErrorType::Internal(
            "callable object without a function kind".to_string(),
        )),
    }
}

fn call_script_function(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    data: &Rc<FunctionData>,
    scope: Option<ScopeRef>,
    strict: bool,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    let this_value = if strict {
        this_value
    } else {
        match this_value {
            JsValue::Undefined | JsValue::Null => JsValue::Object(ctx.global_object()),
            JsValue::Object(_) => this_value,
            primitive => JsValue::Object(to_object(ctx, &primitive)?),
        }
    };
    let parent = scope.unwrap_or_else(|| ctx.realm.global_scope.clone());
    let activation = object_create_with_class(ObjectClass::Activation, None);
    let function_scope = Scope::push(&parent, activation.clone(), ScopeKind::Function);
    instantiate_function_declarations(ctx, f, data, &function_scope, strict, &args);

    ctx.execution_ctx_stack.push_execution_ctx(ExecutionContext {
        function: Some(f.clone()),
        scope: function_scope,
        this_value,
        strict,
    });
    let result = execute_statement_list(&data.body.body, ctx);
    ctx.execution_ctx_stack.pop_running_execution_ctx();

    let completion = result?;
    Ok(match completion.completion_type {
        CompletionType::Return => completion.get_value(),
        _ => JsValue::Undefined,
    })
}

/// Fills a fresh activation object: parameters, `arguments`, hoisted functions, then
/// `var` and lexical names that are not bound yet.
fn instantiate_function_declarations(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    data: &Rc<FunctionData>,
    scope: &ScopeRef,
    strict: bool,
    args: &[JsValue],
) {
    let activation = &scope.variable_object;
    for (i, param) in data.params.iter().enumerate() {
        let value = args.get(i).cloned().unwrap_or(JsValue::Undefined);
        declare_binding(activation, param.key(), value, true, false);
    }

    let declarations = &data.body.declarations;
    let arguments_name = JsString::from("arguments");
    let arguments_shadowed = data.params.iter().any(|p| p.name == arguments_name)
        || declarations
            .function_declarations
            .iter()
            .any(|d| d.id.as_ref().map_or(false, |id| id.name == arguments_name));
    if data.body.uses_arguments && !arguments_shadowed {
        let arguments = create_arguments_object(ctx, f, data, activation, strict, args);
        declare_binding(
            activation,
            keys::arguments(),
            JsValue::Object(arguments),
            !strict,
            false,
        );
    }

    instantiate_hoisted(ctx, declarations, scope, false);
}

/// Binds hoisted function declarations, `var` names and lexical names on the variable object
/// of `scope`. `configurable` is true only for eval code.
pub(crate) fn instantiate_hoisted(
    ctx: &mut EvalContext,
    declarations: &HoistedDeclarations,
    scope: &ScopeRef,
    configurable: bool,
) {
    let target = &scope.variable_object;
    let closure_scope = match scope.kind {
        ScopeKind::Function => Some(scope.clone()),
        _ => None,
    };
    for declaration in &declarations.function_declarations {
        let name = match &declaration.id {
            Some(id) => id.key(),
            None => continue,
        };
        let function = make_function(ctx, declaration, closure_scope.clone());
        declare_binding(target, name, JsValue::Object(function), true, configurable);
    }
    for name in &declarations.var_names {
        let key = PropertyKey::from(name.clone());
        if !has_property(target, &key) {
            declare_binding(target, key, JsValue::Undefined, true, configurable);
        }
    }
    if !declarations.lexical_names.is_empty() {
        let lexical = match scope.kind {
            ScopeKind::Global => ctx.realm.global_scope.variable_object.clone(),
            _ => target.clone(),
        };
        declare_lexical_bindings(&lexical, &declarations.lexical_names);
    }
}

/// Defines (or redefines) a binding as an enumerable data property.
fn declare_binding(
    target: &JsObjectType,
    key: PropertyKey,
    value: JsValue,
    writable: bool,
    configurable: bool,
) {
    let mut obj = target.borrow_mut();
    let obj = obj.as_js_object_mut();
    let defined = obj.define_own_property(
        key.clone(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value.clone(),
            writable,
            true,
            configurable,
        )),
    );
    if !defined {
        // An existing non-configurable binding (a global `var`, say) keeps its attributes.
        obj.define_own_property(key, PropertyDescriptorSetter::value_only(value));
    }
}

/// `let`/`const` names start out as writable, configurable `undefined` bindings; a `const`
/// becomes read-only once its declaration runs.
pub(crate) fn declare_lexical_bindings(target: &JsObjectType, names: &[JsString]) {
    let mut obj = target.borrow_mut();
    let obj = obj.as_js_object_mut();
    for name in names {
        obj.define_own_property(
            PropertyKey::from(name.clone()),
            PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
                JsValue::Undefined,
                true,
                false,
                true,
            )),
        );
    }
}

fn create_arguments_object(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    data: &FunctionData,
    activation: &JsObjectType,
    strict: bool,
    args: &[JsValue],
) -> JsObjectType {
    let parameter_map = if strict {
        None
    } else {
        let mapped_count = args.len().min(data.params.len());
        let mut names = vec![None; mapped_count];
        let mut seen = FxHashSet::default();
        // With duplicate parameter names only the last one is visible.
        for i in (0..mapped_count).rev() {
            let param = &data.params[i];
            if seen.insert(param.name.clone()) {
                names[i] = Some(param.key());
            }
        }
        Some(ParameterMap {
            env: activation.clone(),
            names,
        })
    };
    let proto = ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype);
    let mut arguments = ArgumentsObject::new(Some(proto), None);
    for (i, value) in args.iter().enumerate() {
        arguments.define_own_property(
            PropertyKey::from(i as u32),
            PropertyDescriptorSetter::new_default_data(value.clone()),
        );
    }
    let hidden = |value: JsValue| {
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value, true, false, true,
        ))
    };
    arguments.define_own_property(keys::length(), hidden(JsValue::from_i64(args.len() as i64)));
    if strict {
        let thrower = JsValue::Object(ctx.intrinsic(WellKnownIntrinsics::ThrowTypeError));
        for key in [keys::callee(), keys::caller()] {
            arguments.define_own_property(
                key,
                PropertyDescriptorSetter {
                    get: Some(thrower.clone()),
                    set: Some(thrower.clone()),
                    enumerable: Some(false),
                    configurable: Some(false),
                    ..Default::default()
                },
            );
        }
    } else {
        arguments.define_own_property(keys::callee(), hidden(JsValue::Object(f.clone())));
    }
    arguments.set_parameter_map(parameter_map);
    ObjectType::Arguments(arguments).into_js_object_type()
}

/// Creates a script function closing over `scope` (`None` for top-level declarations).
pub fn make_function(
    ctx: &mut EvalContext,
    data: &Rc<FunctionData>,
    scope: Option<ScopeRef>,
) -> JsObjectType {
    let function_prototype = ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);
    let mut function = FunctionObject::new(
        FunctionKind::Script {
            data: data.clone(),
            scope,
            strict: data.is_strict() || ctx.config.strict,
        },
        Some(function_prototype),
    );
    let read_only = |value: JsValue| {
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value, false, false, true,
        ))
    };
    function.define_own_property(
        keys::length(),
        read_only(JsValue::from_i64(data.params.len() as i64)),
    );
    let name = data
        .id
        .as_ref()
        .map_or_else(JsString::empty, |id| id.name.clone());
    function.define_own_property(keys::name(), read_only(JsValue::String(name)));
    let function = ObjectType::Function(function).into_js_object_type();

    let prototype = object_create(Some(ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype)));
    prototype.borrow_mut().as_js_object_mut().define_own_property(
        keys::constructor(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::Object(function.clone()),
            true,
            false,
            true,
        )),
    );
    function.borrow_mut().as_js_object_mut().define_own_property(
        keys::prototype(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::Object(prototype),
            true,
            false,
            false,
        )),
    );
    function
}

/// `[[Construct]]`: the `new` operator.
pub fn construct(ctx: &mut EvalContext, f: &JsValue, args: Vec<JsValue>) -> ValueResult {
    let f_obj = match f {
        JsValue::Object(o) if o.borrow().as_function().map_or(false, |f| f.is_constructor()) => {
            o.clone()
        }
        _ => return Err(JErrorType::TypeError(format!("{} is not a constructor", f))),
    };
    ctx.enter_call()?;
    let result = ensure_sufficient_stack(|| construct_object(ctx, &f_obj, args));
    ctx.exit_call();
    result
}

fn construct_object(ctx: &mut EvalContext, f: &JsObjectType, args: Vec<JsValue>) -> ValueResult {
    match call_target(f) {
        Some(CallTarget::Bound {
            target,
            mut bound_arguments,
            ..
        }) => {
            bound_arguments.extend(args);
            construct_object(ctx, &target, bound_arguments)
        }
        Some(CallTarget::Native(_, Some(construct))) => {
            let this_obj = object_create(Some(instance_prototype(ctx, f)?));
            let result = construct.call(ctx, JsValue::Object(this_obj.clone()), args)?;
            Ok(match result {
                JsValue::Object(_) => result,
                _ => JsValue::Object(this_obj),
            })
        }
        Some(CallTarget::Script {
            data,
            scope,
            strict,
        }) => {
            let this_obj = object_create(Some(instance_prototype(ctx, f)?));
            let result = call_script_function(
                ctx,
                f,
                &data,
                scope,
                strict,
                JsValue::Object(this_obj.clone()),
                args,
            )?;
            Ok(match result {
                JsValue::Object(_) => result,
                _ => JsValue::Object(this_obj),
            })
        }
        _ => Err(JErrorType::TypeError(format!(
            "{} is not a constructor",
            JsValue::Object(f.clone())
        ))),
    }
}

/// The callee's `prototype` property, or `Object.prototype` when that is not an object.
fn instance_prototype(ctx: &mut EvalContext, f: &JsObjectType) -> Result<JsObjectType, JErrorType> {
    Ok(match get(ctx, f, &keys::prototype())? {
        JsValue::Object(p) => p,
        _ => ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JsParser;

    fn first_function(code: &str) -> Rc<FunctionData> {
        let program = JsParser::parse_to_ast_from_str(code).unwrap();
        program.declarations.function_declarations[0].clone()
    }

    #[test]
    fn function_objects_carry_length_name_and_prototype() {
        let mut ctx = EvalContext::default();
        let data = first_function("function add(a, b) { return a + b; }");
        let f = make_function(&mut ctx, &data, None);
        assert_eq!(get(&mut ctx, &f, &keys::length()).unwrap(), JsValue::from_i64(2));
        assert_eq!(get(&mut ctx, &f, &keys::name()).unwrap(), JsValue::from_str("add"));
        let prototype = get(&mut ctx, &f, &keys::prototype()).unwrap();
        let constructor = get_v_constructor(&mut ctx, &prototype);
        assert!(matches!(constructor, JsValue::Object(c) if Rc::ptr_eq(&c, &f)));
    }

    fn get_v_constructor(ctx: &mut EvalContext, v: &JsValue) -> JsValue {
        match v {
            JsValue::Object(o) => get(ctx, o, &keys::constructor()).unwrap(),
            _ => JsValue::Undefined,
        }
    }

    #[test]
    fn calling_a_non_callable_is_a_type_error() {
        let mut ctx = EvalContext::default();
        let result = call_function(&mut ctx, &JsValue::from_i64(1), JsValue::Undefined, vec![]);
        assert!(matches!(result, Err(JErrorType::TypeError(_))));
    }

    #[test]
    fn call_depth_is_released_after_errors() {
        let mut ctx = EvalContext::default();
        let _ = call_function(&mut ctx, &JsValue::Null, JsValue::Undefined, vec![]);
        assert_eq!(ctx.call_depth(), 0);
    }
}
