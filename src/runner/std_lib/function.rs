//! Function built-in: the `Function` constructor plus `call`, `apply`, `bind` and `toString` on
//! `Function.prototype`.

use crate::parser::JsParser;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{FunctionKind, FunctionObject};
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectType};
use crate::runner::ds::object_property::{keys, PropertyDescriptor, PropertyDescriptorSetter};
use crate::runner::ds::operations::object::{get, length_of_array_like};
use crate::runner::ds::operations::type_conversion::{to_integer, to_string};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function::call_function;
use crate::runner::eval::statement::evaluate_eval_code;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Function built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let function = BuiltInObject::new("Function")
        .with_prototype(WellKnownIntrinsics::FunctionPrototype)
        .with_constructor(function_constructor, 1)
        .add_method("call", function_call, 1)
        .add_method("apply", function_apply, 2)
        .add_method("bind", function_bind, 1)
        .add_method("toString", function_to_string, 0);

    registry.register_object(function);
}

fn require_callable(this: &JsValue, method: &str) -> Result<JsObjectType, JErrorType> {
    match this {
        JsValue::Object(o) if o.borrow().is_callable() => Ok(o.clone()),
        _ => Err(JErrorType::TypeError(format!(
            "Function.prototype.{} called on incompatible receiver {}",
            method, this
        ))),
    }
}

/// Function(p1, p2, ..., body). The source is compiled as global code.
fn function_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut pieces = Vec::with_capacity(args.len());
    for a in &args {
        pieces.push(to_string(ctx, a)?.to_string());
    }
    let body = pieces.pop().unwrap_or_default();
    let source = format!(
        "(function anonymous({}\n) {{\n{}\n}})",
        pieces.join(","),
        body
    );
    let program = JsParser::parse_to_ast_from_str(&source)
        .map_err(|e| JErrorType::SyntaxError(e.variant.message().to_string()))?;
    evaluate_eval_code(&program, ctx)
}

/// Function.prototype.call
fn function_call(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "call")?;
    let mut args = args.into_iter();
    let this_arg = args.next().unwrap_or(JsValue::Undefined);
    call_function(ctx, &this, this_arg, args.collect())
}

/// Function.prototype.apply
fn function_apply(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "apply")?;
    let this_arg = arg(&args, 0);
    let call_args = match arg(&args, 1) {
        JsValue::Undefined | JsValue::Null => Vec::new(),
        JsValue::Object(list) => {
            let len = length_of_array_like(ctx, &list)?;
            let mut values = Vec::with_capacity(len as usize);
            for index in 0..len {
                values.push(get(ctx, &list, &index.into())?);
            }
            values
        }
        other => {
            return Err(JErrorType::TypeError(format!(
                "CreateListFromArrayLike called on non-object: {}",
                other
            )))
        }
    };
    call_function(ctx, &this, this_arg, call_args)
}

/// Function.prototype.bind
fn function_bind(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = require_callable(&this, "bind")?;
    let mut args = args.into_iter();
    let bound_this = args.next().unwrap_or(JsValue::Undefined);
    let bound_arguments: Vec<JsValue> = args.collect();

    let target_length = match get(ctx, &target, &keys::length())? {
        JsValue::Number(n) => to_integer(n.to_f64()),
        _ => 0.0,
    };
    let length = (target_length - bound_arguments.len() as f64).max(0.0);
    let target_name = match get(ctx, &target, &keys::name())? {
        JsValue::String(s) => s,
        _ => JsString::empty(),
    };

    let mut bound = FunctionObject::new(
        FunctionKind::Bound {
            target,
            bound_this,
            bound_arguments,
        },
        Some(ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype)),
    );
    let read_only = |value: JsValue| {
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value, false, false, true,
        ))
    };
    bound.define_own_property(keys::length(), read_only(JsValue::from_f64(length)));
    bound.define_own_property(
        keys::name(),
        read_only(JsValue::String(JsString::from("bound ").concat(&target_name))),
    );
    Ok(JsValue::Object(
        ObjectType::Function(bound).into_js_object_type(),
    ))
}

/// Function.prototype.toString
fn function_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = require_callable(&this, "toString")?;
    let f = f.borrow();
    let rendered = match f.as_function().map(|func| func.kind()) {
        Some(FunctionKind::Script { data, .. }) => {
            let name = data.id.as_ref().map_or_else(String::new, |id| id.name.to_string());
            let params: Vec<String> = data.params.iter().map(|p| p.name.to_string()).collect();
            format!("function {}({}) {{ [code] }}", name, params.join(", "))
        }
        Some(FunctionKind::Native { name, .. }) => {
            format!("function {}() {{ [native code] }}", name)
        }
        _ => "function () { [native code] }".to_string(),
    };
    Ok(JsValue::String(JsString::from(rendered)))
}
