//! Boolean built-in.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Boolean built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let boolean = BuiltInObject::new("Boolean")
        .with_prototype(WellKnownIntrinsics::BooleanPrototype)
        .with_split_constructor(boolean_call, Some(boolean_construct), 1)
        .add_method("toString", boolean_to_string, 0)
        .add_method("valueOf", boolean_value_of, 0);

    registry.register_object(boolean);
}

fn this_boolean_value(this: &JsValue, method: &str) -> Result<bool, JErrorType> {
    let value = match this {
        JsValue::Boolean(b) => Some(*b),
        JsValue::Object(o) => match o.borrow().as_primitive().map(|p| p.primitive_value()) {
            Some(JsValue::Boolean(b)) => Some(*b),
            _ => None,
        },
        _ => None,
    };
    value.ok_or_else(|| {
        JErrorType::TypeError(format!(
            "Boolean.prototype.{} requires that 'this' be a Boolean",
            method
        ))
    })
}

/// Boolean(value)
fn boolean_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(to_boolean(&arg(&args, 0))))
}

/// new Boolean(value)
fn boolean_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = JsValue::Boolean(to_boolean(&arg(&args, 0)));
    let proto = ctx.intrinsic(WellKnownIntrinsics::BooleanPrototype);
    Ok(JsValue::Object(
        ObjectType::Primitive(PrimitiveObject::new(value, Some(proto))).into_js_object_type(),
    ))
}

/// Boolean.prototype.toString
fn boolean_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let b = this_boolean_value(&this, "toString")?;
    Ok(JsValue::String(JsString::from(if b { "true" } else { "false" })))
}

/// Boolean.prototype.valueOf
fn boolean_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(this_boolean_value(&this, "valueOf")?))
}
