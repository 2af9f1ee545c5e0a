//! String built-in.
//!
//! Positions and lengths are counted in UTF-16 code units.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_number, to_string, to_uint32};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the String built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let string = BuiltInObject::new("String")
        .with_prototype(WellKnownIntrinsics::StringPrototype)
        .with_split_constructor(string_call, Some(string_construct), 1)
        .add_static_method("fromCharCode", string_from_char_code, 1)
        .add_method("charAt", string_char_at, 1)
        .add_method("charCodeAt", string_char_code_at, 1)
        .add_method("indexOf", string_index_of, 1)
        .add_method("slice", string_slice, 2)
        .add_method("substring", string_substring, 2)
        .add_method("toUpperCase", string_to_upper_case, 0)
        .add_method("toLowerCase", string_to_lower_case, 0)
        .add_method("toString", string_to_string, 0)
        .add_method("valueOf", string_to_string, 0);

    registry.register_object(string);
}

fn string_value_of_args(ctx: &mut EvalContext, args: &[JsValue]) -> Result<JsString, JErrorType> {
    match args.first() {
        None => Ok(JsString::empty()),
        Some(v) => to_string(ctx, v),
    }
}

/// `this` of a generic string method: anything but null/undefined, converted with `ToString`.
fn this_string(ctx: &mut EvalContext, this: &JsValue, method: &str) -> Result<JsString, JErrorType> {
    if this.is_nullish() {
        return Err(JErrorType::TypeError(format!(
            "String.prototype.{} called on null or undefined",
            method
        )));
    }
    to_string(ctx, this)
}

fn integer_arg(ctx: &mut EvalContext, args: &[JsValue], index: usize) -> Result<f64, JErrorType> {
    Ok(to_integer(to_number(ctx, &arg(args, index))?.to_f64()))
}

/// String(value)
fn string_call(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(string_value_of_args(ctx, &args)?))
}

/// new String(value)
fn string_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = string_value_of_args(ctx, &args)?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::StringPrototype);
    let wrapper = PrimitiveObject::new(JsValue::String(value), Some(proto));
    Ok(JsValue::Object(
        ObjectType::Primitive(wrapper).into_js_object_type(),
    ))
}

/// String.fromCharCode
fn string_from_char_code(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut units = Vec::with_capacity(args.len());
    for a in &args {
        let n = to_number(ctx, a)?;
        units.push((to_uint32(n.to_f64()) & 0xFFFF) as u16);
    }
    Ok(JsValue::String(JsString::from_units(units)))
}

/// String.prototype.charAt
fn string_char_at(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this, "charAt")?;
    let position = integer_arg(ctx, &args, 0)?;
    if position < 0.0 || position >= s.len() as f64 {
        return Ok(JsValue::String(JsString::empty()));
    }
    let position = position as usize;
    Ok(JsValue::String(s.substring(position, position + 1)))
}

/// String.prototype.charCodeAt
fn string_char_code_at(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this, "charCodeAt")?;
    let position = integer_arg(ctx, &args, 0)?;
    if position < 0.0 || position >= s.len() as f64 {
        return Ok(JsValue::Number(JsNumberType::NaN));
    }
    Ok(match s.char_code_at(position as usize) {
        Some(unit) => JsValue::from_i64(unit as i64),
        None => JsValue::Number(JsNumberType::NaN),
    })
}

/// String.prototype.indexOf
fn string_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this, "indexOf")?;
    let needle = to_string(ctx, &arg(&args, 0))?;
    let start = integer_arg(ctx, &args, 1)?.max(0.0).min(s.len() as f64) as usize;
    Ok(match s.index_of(&needle, start) {
        Some(index) => JsValue::from_i64(index as i64),
        None => JsValue::from_i64(-1),
    })
}

/// String.prototype.slice
fn string_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this, "slice")?;
    let len = s.len() as f64;
    let relative = |n: f64| {
        if n < 0.0 {
            (len + n).max(0.0)
        } else {
            n.min(len)
        }
    };
    let start = relative(integer_arg(ctx, &args, 0)?);
    let end = if arg(&args, 1).is_undefined() {
        len
    } else {
        relative(integer_arg(ctx, &args, 1)?)
    };
    if start >= end {
        return Ok(JsValue::String(JsString::empty()));
    }
    Ok(JsValue::String(s.substring(start as usize, end as usize)))
}

/// String.prototype.substring
fn string_substring(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this, "substring")?;
    let len = s.len() as f64;
    let start = integer_arg(ctx, &args, 0)?.max(0.0).min(len);
    let end = if arg(&args, 1).is_undefined() {
        len
    } else {
        integer_arg(ctx, &args, 1)?.max(0.0).min(len)
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(JsValue::String(s.substring(from as usize, to as usize)))
}

/// String.prototype.toUpperCase
fn string_to_upper_case(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string(ctx, &this, "toUpperCase")?.to_case(true)))
}

/// String.prototype.toLowerCase
fn string_to_lower_case(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string(ctx, &this, "toLowerCase")?.to_case(false)))
}

/// String.prototype.toString and String.prototype.valueOf. Not generic: `this` must be a string
/// or a String wrapper.
fn string_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = match &this {
        JsValue::String(s) => Some(s.clone()),
        JsValue::Object(o) => match o.borrow().as_primitive().map(|p| p.primitive_value()) {
            Some(JsValue::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    };
    value.map(JsValue::String).ok_or_else(|| {
        JErrorType::TypeError("String.prototype.valueOf requires that 'this' be a String".to_string())
    })
}
