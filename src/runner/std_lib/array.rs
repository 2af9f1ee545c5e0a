//! Array built-in.
//!
//! Prototype methods are generic: they work on any array-like `this` through `length` and index
//! properties, so holes and inherited elements behave as they do for ordinary property access.

use crate::runner::ds::array_object::{array_create, array_create_from};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::{keys, PropertyKey};
use crate::runner::ds::operations::object::{
    create_data_property, delete_property, get, has_property, length_of_array_like, put,
};
use crate::runner::ds::operations::test_and_comparison::strict_equality_comparison;
use crate::runner::ds::operations::type_conversion::{to_integer, to_number, to_object, to_string, to_uint32};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::function::call_function;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Array built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let array = BuiltInObject::new("Array")
        .with_prototype(WellKnownIntrinsics::ArrayPrototype)
        .with_constructor(array_constructor, 1)
        .add_static_method("isArray", array_is_array, 1)
        .add_method("push", array_push, 1)
        .add_method("pop", array_pop, 0)
        .add_method("join", array_join, 1)
        .add_method("toString", array_to_string, 0)
        .add_method("slice", array_slice, 2)
        .add_method("concat", array_concat, 1)
        .add_method("indexOf", array_index_of, 1)
        .add_method("forEach", array_for_each, 1)
        .add_method("map", array_map, 1);

    registry.register_object(array);
}

fn array_prototype(ctx: &EvalContext) -> Option<JsObjectType> {
    Some(ctx.intrinsic(WellKnownIntrinsics::ArrayPrototype))
}

fn set_length(ctx: &mut EvalContext, o: &JsObjectType, len: f64) -> Result<(), JErrorType> {
    put(ctx, o, keys::length(), JsValue::from_f64(len), true)
}

/// Resolves a relative `start`/`end` argument against `len`.
fn relative_index(ctx: &mut EvalContext, v: &JsValue, len: u32, default: u32) -> Result<u32, JErrorType> {
    if v.is_undefined() {
        return Ok(default);
    }
    let relative = to_integer(to_number(ctx, v)?.to_f64());
    let len = len as f64;
    let index = if relative < 0.0 {
        (len + relative).max(0.0)
    } else {
        relative.min(len)
    };
    Ok(index as u32)
}

fn require_callback(v: &JsValue) -> Result<(), JErrorType> {
    if v.is_callable() {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!("{} is not a function", v)))
    }
}

/// Array(len) / Array(a, b, ...)
fn array_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let proto = array_prototype(ctx);
    if let [JsValue::Number(n)] = args.as_slice() {
        let requested = n.to_f64();
        let len = to_uint32(requested);
        if len as f64 != requested {
            return Err(JErrorType::RangeError("Invalid array length".to_string()));
        }
        return Ok(JsValue::Object(array_create(len, proto)));
    }
    Ok(JsValue::Object(array_create_from(args, proto)))
}

/// Array.isArray
fn array_is_array(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let is_array = match arg(&args, 0) {
        JsValue::Object(o) => o.borrow().is_array(),
        _ => false,
    };
    Ok(JsValue::Boolean(is_array))
}

/// Array.prototype.push
fn array_push(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let mut len = length_of_array_like(ctx, &o)? as f64;
    for value in args {
        put(ctx, &o, PropertyKey::from(JsString::from(len.to_string())), value, true)?;
        len += 1.0;
    }
    set_length(ctx, &o, len)?;
    Ok(JsValue::from_f64(len))
}

/// Array.prototype.pop
fn array_pop(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    if len == 0 {
        set_length(ctx, &o, 0.0)?;
        return Ok(JsValue::Undefined);
    }
    let index = PropertyKey::from(len - 1);
    let element = get(ctx, &o, &index)?;
    delete_property(&o, &index, true)?;
    set_length(ctx, &o, (len - 1) as f64)?;
    Ok(element)
}

fn join(ctx: &mut EvalContext, o: &JsObjectType, separator: &JsValue) -> Result<JsString, JErrorType> {
    let len = length_of_array_like(ctx, o)?;
    let separator = if separator.is_undefined() {
        JsString::from(",")
    } else {
        to_string(ctx, separator)?
    };
    let mut units: Vec<u16> = Vec::new();
    for index in 0..len {
        if index > 0 {
            units.extend_from_slice(separator.units());
        }
        let element = get(ctx, o, &PropertyKey::from(index))?;
        if !element.is_nullish() {
            units.extend_from_slice(to_string(ctx, &element)?.units());
        }
    }
    Ok(JsString::from_units(units))
}

/// Array.prototype.join
fn array_join(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    Ok(JsValue::String(join(ctx, &o, &arg(&args, 0))?))
}

/// Array.prototype.toString: delegates to a callable `join`.
fn array_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let join_fn = get(ctx, &o, &PropertyKey::from("join"))?;
    if join_fn.is_callable() {
        return call_function(ctx, &join_fn, JsValue::Object(o), Vec::new());
    }
    let class = o.borrow().as_js_object().class();
    Ok(JsValue::String(JsString::from(format!("[object {}]", class))))
}

/// Array.prototype.slice
fn array_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    let start = relative_index(ctx, &arg(&args, 0), len, 0)?;
    let end = relative_index(ctx, &arg(&args, 1), len, len)?;
    let result = array_create(0, array_prototype(ctx));
    let mut n = 0u32;
    for index in start..end.max(start) {
        let key = PropertyKey::from(index);
        if has_property(&o, &key) {
            let element = get(ctx, &o, &key)?;
            create_data_property(&result, PropertyKey::from(n), element);
        }
        n += 1;
    }
    set_length(ctx, &result, n as f64)?;
    Ok(JsValue::Object(result))
}

/// Array.prototype.concat
fn array_concat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let result = array_create(0, array_prototype(ctx));
    let mut n = 0u32;
    let items = std::iter::once(JsValue::Object(o)).chain(args);
    for item in items {
        let spread = match &item {
            JsValue::Object(e) if e.borrow().is_array() => Some(e.clone()),
            _ => None,
        };
        match spread {
            Some(e) => {
                let len = length_of_array_like(ctx, &e)?;
                for index in 0..len {
                    let key = PropertyKey::from(index);
                    if has_property(&e, &key) {
                        let element = get(ctx, &e, &key)?;
                        create_data_property(&result, PropertyKey::from(n), element);
                    }
                    n += 1;
                }
            }
            None => {
                create_data_property(&result, PropertyKey::from(n), item);
                n += 1;
            }
        }
    }
    set_length(ctx, &result, n as f64)?;
    Ok(JsValue::Object(result))
}

/// Array.prototype.indexOf
fn array_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    let not_found = JsValue::Number(JsNumberType::Integer(-1));
    if len == 0 {
        return Ok(not_found);
    }
    let search = arg(&args, 0);
    let start = relative_index(ctx, &arg(&args, 1), len, 0)?;
    for index in start..len {
        let key = PropertyKey::from(index);
        if has_property(&o, &key) {
            let element = get(ctx, &o, &key)?;
            if strict_equality_comparison(&element, &search) {
                return Ok(JsValue::from_i64(index as i64));
            }
        }
    }
    Ok(not_found)
}

/// Array.prototype.forEach
fn array_for_each(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    let callback = arg(&args, 0);
    require_callback(&callback)?;
    let this_arg = arg(&args, 1);
    for index in 0..len {
        let key = PropertyKey::from(index);
        if has_property(&o, &key) {
            let element = get(ctx, &o, &key)?;
            call_function(
                ctx,
                &callback,
                this_arg.clone(),
                vec![element, JsValue::from_i64(index as i64), JsValue::Object(o.clone())],
            )?;
        }
    }
    Ok(JsValue::Undefined)
}

/// Array.prototype.map
fn array_map(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    let callback = arg(&args, 0);
    require_callback(&callback)?;
    let this_arg = arg(&args, 1);
    let result = array_create(len, array_prototype(ctx));
    for index in 0..len {
        let key = PropertyKey::from(index);
        if has_property(&o, &key) {
            let element = get(ctx, &o, &key)?;
            let mapped = call_function(
                ctx,
                &callback,
                this_arg.clone(),
                vec![element, JsValue::from_i64(index as i64), JsValue::Object(o.clone())],
            )?;
            create_data_property(&result, key, mapped);
        }
    }
    Ok(JsValue::Object(result))
}
