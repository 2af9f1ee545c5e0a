//! Object built-in.
//!
//! The reflective statics (`Object.defineProperty`, `Object.freeze`, ...) are thin wrappers over
//! the object-level algorithms in `ds::operations::object`.

use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{
    create_array_from_list, define_property_or_throw, from_property_descriptor, get,
    own_enumerable_keys, set_integrity_level, test_integrity_level, to_property_descriptor,
    IntegrityLevel,
};
use crate::runner::ds::operations::type_conversion::{to_object, to_property_key};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Object built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let object = BuiltInObject::new("Object")
        .with_prototype(WellKnownIntrinsics::ObjectPrototype)
        .with_constructor(object_constructor, 1)
        .add_static_method("getPrototypeOf", object_get_prototype_of, 1)
        .add_static_method("create", object_create_static, 2)
        .add_static_method("defineProperty", object_define_property, 3)
        .add_static_method("defineProperties", object_define_properties, 2)
        .add_static_method("getOwnPropertyDescriptor", object_get_own_property_descriptor, 2)
        .add_static_method("getOwnPropertyNames", object_get_own_property_names, 1)
        .add_static_method("keys", object_keys, 1)
        .add_static_method("seal", object_seal, 1)
        .add_static_method("freeze", object_freeze, 1)
        .add_static_method("preventExtensions", object_prevent_extensions, 1)
        .add_static_method("isSealed", object_is_sealed, 1)
        .add_static_method("isFrozen", object_is_frozen, 1)
        .add_static_method("isExtensible", object_is_extensible, 1)
        .add_method("hasOwnProperty", object_has_own_property, 1)
        .add_method("propertyIsEnumerable", object_property_is_enumerable, 1)
        .add_method("isPrototypeOf", object_is_prototype_of, 1)
        .add_method("toString", object_to_string, 0)
        .add_method("valueOf", object_value_of, 0);

    registry.register_object(object);
}

fn require_object(v: &JsValue, operation: &str) -> Result<JsObjectType, JErrorType> {
    match v {
        JsValue::Object(o) => Ok(o.clone()),
        _ => Err(JErrorType::TypeError(format!(
            "Object.{} called on non-object",
            operation
        ))),
    }
}

/// Object(value)
fn object_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = arg(&args, 0);
    if value.is_nullish() {
        let proto = ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype);
        return Ok(JsValue::Object(object_create(Some(proto))));
    }
    Ok(JsValue::Object(to_object(ctx, &value)?))
}

/// Object.getPrototypeOf(o)
fn object_get_prototype_of(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "getPrototypeOf")?;
    let proto = o.borrow().as_js_object().get_prototype_of();
    Ok(proto.map_or(JsValue::Null, JsValue::Object))
}

/// Object.create(proto, properties)
fn object_create_static(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let proto = match arg(&args, 0) {
        JsValue::Object(p) => Some(p),
        JsValue::Null => None,
        other => {
            return Err(JErrorType::TypeError(format!(
                "Object prototype may only be an Object or null: {}",
                other
            )))
        }
    };
    let o = object_create(proto);
    let properties = arg(&args, 1);
    if !properties.is_undefined() {
        define_properties(ctx, &o, &properties)?;
    }
    Ok(JsValue::Object(o))
}

/// Object.defineProperty(o, key, attributes)
fn object_define_property(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    let o = require_object(&target, "defineProperty")?;
    let key = to_property_key(ctx, &arg(&args, 1))?;
    let desc = to_property_descriptor(ctx, &arg(&args, 2))?;
    define_property_or_throw(&o, key, desc)?;
    Ok(target)
}

/// Object.defineProperties(o, properties)
fn object_define_properties(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    let o = require_object(&target, "defineProperties")?;
    define_properties(ctx, &o, &arg(&args, 1))?;
    Ok(target)
}

/// Reads every descriptor before defining any of them, so a malformed descriptor leaves `o`
/// untouched.
fn define_properties(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    properties: &JsValue,
) -> Result<(), JErrorType> {
    let props = to_object(ctx, properties)?;
    let mut descriptors = Vec::new();
    for key in own_enumerable_keys(&props) {
        let desc_obj = get(ctx, &props, &key)?;
        descriptors.push((key, to_property_descriptor(ctx, &desc_obj)?));
    }
    for (key, desc) in descriptors {
        define_property_or_throw(o, key, desc)?;
    }
    Ok(())
}

/// Object.getOwnPropertyDescriptor(o, key)
fn object_get_own_property_descriptor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "getOwnPropertyDescriptor")?;
    let key = to_property_key(ctx, &arg(&args, 1))?;
    let desc = o.borrow().as_js_object().get_own_property(&key);
    Ok(match desc {
        Some(desc) => from_property_descriptor(ctx, &desc),
        None => JsValue::Undefined,
    })
}

fn keys_to_array(ctx: &EvalContext, keys: Vec<PropertyKey>) -> JsValue {
    let names = keys
        .iter()
        .map(|k| JsValue::String(k.to_js_string()))
        .collect();
    JsValue::Object(create_array_from_list(ctx, names))
}

/// Object.getOwnPropertyNames(o)
fn object_get_own_property_names(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "getOwnPropertyNames")?;
    let keys = o.borrow().as_js_object().own_property_keys();
    Ok(keys_to_array(ctx, keys))
}

/// Object.keys(o)
fn object_keys(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "keys")?;
    Ok(keys_to_array(ctx, own_enumerable_keys(&o)))
}

/// Object.seal(o)
fn object_seal(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    set_integrity_level(&require_object(&target, "seal")?, IntegrityLevel::Sealed);
    Ok(target)
}

/// Object.freeze(o)
fn object_freeze(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    set_integrity_level(&require_object(&target, "freeze")?, IntegrityLevel::Frozen);
    Ok(target)
}

/// Object.preventExtensions(o)
fn object_prevent_extensions(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target, "preventExtensions")?
        .borrow_mut()
        .as_js_object_mut()
        .prevent_extensions();
    Ok(target)
}

/// Object.isSealed(o)
fn object_is_sealed(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "isSealed")?;
    Ok(JsValue::Boolean(test_integrity_level(&o, IntegrityLevel::Sealed)))
}

/// Object.isFrozen(o)
fn object_is_frozen(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "isFrozen")?;
    Ok(JsValue::Boolean(test_integrity_level(&o, IntegrityLevel::Frozen)))
}

/// Object.isExtensible(o)
fn object_is_extensible(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0), "isExtensible")?;
    let extensible = o.borrow().as_js_object().is_extensible();
    Ok(JsValue::Boolean(extensible))
}

/// Object.prototype.hasOwnProperty
fn object_has_own_property(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key = to_property_key(ctx, &arg(&args, 0))?;
    let o = to_object(ctx, &this)?;
    let has = o.borrow().as_js_object().has_own_property(&key);
    Ok(JsValue::Boolean(has))
}

/// Object.prototype.propertyIsEnumerable
fn object_property_is_enumerable(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key = to_property_key(ctx, &arg(&args, 0))?;
    let o = to_object(ctx, &this)?;
    let desc = o.borrow().as_js_object().get_own_property(&key);
    Ok(JsValue::Boolean(desc.map_or(false, |d| d.is_enumerable())))
}

/// Object.prototype.isPrototypeOf
fn object_is_prototype_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let v = match arg(&args, 0) {
        JsValue::Object(v) => v,
        _ => return Ok(JsValue::Boolean(false)),
    };
    let o = to_object(ctx, &this)?;
    let mut current = v.borrow().as_js_object().get_prototype_of();
    while let Some(p) = current {
        if Rc::ptr_eq(&p, &o) {
            return Ok(JsValue::Boolean(true));
        }
        current = p.borrow().as_js_object().get_prototype_of();
    }
    Ok(JsValue::Boolean(false))
}

/// Object.prototype.toString
fn object_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let tag = match &this {
        JsValue::Undefined => "Undefined".to_string(),
        JsValue::Null => "Null".to_string(),
        _ => {
            let o = to_object(ctx, &this)?;
            let class = o.borrow().as_js_object().class();
            class.to_string()
        }
    };
    Ok(JsValue::String(JsString::from(format!("[object {}]", tag))))
}

/// Object.prototype.valueOf
fn object_value_of(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Object(to_object(ctx, &this)?))
}
