//! Object-level operations that walk the prototype chain and may run script code (getters,
//! setters, `valueOf`). No `RefCell` borrow is held across a call back into the evaluator.

use rustc_hash::FxHashSet;
use std::rc::Rc;

use crate::runner::ds::array_object::array_create_from;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::FunctionKind;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::type_conversion::{
    primitive_to_string, to_boolean, to_number, to_object, to_uint32,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function::call_function;
use crate::runner::plugin::types::EvalContext;

/// Own-or-inherited slot for `property`, without invoking accessors.
pub fn lookup_property(o: &JsObjectType, property: &PropertyKey) -> Option<PropertyDescriptor> {
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        let obj_ref = obj.borrow();
        let js_obj = obj_ref.as_js_object();
        if let Some(desc) = js_obj.get_own_property(property) {
            return Some(desc);
        }
        current = js_obj.get_prototype_of();
    }
    None
}

pub fn has_property(o: &JsObjectType, property: &PropertyKey) -> bool {
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        let obj_ref = obj.borrow();
        let js_obj = obj_ref.as_js_object();
        if js_obj.has_own_property(property) {
            return true;
        }
        current = js_obj.get_prototype_of();
    }
    false
}

pub fn has_own_property(o: &JsObjectType, property: &PropertyKey) -> bool {
    o.borrow().as_js_object().has_own_property(property)
}

fn read_slot(
    ctx: &mut EvalContext,
    slot: Option<PropertyDescriptor>,
    receiver: &JsValue,
) -> Result<JsValue, JErrorType> {
    match slot {
        None => Ok(JsValue::Undefined),
        Some(PropertyDescriptor::Data(d)) => Ok(d.value),
        Some(PropertyDescriptor::Accessor(a)) => {
            if a.get.is_callable() {
                call_function(ctx, &a.get, receiver.clone(), Vec::new())
            } else {
                Ok(JsValue::Undefined)
            }
        }
    }
}

/// `o[property]`. A getter found anywhere on the chain runs with `o` as `this`.
pub fn get(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    property: &PropertyKey,
) -> Result<JsValue, JErrorType> {
    let slot = lookup_property(o, property);
    read_slot(ctx, slot, &JsValue::Object(o.clone()))
}

/// Property read on any value. Primitives read through their wrapper prototype without being
/// boxed; accessors see the primitive itself as `this`.
pub fn get_v(
    ctx: &mut EvalContext,
    v: &JsValue,
    property: &PropertyKey,
) -> Result<JsValue, JErrorType> {
    let proto = match v {
        JsValue::Object(o) => return get(ctx, o, property),
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "Cannot read property '{}' of {}",
                property, v
            )));
        }
        JsValue::String(s) => {
            if let PropertyKey::Int(idx) = property {
                if let Some(unit) = s.char_code_at(*idx as usize) {
                    return Ok(JsValue::String(crate::runner::ds::js_string::JsString::from_units(
                        vec![unit],
                    )));
                }
            } else if *property == keys::length() {
                return Ok(JsValue::from_i64(s.len() as i64));
            }
            WellKnownIntrinsics::StringPrototype
        }
        JsValue::Number(_) => WellKnownIntrinsics::NumberPrototype,
        JsValue::Boolean(_) => WellKnownIntrinsics::BooleanPrototype,
    };
    let proto = ctx.realm.get_intrinsics_value(proto);
    let slot = lookup_property(&proto, property);
    read_slot(ctx, slot, v)
}

fn reject(throw: bool, message: String) -> Result<(), JErrorType> {
    if throw {
        Err(JErrorType::TypeError(message))
    } else {
        Ok(())
    }
}

/// Converts an assigned `length` value, raising `RangeError` unless it is a valid array length.
pub fn to_array_length(ctx: &mut EvalContext, value: &JsValue) -> Result<u32, JErrorType> {
    let n = to_number(ctx, value)?;
    let len = to_uint32(n.to_f64());
    if len as f64 != n.to_f64() {
        return Err(JErrorType::RangeError("Invalid array length".to_string()));
    }
    Ok(len)
}

/// `o[property] = value` (`[[Put]]`). Rejections throw a `TypeError` when `throw` is set (strict
/// code) and are silently ignored otherwise.
pub fn put(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    property: PropertyKey,
    value: JsValue,
    throw: bool,
) -> Result<(), JErrorType> {
    let (own, is_array) = {
        let obj = o.borrow();
        (obj.as_js_object().get_own_property(&property), obj.is_array())
    };
    let value = if is_array && property == keys::length() {
        JsValue::from_i64(to_array_length(ctx, &value)? as i64)
    } else {
        value
    };
    let inherited = match own {
        Some(PropertyDescriptor::Data(d)) => {
            if !d.writable {
                return reject(
                    throw,
                    format!("Cannot assign to read only property '{}'", property),
                );
            }
            let message = format!("Cannot assign to property '{}'", property);
            let ok = o
                .borrow_mut()
                .as_js_object_mut()
                .define_own_property(property, PropertyDescriptorSetter::value_only(value));
            return if ok { Ok(()) } else { reject(throw, message) };
        }
        Some(accessor) => Some(accessor),
        None => {
            let proto = o.borrow().as_js_object().get_prototype_of();
            proto.and_then(|p| lookup_property(&p, &property))
        }
    };
    match inherited {
        Some(PropertyDescriptor::Accessor(a)) => {
            if a.set.is_callable() {
                call_function(ctx, &a.set, JsValue::Object(o.clone()), vec![value])?;
                Ok(())
            } else {
                reject(
                    throw,
                    format!("Cannot set property '{}' which has only a getter", property),
                )
            }
        }
        Some(PropertyDescriptor::Data(d)) if !d.writable => reject(
            throw,
            format!("Cannot assign to read only property '{}'", property),
        ),
        _ => {
            let message = format!("Cannot add property '{}', object is not extensible", property);
            let ok = o
                .borrow_mut()
                .as_js_object_mut()
                .define_own_property(property, PropertyDescriptorSetter::new_default_data(value));
            if ok {
                Ok(())
            } else {
                reject(throw, message)
            }
        }
    }
}

/// Assignment to a property of any value. Writing to a primitive only reaches inherited
/// setters; anything else is a rejection.
pub fn put_v(
    ctx: &mut EvalContext,
    base: &JsValue,
    property: PropertyKey,
    value: JsValue,
    throw: bool,
) -> Result<(), JErrorType> {
    match base {
        JsValue::Object(o) => put(ctx, o, property, value, throw),
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot set property '{}' of {}",
            property, base
        ))),
        _ => {
            let wrapper = to_object(ctx, base)?;
            match lookup_property(&wrapper, &property) {
                Some(PropertyDescriptor::Accessor(a)) if a.set.is_callable() => {
                    call_function(ctx, &a.set, base.clone(), vec![value])?;
                    Ok(())
                }
                _ => reject(
                    throw,
                    format!(
                        "Cannot create property '{}' on {}",
                        property,
                        primitive_to_string(base)
                    ),
                ),
            }
        }
    }
}

pub fn delete_property(
    o: &JsObjectType,
    property: &PropertyKey,
    throw: bool,
) -> Result<bool, JErrorType> {
    let deleted = o.borrow_mut().as_js_object_mut().delete(property);
    if !deleted && throw {
        return Err(JErrorType::TypeError(format!(
            "Cannot delete property '{}'",
            property
        )));
    }
    Ok(deleted)
}

pub fn define_property_or_throw(
    o: &JsObjectType,
    property: PropertyKey,
    desc: PropertyDescriptorSetter,
) -> Result<(), JErrorType> {
    let message = format!("Cannot redefine property: {}", property);
    if o.borrow_mut().as_js_object_mut().define_own_property(property, desc) {
        Ok(())
    } else {
        Err(JErrorType::TypeError(message))
    }
}

/// Defines a writable, enumerable, configurable data property.
pub fn create_data_property(o: &JsObjectType, property: PropertyKey, value: JsValue) -> bool {
    o.borrow_mut()
        .as_js_object_mut()
        .define_own_property(property, PropertyDescriptorSetter::new_default_data(value))
}

/// Defines a writable, non-enumerable, configurable data property (methods, `constructor`).
pub fn create_method_property(o: &JsObjectType, property: PropertyKey, value: JsValue) -> bool {
    o.borrow_mut().as_js_object_mut().define_own_property(
        property,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value, true, false, true,
        )),
    )
}

pub fn own_enumerable_keys(o: &JsObjectType) -> Vec<PropertyKey> {
    let obj = o.borrow();
    let js_obj = obj.as_js_object();
    js_obj
        .own_property_keys()
        .into_iter()
        .filter(|k| js_obj.get_own_property(k).map_or(false, |d| d.is_enumerable()))
        .collect()
}

/// Keys visited by `for-in`: enumerable own keys first, then each prototype's, skipping names
/// already seen closer to the object (enumerable or not).
pub fn enumerate_keys(o: &JsObjectType) -> Vec<PropertyKey> {
    let mut seen: FxHashSet<PropertyKey> = FxHashSet::default();
    let mut result = Vec::new();
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        let obj_ref = obj.borrow();
        let js_obj = obj_ref.as_js_object();
        for key in js_obj.own_property_keys() {
            if !seen.insert(key.clone()) {
                continue;
            }
            if js_obj.get_own_property(&key).map_or(false, |d| d.is_enumerable()) {
                result.push(key);
            }
        }
        current = js_obj.get_prototype_of();
    }
    result
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum IntegrityLevel {
    Sealed,
    Frozen,
}

/// `Object.seal` / `Object.freeze`. One-way: nothing makes a slot configurable again.
pub fn set_integrity_level(o: &JsObjectType, level: IntegrityLevel) {
    let mut obj = o.borrow_mut();
    let js_obj = obj.as_js_object_mut();
    js_obj.prevent_extensions();
    for key in js_obj.own_property_keys() {
        let is_data = js_obj
            .get_own_property(&key)
            .map_or(false, |d| d.is_data_descriptor());
        let desc = PropertyDescriptorSetter {
            configurable: Some(false),
            writable: if level == IntegrityLevel::Frozen && is_data {
                Some(false)
            } else {
                None
            },
            ..Default::default()
        };
        js_obj.define_own_property(key, desc);
    }
}

pub fn test_integrity_level(o: &JsObjectType, level: IntegrityLevel) -> bool {
    let obj = o.borrow();
    let js_obj = obj.as_js_object();
    if js_obj.is_extensible() {
        return false;
    }
    js_obj.own_property_keys().iter().all(|k| match js_obj.get_own_property(k) {
        None => true,
        Some(d) => {
            !d.is_configurable() && (level == IntegrityLevel::Sealed || !d.is_writable())
        }
    })
}

/// The `instanceof` operator.
pub fn ordinary_has_instance(
    ctx: &mut EvalContext,
    f: &JsValue,
    v: &JsValue,
) -> Result<bool, JErrorType> {
    let f_obj = match f {
        JsValue::Object(o) if o.borrow().is_callable() => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(
                "Right-hand side of 'instanceof' is not callable".to_string(),
            ));
        }
    };
    let bound_target = match f_obj.borrow().as_function().map(|func| func.kind()) {
        Some(FunctionKind::Bound { target, .. }) => Some(target.clone()),
        _ => None,
    };
    if let Some(target) = bound_target {
        return ordinary_has_instance(ctx, &JsValue::Object(target), v);
    }
    let v_obj = match v {
        JsValue::Object(o) => o.clone(),
        _ => return Ok(false),
    };
    let proto = match get(ctx, &f_obj, &keys::prototype())? {
        JsValue::Object(p) => p,
        _ => {
            return Err(JErrorType::TypeError(
                "Function has non-object prototype in instanceof check".to_string(),
            ));
        }
    };
    let mut current = v_obj.borrow().as_js_object().get_prototype_of();
    while let Some(p) = current {
        if Rc::ptr_eq(&p, &proto) {
            return Ok(true);
        }
        current = p.borrow().as_js_object().get_prototype_of();
    }
    Ok(false)
}

/// Reads a descriptor object (`{ value, writable, get, set, ... }`) into a partial descriptor.
pub fn to_property_descriptor(
    ctx: &mut EvalContext,
    v: &JsValue,
) -> Result<PropertyDescriptorSetter, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(format!(
                "Property description must be an object: {}",
                v
            )));
        }
    };
    let mut desc = PropertyDescriptorSetter::default();
    if has_property(&o, &keys::enumerable()) {
        desc.enumerable = Some(to_boolean(&get(ctx, &o, &keys::enumerable())?));
    }
    if has_property(&o, &keys::configurable()) {
        desc.configurable = Some(to_boolean(&get(ctx, &o, &keys::configurable())?));
    }
    if has_property(&o, &keys::value()) {
        desc.value = Some(get(ctx, &o, &keys::value())?);
    }
    if has_property(&o, &keys::writable()) {
        desc.writable = Some(to_boolean(&get(ctx, &o, &keys::writable())?));
    }
    for (key, slot) in [(keys::get(), &mut desc.get), (keys::set(), &mut desc.set)] {
        if has_property(&o, &key) {
            let f = get(ctx, &o, &key)?;
            if !f.is_undefined() && !f.is_callable() {
                return Err(JErrorType::TypeError(format!(
                    "Accessor '{}' must be a function: {}",
                    key, f
                )));
            }
            *slot = Some(f);
        }
    }
    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(JErrorType::TypeError(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute"
                .to_string(),
        ));
    }
    Ok(desc)
}

/// Builds the descriptor object returned by `Object.getOwnPropertyDescriptor`.
pub fn from_property_descriptor(ctx: &mut EvalContext, desc: &PropertyDescriptor) -> JsValue {
    let o = object_create(Some(
        ctx.realm
            .get_intrinsics_value(WellKnownIntrinsics::ObjectPrototype),
    ));
    match desc {
        PropertyDescriptor::Data(d) => {
            create_data_property(&o, keys::value(), d.value.clone());
            create_data_property(&o, keys::writable(), JsValue::Boolean(d.writable));
        }
        PropertyDescriptor::Accessor(a) => {
            create_data_property(&o, keys::get(), a.get.clone());
            create_data_property(&o, keys::set(), a.set.clone());
        }
    }
    create_data_property(&o, keys::enumerable(), JsValue::Boolean(desc.is_enumerable()));
    create_data_property(&o, keys::configurable(), JsValue::Boolean(desc.is_configurable()));
    JsValue::Object(o)
}

pub fn create_array_from_list(ctx: &EvalContext, values: Vec<JsValue>) -> JsObjectType {
    array_create_from(
        values,
        Some(ctx.realm.get_intrinsics_value(WellKnownIntrinsics::ArrayPrototype)),
    )
}

/// Reads `length` of an array-like object as a `u32`.
pub fn length_of_array_like(ctx: &mut EvalContext, o: &JsObjectType) -> Result<u32, JErrorType> {
    let len = get(ctx, o, &keys::length())?;
    let n = to_number(ctx, &len)?;
    Ok(to_uint32(n.to_f64()))
}
