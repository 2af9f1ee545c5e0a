//! Error built-in objects.
//!
//! Provides the Error, TypeError, ReferenceError, RangeError and SyntaxError constructors. Each
//! works the same with or without `new` and always returns a fresh error object.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{object_create_with_class, JsObjectType, ObjectClass};
use crate::runner::ds::object_property::{keys, PropertyDescriptor, PropertyDescriptorSetter};
use crate::runner::ds::operations::object::get;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext, NativeFn};

use super::arg;

/// Register all error types with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let error = BuiltInObject::new("Error")
        .with_prototype(WellKnownIntrinsics::ErrorPrototype)
        .with_constructor(error_constructor, 1)
        .add_method("toString", error_to_string, 0)
        .add_prototype_property("name", JsValue::from_str("Error"))
        .add_prototype_property("message", JsValue::from_str(""));
    registry.register_object(error);

    registry.register_object(native_error("TypeError", type_error_constructor));
    registry.register_object(native_error("ReferenceError", reference_error_constructor));
    registry.register_object(native_error("RangeError", range_error_constructor));
    registry.register_object(native_error("SyntaxError", syntax_error_constructor));
}

fn native_error(name: &str, constructor: NativeFn) -> BuiltInObject {
    BuiltInObject::new(name)
        .with_prototype(WellKnownIntrinsics::error_prototype_for(name))
        .with_constructor(constructor, 1)
        .add_prototype_property("name", JsValue::from_str(name))
        .add_prototype_property("message", JsValue::from_str(""))
}

/// Allocates an error object of the named kind. The engine uses this to materialize its own
/// errors at a `catch` site.
pub fn create_error_object(ctx: &EvalContext, name: &str, message: &str) -> JsObjectType {
    let proto = ctx.intrinsic(WellKnownIntrinsics::error_prototype_for(name));
    let error = object_create_with_class(ObjectClass::Error, Some(proto));
    set_message(&error, JsString::from(message));
    error
}

fn set_message(error: &JsObjectType, message: JsString) {
    error.borrow_mut().as_js_object_mut().define_own_property(
        keys::message(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::String(message),
            true,
            false,
            true,
        )),
    );
}

fn construct_error(
    ctx: &mut EvalContext,
    name: &str,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let proto = ctx.intrinsic(WellKnownIntrinsics::error_prototype_for(name));
    let error = object_create_with_class(ObjectClass::Error, Some(proto));
    let message = arg(&args, 0);
    if !message.is_undefined() {
        let message = to_string(ctx, &message)?;
        set_message(&error, message);
    }
    Ok(JsValue::Object(error))
}

/// Error(message)
fn error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    construct_error(ctx, "Error", args)
}

/// TypeError(message)
fn type_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    construct_error(ctx, "TypeError", args)
}

/// ReferenceError(message)
fn reference_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    construct_error(ctx, "ReferenceError", args)
}

/// RangeError(message)
fn range_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    construct_error(ctx, "RangeError", args)
}

/// SyntaxError(message)
fn syntax_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    construct_error(ctx, "SyntaxError", args)
}

/// Error.prototype.toString
fn error_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = match &this {
        JsValue::Object(o) => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(
                "Error.prototype.toString called on non-object".to_string(),
            ))
        }
    };
    let name = match get(ctx, &o, &keys::name())? {
        JsValue::Undefined => JsString::from("Error"),
        v => to_string(ctx, &v)?,
    };
    let message = match get(ctx, &o, &keys::message())? {
        JsValue::Undefined => JsString::empty(),
        v => to_string(ctx, &v)?,
    };
    let rendered = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        name.concat(&JsString::from(": ")).concat(&message)
    };
    Ok(JsValue::String(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_link_to_the_matching_prototype() {
        let mut ctx = EvalContext::default();
        let error = create_error_object(&ctx, "RangeError", "too deep");
        let proto = error.borrow().as_js_object().get_prototype_of();
        let expected = ctx.intrinsic(WellKnownIntrinsics::RangeErrorPrototype);
        assert!(proto.map_or(false, |p| std::rc::Rc::ptr_eq(&p, &expected)));
        let message = get(&mut ctx, &error, &keys::message());
        assert!(matches!(message, Ok(JsValue::String(s)) if s.to_string() == "too deep"));
    }
}
