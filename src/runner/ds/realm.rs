use crate::runner::ds::array_object::ArrayObject;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::create_native_function;
use crate::runner::ds::object::{
    object_create, object_create_with_class, JsObjectType, ObjectClass, ObjectType,
};
use crate::runner::ds::scope::{Scope, ScopeRef};
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::{BuiltInFn, EvalContext};

/// Objects the engine itself needs to reach regardless of what scripts do to the globals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WellKnownIntrinsics {
    ObjectPrototype,
    FunctionPrototype,
    ArrayPrototype,
    StringPrototype,
    NumberPrototype,
    BooleanPrototype,
    ErrorPrototype,
    TypeErrorPrototype,
    ReferenceErrorPrototype,
    RangeErrorPrototype,
    SyntaxErrorPrototype,
    /// Shared getter/setter that guards `callee`/`caller` on strict arguments objects.
    ThrowTypeError,
}
impl WellKnownIntrinsics {
    const COUNT: usize = 12;

    pub fn error_prototype_for(name: &str) -> WellKnownIntrinsics {
        match name {
            "TypeError" => WellKnownIntrinsics::TypeErrorPrototype,
            "ReferenceError" => WellKnownIntrinsics::ReferenceErrorPrototype,
            "RangeError" => WellKnownIntrinsics::RangeErrorPrototype,
            "SyntaxError" => WellKnownIntrinsics::SyntaxErrorPrototype,
            _ => WellKnownIntrinsics::ErrorPrototype,
        }
    }
}

fn function_prototype_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Undefined)
}

fn throw_type_error(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Err(JErrorType::TypeError(
        "'caller' and 'callee' may not be accessed on strict mode arguments objects".to_string(),
    ))
}

pub struct CodeRealm {
    intrinsics: Vec<JsObjectType>,
    pub global_this: JsObjectType,
    /// Global lexical scope in front of the global object; program code starts here.
    pub global_scope: ScopeRef,
}
impl CodeRealm {
    pub fn new() -> Self {
        let intrinsics = create_intrinsics();
        let object_prototype = intrinsics[WellKnownIntrinsics::ObjectPrototype as usize].clone();
        let global_this = object_create_with_class(ObjectClass::Global, Some(object_prototype));
        let global_scope = Scope::new_global(global_this.clone());
        CodeRealm {
            intrinsics,
            global_this,
            global_scope,
        }
    }

    pub fn get_intrinsics_value(&self, int_name: WellKnownIntrinsics) -> JsObjectType {
        self.intrinsics[int_name as usize].clone()
    }
}
impl Default for CodeRealm {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the intrinsic objects, indexed by `WellKnownIntrinsics` discriminant.
pub fn create_intrinsics() -> Vec<JsObjectType> {
    let object_prototype = object_create(None);
    let proto = || Some(object_prototype.clone());
    let function_prototype = create_native_function(
        "",
        0,
        BuiltInFn::Native(function_prototype_call),
        None,
        proto(),
    );
    let wrapper = |v: JsValue| ObjectType::Primitive(PrimitiveObject::new(v, proto())).into_js_object_type();
    let error_prototype = object_create_with_class(ObjectClass::Error, proto());
    let native_error_prototype =
        || object_create_with_class(ObjectClass::Error, Some(error_prototype.clone()));
    let throw_type_error_fn = create_native_function(
        "",
        0,
        BuiltInFn::Native(throw_type_error),
        None,
        Some(function_prototype.clone()),
    );
    throw_type_error_fn
        .borrow_mut()
        .as_js_object_mut()
        .prevent_extensions();

    let intrinsics = vec![
        object_prototype.clone(),
        function_prototype,
        ObjectType::Array(ArrayObject::new(proto())).into_js_object_type(),
        wrapper(JsValue::from_str("")),
        wrapper(JsValue::from_i64(0)),
        wrapper(JsValue::Boolean(false)),
        error_prototype.clone(),
        native_error_prototype(),
        native_error_prototype(),
        native_error_prototype(),
        native_error_prototype(),
        throw_type_error_fn,
    ];
    debug_assert_eq!(intrinsics.len(), WellKnownIntrinsics::COUNT);
    intrinsics
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn intrinsic_prototype_links() {
        let realm = CodeRealm::new();
        let object_proto = realm.get_intrinsics_value(WellKnownIntrinsics::ObjectPrototype);
        let type_error_proto = realm.get_intrinsics_value(WellKnownIntrinsics::TypeErrorPrototype);
        let error_proto = realm.get_intrinsics_value(WellKnownIntrinsics::ErrorPrototype);
        let parent = type_error_proto.borrow().as_js_object().get_prototype_of();
        assert!(parent.map_or(false, |p| Rc::ptr_eq(&p, &error_proto)));
        assert!(object_proto.borrow().as_js_object().get_prototype_of().is_none());
        assert!(realm
            .get_intrinsics_value(WellKnownIntrinsics::FunctionPrototype)
            .borrow()
            .is_callable());
    }
}
