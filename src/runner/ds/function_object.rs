use std::rc::Rc;

use crate::parser::ast::FunctionData;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectBase, ObjectClass, ObjectType};
use crate::runner::ds::object_property::{keys, PropertyDescriptor, PropertyDescriptorSetter};
use crate::runner::ds::scope::ScopeRef;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::BuiltInFn;

pub enum FunctionKind {
    /// A function written in script. `scope` is `None` for top-level declarations, which resolve
    /// free names against the global scope at call time.
    Script {
        data: Rc<FunctionData>,
        scope: Option<ScopeRef>,
        strict: bool,
    },
    Native {
        name: JsString,
        call: BuiltInFn,
        /// Present when the builtin can be used with `new`.
        construct: Option<BuiltInFn>,
    },
    Bound {
        target: JsObjectType,
        bound_this: JsValue,
        bound_arguments: Vec<JsValue>,
    },
}

pub struct FunctionObject {
    base: ObjectBase,
    kind: FunctionKind,
}
impl FunctionObject {
    pub fn new(kind: FunctionKind, proto: Option<JsObjectType>) -> Self {
        FunctionObject {
            base: ObjectBase::new(ObjectClass::Function, proto),
            kind,
        }
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn is_strict(&self) -> bool {
        match &self.kind {
            FunctionKind::Script { strict, .. } => *strict,
            _ => false,
        }
    }

    pub fn is_constructor(&self) -> bool {
        match &self.kind {
            FunctionKind::Script { .. } => true,
            FunctionKind::Native { construct, .. } => construct.is_some(),
            FunctionKind::Bound { target, .. } => target
                .borrow()
                .as_function()
                .map_or(false, |f| f.is_constructor()),
        }
    }

    /// Best-effort name for diagnostics.
    pub fn debug_name(&self) -> String {
        match &self.kind {
            FunctionKind::Script { data, .. } => match &data.id {
                Some(id) => id.name.to_string(),
                None => "anonymous".to_string(),
            },
            FunctionKind::Native { name, .. } => name.to_string(),
            FunctionKind::Bound { target, .. } => match target.borrow().as_function() {
                Some(f) => format!("bound {}", f.debug_name()),
                None => "bound".to_string(),
            },
        }
    }
}
impl JsObject for FunctionObject {
    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}

/// Allocates a builtin function object with its own `length` and `name`.
pub fn create_native_function(
    name: &str,
    length: u32,
    call: BuiltInFn,
    construct: Option<BuiltInFn>,
    function_prototype: Option<JsObjectType>,
) -> JsObjectType {
    let name = JsString::from(name);
    let mut f = FunctionObject::new(
        FunctionKind::Native {
            name: name.clone(),
            call,
            construct,
        },
        function_prototype,
    );
    f.define_own_property(
        keys::length(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::from_i64(length as i64),
            false,
            false,
            false,
        )),
    );
    f.define_own_property(
        keys::name(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::String(name),
            false,
            false,
            false,
        )),
    );
    ObjectType::Function(f).into_js_object_type()
}
