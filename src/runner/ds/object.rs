use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::runner::ds::arguments_object::ArgumentsObject;
use crate::runner::ds::array_object::ArrayObject;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorAccessor, PropertyDescriptorSetter, PropertyKey,
    PropertyStore,
};
use crate::runner::ds::operations::test_and_comparison::same_value;
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::JsValue;

pub type JsObjectType = Rc<RefCell<ObjectType>>;

pub enum ObjectType {
    Ordinary(OrdinaryObject),
    Array(ArrayObject),
    Function(FunctionObject),
    Arguments(ArgumentsObject),
    Primitive(PrimitiveObject),
}
impl ObjectType {
    pub fn is_callable(&self) -> bool {
        matches!(self, ObjectType::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ObjectType::Array(_))
    }

    pub fn as_function(&self) -> Option<&FunctionObject> {
        match self {
            ObjectType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayObject> {
        match self {
            ObjectType::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveObject> {
        match self {
            ObjectType::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_js_object(&self) -> &dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o,
            ObjectType::Array(o) => o,
            ObjectType::Function(o) => o,
            ObjectType::Arguments(o) => o,
            ObjectType::Primitive(o) => o,
        }
    }

    pub fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o,
            ObjectType::Array(o) => o,
            ObjectType::Function(o) => o,
            ObjectType::Arguments(o) => o,
            ObjectType::Primitive(o) => o,
        }
    }

    pub fn into_js_object_type(self) -> JsObjectType {
        Rc::new(RefCell::new(self))
    }
}

/// The `[[Class]]` tag, reported by `Object.prototype.toString` and used to tell variable objects
/// apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Object,
    Array,
    Function,
    Arguments,
    Error,
    Boolean,
    Number,
    String,
    Global,
    /// Variable object of a function activation.
    Activation,
    /// Variable object of a block, catch clause or the global lexical scope.
    Declarative,
}
impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectClass::Object | ObjectClass::Activation | ObjectClass::Declarative => "Object",
            ObjectClass::Array => "Array",
            ObjectClass::Function => "Function",
            ObjectClass::Arguments => "Arguments",
            ObjectClass::Error => "Error",
            ObjectClass::Boolean => "Boolean",
            ObjectClass::Number => "Number",
            ObjectClass::String => "String",
            ObjectClass::Global => "global",
        };
        write!(f, "{}", name)
    }
}

pub struct ObjectBase {
    pub properties: PropertyStore,
    pub is_extensible: bool,
    pub prototype: Option<JsObjectType>,
    pub class: ObjectClass,
}
impl ObjectBase {
    pub fn new(class: ObjectClass, prototype: Option<JsObjectType>) -> Self {
        ObjectBase {
            properties: PropertyStore::new(),
            is_extensible: true,
            prototype,
            class,
        }
    }
}

/// Own-property behaviour of an object. Nothing here runs script code; the prototype-walking
/// operations that may call accessors live in `operations::object`.
pub trait JsObject {
    fn get_object_base(&self) -> &ObjectBase;

    fn get_object_base_mut(&mut self) -> &mut ObjectBase;

    fn class(&self) -> ObjectClass {
        self.get_object_base().class
    }

    fn get_prototype_of(&self) -> Option<JsObjectType> {
        self.get_object_base().prototype.clone()
    }

    fn is_extensible(&self) -> bool {
        self.get_object_base().is_extensible
    }

    fn prevent_extensions(&mut self) -> bool {
        self.get_object_base_mut().is_extensible = false;
        true
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<PropertyDescriptor> {
        self.get_object_base().properties.get(property).cloned()
    }

    fn has_own_property(&self, property: &PropertyKey) -> bool {
        self.get_own_property(property).is_some()
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor_setter: PropertyDescriptorSetter,
    ) -> bool {
        ordinary_define_own_property(self.get_object_base_mut(), property, &descriptor_setter)
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        let base = self.get_object_base_mut();
        match base.properties.get(property) {
            None => true,
            Some(pd) => {
                if pd.is_configurable() {
                    base.properties.remove(property);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Own keys in enumeration order.
    fn own_property_keys(&self) -> Vec<PropertyKey> {
        self.get_object_base().properties.keys().cloned().collect()
    }
}

pub struct OrdinaryObject {
    base: ObjectBase,
}
impl OrdinaryObject {
    pub fn new(class: ObjectClass, prototype: Option<JsObjectType>) -> Self {
        OrdinaryObject {
            base: ObjectBase::new(class, prototype),
        }
    }
}
impl JsObject for OrdinaryObject {
    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}

pub fn object_create(prototype: Option<JsObjectType>) -> JsObjectType {
    ObjectType::Ordinary(OrdinaryObject::new(ObjectClass::Object, prototype)).into_js_object_type()
}

pub fn object_create_with_class(class: ObjectClass, prototype: Option<JsObjectType>) -> JsObjectType {
    ObjectType::Ordinary(OrdinaryObject::new(class, prototype)).into_js_object_type()
}

/// Checks `descriptor` against the existing slot and returns the slot to store, or `None` when
/// the definition must be rejected.
///
/// For a non-configurable `current`: configurable and enumerable may not change, data and
/// accessor may not be swapped, a non-writable value may only be restated, and accessor
/// functions may not be replaced.
pub fn validate_and_apply_property_descriptor(
    current: Option<&PropertyDescriptor>,
    extensible: bool,
    descriptor: &PropertyDescriptorSetter,
) -> Option<PropertyDescriptor> {
    let current = match current {
        None => {
            return if extensible {
                Some(PropertyDescriptor::new_from_property_descriptor_setter(descriptor))
            } else {
                None
            };
        }
        Some(c) => c,
    };
    if descriptor.is_empty() || descriptor.is_restatement_of(current) {
        return Some(current.clone());
    }
    if !current.is_configurable() {
        if descriptor.configurable == Some(true) {
            return None;
        }
        if descriptor.enumerable.map_or(false, |e| e != current.is_enumerable()) {
            return None;
        }
    }
    let mut next = current.clone();
    if descriptor.is_generic_descriptor() {
        // only the shared flags change
    } else if current.is_data_descriptor() != descriptor.is_data_descriptor() {
        if !current.is_configurable() {
            return None;
        }
        next = if descriptor.is_data_descriptor() {
            PropertyDescriptor::new_data(
                JsValue::Undefined,
                false,
                current.is_enumerable(),
                current.is_configurable(),
            )
        } else {
            PropertyDescriptor::Accessor(PropertyDescriptorAccessor {
                get: JsValue::Undefined,
                set: JsValue::Undefined,
                enumerable: current.is_enumerable(),
                configurable: current.is_configurable(),
            })
        };
    } else if !current.is_configurable() {
        match current {
            PropertyDescriptor::Data(d) => {
                if !d.writable {
                    if descriptor.writable == Some(true) {
                        return None;
                    }
                    if let Some(v) = &descriptor.value {
                        if !same_value(v, &d.value) {
                            return None;
                        }
                    }
                }
            }
            PropertyDescriptor::Accessor(a) => {
                if let Some(s) = &descriptor.set {
                    if !same_value(s, &a.set) {
                        return None;
                    }
                }
                if let Some(g) = &descriptor.get {
                    if !same_value(g, &a.get) {
                        return None;
                    }
                }
            }
        }
    }
    next.apply(descriptor);
    Some(next)
}

pub fn ordinary_define_own_property(
    base: &mut ObjectBase,
    property: PropertyKey,
    descriptor: &PropertyDescriptorSetter,
) -> bool {
    let extensible = base.is_extensible;
    match validate_and_apply_property_descriptor(
        base.properties.get(&property),
        extensible,
        descriptor,
    ) {
        Some(next) => {
            base.properties.insert(property, next);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    #[test]
    fn define_on_non_extensible_object_is_rejected() {
        let o = object_create(None);
        let mut o = o.borrow_mut();
        let o = o.as_js_object_mut();
        o.prevent_extensions();
        assert!(!o.define_own_property(key("x"), PropertyDescriptorSetter::new_default_data(JsValue::Null)));
    }

    #[test]
    fn non_configurable_slot_rejects_relaxation() {
        let o = object_create(None);
        let mut o = o.borrow_mut();
        let o = o.as_js_object_mut();
        assert!(o.define_own_property(
            key("x"),
            PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
                JsValue::from_i64(1),
                false,
                false,
                false
            ))
        ));
        // restating is fine
        assert!(o.define_own_property(key("x"), PropertyDescriptorSetter::value_only(JsValue::from_i64(1))));
        assert!(!o.define_own_property(key("x"), PropertyDescriptorSetter::value_only(JsValue::from_i64(2))));
        assert!(!o.define_own_property(
            key("x"),
            PropertyDescriptorSetter {
                writable: Some(true),
                ..Default::default()
            }
        ));
        assert!(!o.define_own_property(
            key("x"),
            PropertyDescriptorSetter {
                get: Some(JsValue::Undefined),
                ..Default::default()
            }
        ));
        assert!(!o.delete(&key("x")));
    }

    #[test]
    fn configurable_data_slot_can_become_accessor() {
        let o = object_create(None);
        let mut o = o.borrow_mut();
        let o = o.as_js_object_mut();
        o.define_own_property(key("x"), PropertyDescriptorSetter::new_default_data(JsValue::from_i64(1)));
        assert!(o.define_own_property(
            key("x"),
            PropertyDescriptorSetter {
                get: Some(JsValue::Undefined),
                ..Default::default()
            }
        ));
        let slot = o.get_own_property(&key("x"));
        assert!(matches!(slot, Some(PropertyDescriptor::Accessor(ref a)) if a.enumerable && a.configurable));
    }
}
