//! Wrapper objects for primitive values (`new String("ab")`, `Object(1)`, boxed `this`).
//!
//! A String wrapper exposes its code units as read-only index properties plus a fixed `length`;
//! these are synthesized on demand rather than stored.

use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{
    ordinary_define_own_property, validate_and_apply_property_descriptor, JsObject, JsObjectType,
    ObjectBase, ObjectClass,
};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::value::JsValue;

pub struct PrimitiveObject {
    base: ObjectBase,
    value: JsValue,
}
impl PrimitiveObject {
    pub fn new(value: JsValue, proto: Option<JsObjectType>) -> Self {
        let class = match &value {
            JsValue::Boolean(_) => ObjectClass::Boolean,
            JsValue::Number(_) => ObjectClass::Number,
            _ => ObjectClass::String,
        };
        PrimitiveObject {
            base: ObjectBase::new(class, proto),
            value,
        }
    }

    pub fn primitive_value(&self) -> &JsValue {
        &self.value
    }

    fn string_data(&self) -> Option<&JsString> {
        match &self.value {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn synthesized_property(&self, property: &PropertyKey) -> Option<PropertyDescriptor> {
        let s = self.string_data()?;
        match property {
            PropertyKey::Int(idx) => s.char_code_at(*idx as usize).map(|unit| {
                PropertyDescriptor::new_data(
                    JsValue::String(JsString::from_units(vec![unit])),
                    false,
                    true,
                    false,
                )
            }),
            _ if *property == keys::length() => Some(PropertyDescriptor::new_data(
                JsValue::from_i64(s.len() as i64),
                false,
                false,
                false,
            )),
            _ => None,
        }
    }
}
impl JsObject for PrimitiveObject {
    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<PropertyDescriptor> {
        self.synthesized_property(property)
            .or_else(|| self.base.properties.get(property).cloned())
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor_setter: PropertyDescriptorSetter,
    ) -> bool {
        match self.synthesized_property(&property) {
            // Synthesized slots are non-configurable and non-writable, so only restating them
            // can succeed and nothing needs storing.
            Some(current) => {
                validate_and_apply_property_descriptor(Some(&current), false, &descriptor_setter)
                    .is_some()
            }
            None => ordinary_define_own_property(&mut self.base, property, &descriptor_setter),
        }
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        if self.synthesized_property(property).is_some() {
            return false;
        }
        let base = &mut self.base;
        match base.properties.get(property) {
            None => true,
            Some(d) if d.is_configurable() => {
                base.properties.remove(property);
                true
            }
            Some(_) => false,
        }
    }

    fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut keys_out = Vec::new();
        if let Some(s) = self.string_data() {
            keys_out.extend((0..s.len() as u32).map(PropertyKey::Int));
            keys_out.push(keys::length());
        }
        keys_out.extend(self.base.properties.keys().cloned());
        keys_out
    }
}
