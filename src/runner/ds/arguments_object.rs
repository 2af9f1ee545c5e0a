//! The `arguments` object of a call.
//!
//! In sloppy functions each index below the parameter count is *mapped*: reads and writes go
//! straight to the parameter binding in the activation object, so `arguments[0] = 1` changes the
//! first parameter and vice versa. A mapping is dropped when the index is deleted, redefined as an
//! accessor or made non-writable.

use crate::runner::ds::object::{
    ordinary_define_own_property, JsObject, JsObjectType, ObjectBase, ObjectClass,
};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};

pub struct ParameterMap {
    /// Activation object holding the parameter bindings.
    pub env: JsObjectType,
    /// Parameter name for each mapped index; `None` once unmapped.
    pub names: Vec<Option<PropertyKey>>,
}

pub struct ArgumentsObject {
    base: ObjectBase,
    parameter_map: Option<ParameterMap>,
}
impl ArgumentsObject {
    pub fn new(proto: Option<JsObjectType>, parameter_map: Option<ParameterMap>) -> Self {
        ArgumentsObject {
            base: ObjectBase::new(ObjectClass::Arguments, proto),
            parameter_map,
        }
    }

    /// Attaches the parameter aliasing once the initial index properties are in place.
    pub fn set_parameter_map(&mut self, parameter_map: Option<ParameterMap>) {
        self.parameter_map = parameter_map;
    }

    pub fn is_mapped(&self, idx: u32) -> bool {
        self.mapped_name(idx).is_some()
    }

    fn mapped_name(&self, idx: u32) -> Option<&PropertyKey> {
        self.parameter_map
            .as_ref()
            .and_then(|m| m.names.get(idx as usize))
            .and_then(|n| n.as_ref())
    }

    fn unmap(&mut self, idx: u32) {
        if let Some(map) = &mut self.parameter_map {
            if let Some(slot) = map.names.get_mut(idx as usize) {
                *slot = None;
            }
        }
    }
}
impl JsObject for ArgumentsObject {
    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<PropertyDescriptor> {
        let mut desc = self.base.properties.get(property).cloned()?;
        if let (PropertyKey::Int(idx), Some(map)) = (property, &self.parameter_map) {
            if let Some(name) = self.mapped_name(*idx) {
                if let Some(PropertyDescriptor::Data(bound)) =
                    map.env.borrow().as_js_object().get_own_property(name)
                {
                    if let PropertyDescriptor::Data(d) = &mut desc {
                        d.value = bound.value;
                    }
                }
            }
        }
        Some(desc)
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor_setter: PropertyDescriptorSetter,
    ) -> bool {
        let idx = match property {
            PropertyKey::Int(idx) if self.is_mapped(idx) => idx,
            _ => return ordinary_define_own_property(&mut self.base, property, &descriptor_setter),
        };
        if !ordinary_define_own_property(&mut self.base, property, &descriptor_setter) {
            return false;
        }
        if descriptor_setter.is_accessor_descriptor() {
            self.unmap(idx);
            return true;
        }
        if let Some(value) = &descriptor_setter.value {
            if let (Some(name), Some(map)) = (self.mapped_name(idx), &self.parameter_map) {
                map.env.borrow_mut().as_js_object_mut().define_own_property(
                    name.clone(),
                    PropertyDescriptorSetter::value_only(value.clone()),
                );
            }
        }
        if descriptor_setter.writable == Some(false) {
            self.unmap(idx);
        }
        true
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        let base = &mut self.base;
        let deleted = match base.properties.get(property) {
            None => true,
            Some(d) if d.is_configurable() => {
                base.properties.remove(property);
                true
            }
            Some(_) => false,
        };
        if deleted {
            if let PropertyKey::Int(idx) = property {
                self.unmap(*idx);
            }
        }
        deleted
    }
}
