//! Array exotic objects.
//!
//! Index slots live in a dense vector; an index far past the end of the vector goes to the
//! ordinary property store instead so that `a[1e9] = 1` does not allocate a gigabyte. An index is
//! held by exactly one of the two: the vector when `i < elements.len()`, the store otherwise.

use crate::runner::ds::object::{
    ordinary_define_own_property, validate_and_apply_property_descriptor, JsObject, JsObjectType,
    ObjectBase, ObjectClass, ObjectType,
};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::value::{JsNumberType, JsValue};

/// How far past the dense tail a write may land and still extend the vector.
const DENSE_GAP: u32 = 1024;

pub struct ArrayObject {
    base: ObjectBase,
    elements: Vec<Option<PropertyDescriptor>>,
    sparse_count: usize,
    length: u32,
    length_writable: bool,
}
impl ArrayObject {
    pub fn new(proto: Option<JsObjectType>) -> Self {
        ArrayObject {
            base: ObjectBase::new(ObjectClass::Array, proto),
            elements: Vec::new(),
            sparse_count: 0,
            length: 0,
            length_writable: true,
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    fn length_descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor::new_data(
            JsValue::Number(JsNumberType::Integer(self.length as i64)),
            self.length_writable,
            false,
            false,
        )
    }

    fn get_index(&self, idx: u32) -> Option<&PropertyDescriptor> {
        if (idx as usize) < self.elements.len() {
            self.elements[idx as usize].as_ref()
        } else if self.sparse_count > 0 {
            self.base.properties.get(&PropertyKey::Int(idx))
        } else {
            None
        }
    }

    fn put_index(&mut self, idx: u32, desc: PropertyDescriptor) {
        let i = idx as usize;
        if i < self.elements.len() {
            self.elements[i] = Some(desc);
        } else if idx <= self.elements.len() as u32 + DENSE_GAP {
            let old_len = self.elements.len();
            self.elements.resize(i + 1, None);
            if self.sparse_count > 0 {
                for j in old_len..=i {
                    if let Some(moved) = self.base.properties.remove(&PropertyKey::Int(j as u32)) {
                        self.sparse_count -= 1;
                        self.elements[j] = Some(moved);
                    }
                }
            }
            self.elements[i] = Some(desc);
        } else {
            if !self.base.properties.contains_key(&PropertyKey::Int(idx)) {
                self.sparse_count += 1;
            }
            self.base.properties.insert(PropertyKey::Int(idx), desc);
        }
    }

    fn remove_index(&mut self, idx: u32) {
        let i = idx as usize;
        if i < self.elements.len() {
            self.elements[i] = None;
            if i + 1 == self.elements.len() {
                while let Some(None) = self.elements.last() {
                    self.elements.pop();
                }
            }
        } else if self.base.properties.remove(&PropertyKey::Int(idx)).is_some() {
            self.sparse_count -= 1;
        }
    }

    /// Occupied indices `>= from`, highest first.
    fn occupied_indices_from(&self, from: u32) -> Vec<u32> {
        let mut found: Vec<u32> = self
            .elements
            .iter()
            .enumerate()
            .skip(from as usize)
            .filter(|(_, d)| d.is_some())
            .map(|(i, _)| i as u32)
            .collect();
        if self.sparse_count > 0 {
            found.extend(
                self.base
                    .properties
                    .keys()
                    .filter_map(|k| k.as_index())
                    .filter(|i| *i >= from),
            );
        }
        found.sort_unstable_by(|a, b| b.cmp(a));
        found
    }

    fn define_index(&mut self, idx: u32, descriptor: &PropertyDescriptorSetter) -> bool {
        if idx >= self.length && !self.length_writable {
            return false;
        }
        let extensible = self.base.is_extensible;
        match validate_and_apply_property_descriptor(self.get_index(idx), extensible, descriptor) {
            Some(next) => {
                self.put_index(idx, next);
                if idx >= self.length {
                    self.length = idx + 1;
                }
                true
            }
            None => false,
        }
    }
}

/// Redefines `length`. The value in `descriptor` must already be a valid array length; callers
/// convert and range-check it first. Shrinking deletes indices from the top down and stops at the
/// first slot that refuses deletion, leaving `length` just above it.
pub fn array_set_length(array: &mut ArrayObject, descriptor: &PropertyDescriptorSetter) -> bool {
    let current = array.length_descriptor();
    let new_length = match &descriptor.value {
        None => {
            return match validate_and_apply_property_descriptor(Some(&current), true, descriptor) {
                Some(next) => {
                    array.length_writable = next.is_writable();
                    true
                }
                None => false,
            };
        }
        Some(JsValue::Number(JsNumberType::Integer(n))) if *n >= 0 && *n <= u32::MAX as i64 => {
            *n as u32
        }
        Some(_) => return false,
    };
    let mut without_value = descriptor.clone();
    without_value.value = None;
    if validate_and_apply_property_descriptor(Some(&current), true, &without_value).is_none() {
        return false;
    }
    if new_length != array.length && !array.length_writable {
        return false;
    }
    let new_writable = descriptor.writable != Some(false);
    if new_length < array.length {
        for idx in array.occupied_indices_from(new_length) {
            let configurable = array.get_index(idx).map_or(true, |d| d.is_configurable());
            if !configurable {
                array.length = idx + 1;
                if !new_writable {
                    array.length_writable = false;
                }
                return false;
            }
            array.remove_index(idx);
        }
    }
    array.length = new_length;
    if !new_writable {
        array.length_writable = false;
    }
    true
}

impl JsObject for ArrayObject {
    fn get_object_base(&self) -> &ObjectBase {
        &self.base
    }

    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<PropertyDescriptor> {
        match property {
            PropertyKey::Int(idx) => self.get_index(*idx).cloned(),
            _ if *property == keys::length() => Some(self.length_descriptor()),
            _ => self.base.properties.get(property).cloned(),
        }
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor_setter: PropertyDescriptorSetter,
    ) -> bool {
        match property {
            PropertyKey::Int(idx) => self.define_index(idx, &descriptor_setter),
            _ if property == keys::length() => array_set_length(self, &descriptor_setter),
            _ => ordinary_define_own_property(&mut self.base, property, &descriptor_setter),
        }
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        match property {
            PropertyKey::Int(idx) => match self.get_index(*idx) {
                None => true,
                Some(d) if d.is_configurable() => {
                    self.remove_index(*idx);
                    true
                }
                Some(_) => false,
            },
            _ if *property == keys::length() => false,
            _ => {
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
        }
    }

    fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some())
            .map(|(i, _)| i as u32)
            .collect();
        let mut sparse: Vec<u32> = self
            .base
            .properties
            .keys()
            .filter_map(|k| k.as_index())
            .collect();
        sparse.sort_unstable();
        indices.extend(sparse);
        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Int).collect();
        keys.push(keys::length());
        keys.extend(
            self.base
                .properties
                .keys()
                .filter(|k| k.as_index().is_none())
                .cloned(),
        );
        keys
    }
}

/// Creates an array whose elements are `values`, in order.
pub fn array_create_from(values: Vec<JsValue>, proto: Option<JsObjectType>) -> JsObjectType {
    let mut array = ArrayObject::new(proto);
    array.length = values.len() as u32;
    array.elements = values
        .into_iter()
        .map(|v| Some(PropertyDescriptor::new_data(v, true, true, true)))
        .collect();
    ObjectType::Array(array).into_js_object_type()
}

pub fn array_create(length: u32, proto: Option<JsObjectType>) -> JsObjectType {
    let mut array = ArrayObject::new(proto);
    array.length = length;
    ObjectType::Array(array).into_js_object_type()
}
