use rustc_hash::FxHashMap;
use std::fmt;

use crate::runner::ds::js_string::JsString;
use crate::runner::ds::operations::test_and_comparison::same_value;
use crate::runner::ds::value::JsValue;

/// Property name. Canonical array-index strings are always stored as `Int`, so `o["1"]` and
/// `o[1]` reach the same slot.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Str(JsString),
    Int(u32),
}
impl PropertyKey {
    pub fn to_js_string(&self) -> JsString {
        match self {
            PropertyKey::Str(s) => s.clone(),
            PropertyKey::Int(i) => JsString::from(i.to_string()),
        }
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Int(i) => Some(*i),
            PropertyKey::Str(_) => None,
        }
    }
}
impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        match s.as_array_index() {
            Some(i) => PropertyKey::Int(i),
            None => PropertyKey::Str(s),
        }
    }
}
impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::from(JsString::from(s))
    }
}
impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        if i == u32::MAX {
            PropertyKey::Str(JsString::from(i.to_string()))
        } else {
            PropertyKey::Int(i)
        }
    }
}
impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Str(s) => write!(f, "{}", s),
            PropertyKey::Int(i) => write!(f, "{}", i),
        }
    }
}
impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

macro_rules! well_known_keys {
    ($($fn_name:ident => $text:literal),* $(,)?) => {
        $(
            pub fn $fn_name() -> PropertyKey {
                thread_local! {
                    static KEY: PropertyKey = PropertyKey::from($text);
                }
                KEY.with(|k| k.clone())
            }
        )*
    };
}

/// Interned keys the engine itself looks up on hot paths.
pub mod keys {
    use super::PropertyKey;

    well_known_keys! {
        length => "length",
        prototype => "prototype",
        constructor => "constructor",
        arguments => "arguments",
        callee => "callee",
        caller => "caller",
        name => "name",
        message => "message",
        to_string => "toString",
        value_of => "valueOf",
        value => "value",
        writable => "writable",
        get => "get",
        set => "set",
        enumerable => "enumerable",
        configurable => "configurable",
    }
}

#[derive(Clone)]
pub struct PropertyDescriptorData {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

/// Accessor slot. `get`/`set` are either `Undefined` or callable objects.
#[derive(Clone)]
pub struct PropertyDescriptorAccessor {
    pub get: JsValue,
    pub set: JsValue,
    pub enumerable: bool,
    pub configurable: bool,
}

#[derive(Clone)]
pub enum PropertyDescriptor {
    Data(PropertyDescriptorData),
    Accessor(PropertyDescriptorAccessor),
}
impl PropertyDescriptor {
    pub fn new_data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Data(PropertyDescriptorData {
            value,
            writable,
            enumerable,
            configurable,
        })
    }

    /// Builds the slot for a property that does not exist yet; absent fields take their
    /// default (`Undefined` / `false`).
    pub fn new_from_property_descriptor_setter(desc: &PropertyDescriptorSetter) -> Self {
        let enumerable = desc.enumerable.unwrap_or(false);
        let configurable = desc.configurable.unwrap_or(false);
        if desc.is_accessor_descriptor() {
            PropertyDescriptor::Accessor(PropertyDescriptorAccessor {
                get: desc.get.clone().unwrap_or(JsValue::Undefined),
                set: desc.set.clone().unwrap_or(JsValue::Undefined),
                enumerable,
                configurable,
            })
        } else {
            PropertyDescriptor::Data(PropertyDescriptorData {
                value: desc.value.clone().unwrap_or(JsValue::Undefined),
                writable: desc.writable.unwrap_or(false),
                enumerable,
                configurable,
            })
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.enumerable,
            PropertyDescriptor::Accessor(a) => a.enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.configurable,
            PropertyDescriptor::Accessor(a) => a.configurable,
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Data(_))
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor(_))
    }

    pub fn is_writable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.writable,
            PropertyDescriptor::Accessor(_) => false,
        }
    }

    pub fn set_configurable(&mut self, flag: bool) {
        match self {
            PropertyDescriptor::Data(d) => d.configurable = flag,
            PropertyDescriptor::Accessor(a) => a.configurable = flag,
        }
    }

    fn set_enumerable(&mut self, flag: bool) {
        match self {
            PropertyDescriptor::Data(d) => d.enumerable = flag,
            PropertyDescriptor::Accessor(a) => a.enumerable = flag,
        }
    }

    /// Overwrites every field present in `desc`. Callers have already validated the change.
    pub fn apply(&mut self, desc: &PropertyDescriptorSetter) {
        if let Some(e) = desc.enumerable {
            self.set_enumerable(e);
        }
        if let Some(c) = desc.configurable {
            self.set_configurable(c);
        }
        match self {
            PropertyDescriptor::Data(d) => {
                if let Some(v) = &desc.value {
                    d.value = v.clone();
                }
                if let Some(w) = desc.writable {
                    d.writable = w;
                }
            }
            PropertyDescriptor::Accessor(a) => {
                if let Some(g) = &desc.get {
                    a.get = g.clone();
                }
                if let Some(s) = &desc.set {
                    a.set = s.clone();
                }
            }
        }
    }
}

/// A partial descriptor as passed to `defineOwnProperty`: only the fields that are `Some` take
/// part in the definition.
#[derive(Clone, Default)]
pub struct PropertyDescriptorSetter {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}
impl PropertyDescriptorSetter {
    pub fn new_from_property_descriptor(desc: PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data(d) => PropertyDescriptorSetter {
                value: Some(d.value),
                writable: Some(d.writable),
                enumerable: Some(d.enumerable),
                configurable: Some(d.configurable),
                ..Default::default()
            },
            PropertyDescriptor::Accessor(a) => PropertyDescriptorSetter {
                get: Some(a.get),
                set: Some(a.set),
                enumerable: Some(a.enumerable),
                configurable: Some(a.configurable),
                ..Default::default()
            },
        }
    }

    /// Writable, enumerable, configurable data property with `value`.
    pub fn new_default_data(value: JsValue) -> Self {
        Self::new_from_property_descriptor(PropertyDescriptor::new_data(value, true, true, true))
    }

    pub fn value_only(value: JsValue) -> Self {
        PropertyDescriptorSetter {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.writable.is_none()
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable.is_none()
            && self.configurable.is_none()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// True when every present field already holds the same value in `current`.
    pub fn is_restatement_of(&self, current: &PropertyDescriptor) -> bool {
        if self.enumerable.map_or(false, |e| e != current.is_enumerable())
            || self.configurable.map_or(false, |c| c != current.is_configurable())
        {
            return false;
        }
        match current {
            PropertyDescriptor::Data(d) => {
                self.get.is_none()
                    && self.set.is_none()
                    && self.writable.map_or(true, |w| w == d.writable)
                    && self.value.as_ref().map_or(true, |v| same_value(v, &d.value))
            }
            PropertyDescriptor::Accessor(a) => {
                self.value.is_none()
                    && self.writable.is_none()
                    && self.get.as_ref().map_or(true, |g| same_value(g, &a.get))
                    && self.set.as_ref().map_or(true, |s| same_value(s, &a.set))
            }
        }
    }
}

/// Insertion-ordered property table.
///
/// Slots live in a vector in definition order; a hash index maps each key to its slot. Deleted
/// slots leave a tombstone that is squeezed out once tombstones dominate the vector.
#[derive(Default)]
pub struct PropertyStore {
    slots: Vec<Option<(PropertyKey, PropertyDescriptor)>>,
    index: FxHashMap<PropertyKey, usize>,
    tombstones: usize,
}
impl PropertyStore {
    pub fn new() -> Self {
        PropertyStore::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        let i = *self.index.get(key)?;
        self.slots[i].as_ref().map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        let i = *self.index.get(key)?;
        self.slots[i].as_mut().map(|(_, d)| d)
    }

    /// Replaces an existing slot in place (keeping its position) or appends a new one.
    pub fn insert(&mut self, key: PropertyKey, desc: PropertyDescriptor) {
        match self.index.get(&key) {
            Some(&i) => self.slots[i] = Some((key, desc)),
            None => {
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push(Some((key, desc)));
            }
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        let i = self.index.remove(key)?;
        let removed = self.slots[i].take().map(|(_, d)| d);
        self.tombstones += 1;
        if self.tombstones > 8 && self.tombstones * 2 > self.slots.len() {
            self.compact();
        }
        removed
    }

    fn compact(&mut self) {
        self.slots.retain(|s| s.is_some());
        self.index.clear();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some((k, _)) = slot {
                self.index.insert(k.clone(), i);
            }
        }
        self.tombstones = 0;
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.slots.iter().filter_map(|s| s.as_ref().map(|(k, _)| k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyDescriptor)> {
        self.slots.iter().filter_map(|s| s.as_ref().map(|(k, d)| (k, d)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut PropertyDescriptor> {
        self.slots.iter_mut().filter_map(|s| s.as_mut().map(|(_, d)| d))
    }
}
