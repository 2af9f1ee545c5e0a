//! Built-in registry: collects builtin definitions and materializes them on the global object.

use rustc_hash::FxHashSet;

use super::types::{BuiltInFn, BuiltInMethod, BuiltInObject, EvalContext};
use crate::runner::ds::function_object::create_native_function;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::register_core_builtins;

/// Attributes of a global value binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalValueKind {
    /// `undefined`, `NaN`, `Infinity`: non-writable, non-enumerable, non-configurable.
    Constant,
    /// Writable, non-enumerable, configurable, like every other builtin global.
    Builtin,
}

/// Registry for built-in objects.
///
/// Definitions are kept in registration order; registering a name twice replaces the earlier
/// definition, which is how a host overrides a builtin before installation.
pub struct BuiltInRegistry {
    objects: Vec<BuiltInObject>,
    global_functions: Vec<BuiltInMethod>,
    global_values: Vec<(String, JsValue, GlobalValueKind)>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            objects: Vec::new(),
            global_functions: Vec::new(),
            global_values: Vec::new(),
        }
    }

    /// Create a registry with the standard library.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    pub fn register_object(&mut self, obj: BuiltInObject) {
        self.objects.retain(|o| o.name != obj.name);
        self.objects.push(obj);
    }

    pub fn register_global_function(&mut self, name: impl Into<String>, func: BuiltInFn, length: u32) {
        let name = name.into();
        self.global_functions.retain(|m| m.name != name);
        self.global_functions.push(BuiltInMethod { name, func, length });
    }

    pub fn register_global_value(&mut self, name: impl Into<String>, value: JsValue, kind: GlobalValueKind) {
        let name = name.into();
        self.global_values.retain(|(n, _, _)| *n != name);
        self.global_values.push((name, value, kind));
    }

    pub fn get_object(&self, name: &str) -> Option<&BuiltInObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.get_object(name).is_some()
    }

    /// Names of every global binding this registry will create.
    pub fn global_names(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.objects
            .iter()
            .map(|o| o.name.as_str())
            .chain(self.global_functions.iter().map(|m| m.name.as_str()))
            .chain(self.global_values.iter().map(|(n, _, _)| n.as_str()))
            .filter(|n| seen.insert(*n))
            .collect()
    }

    /// Creates every registered builtin as an ordinary object and binds it on the global object.
    pub fn install(self, ctx: &mut EvalContext) {
        let global = ctx.global_object();
        let function_prototype = ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);

        for (name, value, kind) in self.global_values {
            let (writable, configurable) = match kind {
                GlobalValueKind::Constant => (false, false),
                GlobalValueKind::Builtin => (true, true),
            };
            define_hidden(&global, PropertyKey::from(name.as_str()), value, writable, configurable);
        }
        define_hidden(
            &global,
            PropertyKey::from("globalThis"),
            JsValue::Object(global.clone()),
            true,
            true,
        );

        for method in self.global_functions {
            install_method(&global, method, &function_prototype);
        }

        for obj in self.objects {
            let prototype = obj.prototype.map(|p| ctx.intrinsic(p));
            let target = match obj.constructor {
                Some(ctor) => {
                    let f = create_native_function(
                        &obj.name,
                        ctor.length,
                        ctor.call,
                        ctor.construct,
                        Some(function_prototype.clone()),
                    );
                    if let Some(proto) = &prototype {
                        define_hidden(&f, keys::prototype(), JsValue::Object(proto.clone()), false, false);
                        define_hidden(proto, keys::constructor(), JsValue::Object(f.clone()), true, true);
                    }
                    f
                }
                None => object_create(Some(ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype))),
            };
            for method in obj.static_methods {
                install_method(&target, method, &function_prototype);
            }
            for (name, value) in obj.static_properties {
                define_hidden(&target, PropertyKey::from(name.as_str()), value, false, false);
            }
            if let Some(proto) = &prototype {
                for method in obj.prototype_methods {
                    install_method(proto, method, &function_prototype);
                }
                for (name, value) in obj.prototype_properties {
                    define_hidden(proto, PropertyKey::from(name.as_str()), value, true, true);
                }
            }
            tracing::trace!(name = %obj.name, "installed builtin");
            define_hidden(&global, PropertyKey::from(obj.name.as_str()), JsValue::Object(target), true, true);
        }
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

fn define_hidden(o: &JsObjectType, key: PropertyKey, value: JsValue, writable: bool, configurable: bool) {
    o.borrow_mut().as_js_object_mut().define_own_property(
        key,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value,
            writable,
            false,
            configurable,
        )),
    );
}

fn install_method(target: &JsObjectType, method: BuiltInMethod, function_prototype: &JsObjectType) {
    let f = create_native_function(
        &method.name,
        method.length,
        method.func,
        None,
        Some(function_prototype.clone()),
    );
    define_hidden(target, PropertyKey::from(method.name.as_str()), JsValue::Object(f), true, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;
    use crate::runner::ds::operations::object::get;

    fn answer(_: &mut EvalContext, _: JsValue, _: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        Ok(JsValue::from_i64(42))
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = BuiltInRegistry::new();
        registry.register_object(BuiltInObject::new("Thing").add_static_method("a", answer, 0));
        registry.register_object(BuiltInObject::new("Thing").add_static_method("b", answer, 0));
        assert_eq!(registry.global_names(), vec!["Thing"]);
        let thing = registry.get_object("Thing").map(|o| o.static_methods.len());
        assert_eq!(thing, Some(1));
    }

    #[test]
    fn install_binds_globals() {
        let mut ctx = EvalContext::default();
        let mut registry = BuiltInRegistry::new();
        registry.register_global_value("answer", JsValue::from_i64(42), GlobalValueKind::Constant);
        registry.register_object(BuiltInObject::new("Thing").add_static_method("a", answer, 0));
        registry.install(&mut ctx);

        let global = ctx.global_object();
        let desc = global
            .borrow()
            .as_js_object()
            .get_own_property(&PropertyKey::from("answer"));
        assert!(matches!(desc, Some(d) if !d.is_writable() && !d.is_configurable()));
        let thing = get(&mut ctx, &global, &PropertyKey::from("Thing"));
        assert!(matches!(thing, Ok(JsValue::Object(_))));
    }
}
