//! Core built-ins registration.

use crate::runner::plugin::registry::BuiltInRegistry;

use super::array;
use super::boolean;
use super::console;
use super::error;
use super::function;
use super::global;
use super::number;
use super::object;
use super::string;

/// Register all core built-in objects with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    global::register(registry);
    object::register(registry);
    function::register(registry);
    array::register(registry);
    string::register(registry);
    number::register(registry);
    boolean::register(registry);
    error::register(registry);
    console::register(registry);
}
