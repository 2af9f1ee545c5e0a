//! Scope chain: a singly linked list of variable objects, innermost first.

use std::rc::Rc;

use crate::runner::ds::object::{object_create_with_class, JsObjectType, ObjectClass};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::has_property;

pub type ScopeRef = Rc<Scope>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// The global object.
    Global,
    /// Global `let`/`const` bindings, sitting just inside the global object.
    GlobalLexical,
    Function,
    /// Binds the name of a named function expression.
    FunctionName,
    Block,
    Catch,
    /// Object environment of a `with` statement; its bindings supply `this` for calls.
    With,
}

pub struct Scope {
    pub variable_object: JsObjectType,
    pub parent: Option<ScopeRef>,
    pub kind: ScopeKind,
}
impl Scope {
    pub fn new_global(global_object: JsObjectType) -> ScopeRef {
        let outer = Rc::new(Scope {
            variable_object: global_object,
            parent: None,
            kind: ScopeKind::Global,
        });
        Rc::new(Scope {
            variable_object: object_create_with_class(ObjectClass::Declarative, None),
            parent: Some(outer),
            kind: ScopeKind::GlobalLexical,
        })
    }

    pub fn push(parent: &ScopeRef, variable_object: JsObjectType, kind: ScopeKind) -> ScopeRef {
        Rc::new(Scope {
            variable_object,
            parent: Some(parent.clone()),
            kind,
        })
    }

    /// Finds the innermost node whose variable object has `name` as an own or inherited
    /// property.
    pub fn lookup(self: &Rc<Self>, name: &PropertyKey) -> Option<ScopeRef> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if has_property(&scope.variable_object, name) {
                return Some(scope);
            }
            current = scope.parent.clone();
        }
        None
    }

    /// The outermost node, whose variable object is the global object.
    pub fn global(self: &Rc<Self>) -> ScopeRef {
        let mut current = self.clone();
        while let Some(parent) = current.parent.clone() {
            current = parent;
        }
        current
    }

    /// Nearest node that receives `var` declarations (function activation or global).
    pub fn variable_scope(self: &Rc<Self>) -> ScopeRef {
        let mut current = self.clone();
        loop {
            if matches!(current.kind, ScopeKind::Function | ScopeKind::Global) {
                return current;
            }
            match current.parent.clone() {
                Some(p) => current = p,
                None => return current,
            }
        }
    }

    /// Nearest node that receives `let`/`const` declarations of the enclosing body.
    pub fn lexical_scope(self: &Rc<Self>) -> ScopeRef {
        let mut current = self.clone();
        loop {
            if matches!(
                current.kind,
                ScopeKind::Function | ScopeKind::GlobalLexical | ScopeKind::Block | ScopeKind::Global
            ) {
                return current;
            }
            match current.parent.clone() {
                Some(p) => current = p,
                None => return current,
            }
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        let mut n = 1;
        let mut current = self.parent.as_ref();
        while let Some(p) = current {
            n += 1;
            current = p.parent.as_ref();
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::object_create;
    use crate::runner::ds::object_property::PropertyDescriptorSetter;
    use crate::runner::ds::value::JsValue;

    fn bind(obj: &JsObjectType, name: &str) {
        obj.borrow_mut().as_js_object_mut().define_own_property(
            PropertyKey::from(name),
            PropertyDescriptorSetter::new_default_data(JsValue::Null),
        );
    }

    #[test]
    fn innermost_binding_wins() {
        let global = object_create(None);
        bind(&global, "x");
        let chain = Scope::new_global(global.clone());
        let block = object_create_with_class(ObjectClass::Declarative, None);
        bind(&block, "x");
        let inner = Scope::push(&chain, block.clone(), ScopeKind::Block);

        let found = inner.lookup(&PropertyKey::from("x")).map(|s| s.kind);
        assert_eq!(found, Some(ScopeKind::Block));
        let found = chain.lookup(&PropertyKey::from("x")).map(|s| s.kind);
        assert_eq!(found, Some(ScopeKind::Global));
        assert!(inner.lookup(&PropertyKey::from("y")).is_none());
        assert_eq!(inner.depth(), 3);
        assert_eq!(inner.global().kind, ScopeKind::Global);
        assert_eq!(inner.variable_scope().kind, ScopeKind::Global);
    }
}
