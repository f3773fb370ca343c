//! Lexical binding environments.
//!
//! A [`Scope`] is a shared handle to a node in a parent-linked tree. Function
//! values keep the scope they were declared in alive, so nodes are reference
//! counted rather than owned by a single frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

struct ScopeNode {
    parent: Option<Scope>,
    bindings: RefCell<HashMap<String, Value>>,
}

/// A binding environment with an optional parent.
#[derive(Clone)]
pub struct Scope(Rc<ScopeNode>);

impl Scope {
    /// A root scope with no parent.
    pub fn global() -> Self {
        Scope(Rc::new(ScopeNode {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        }))
    }

    /// A new empty scope whose parent is `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(ScopeNode {
            parent: Some(self.clone()),
            bindings: RefCell::new(HashMap::new()),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The outermost ancestor.
    pub fn root(&self) -> Scope {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current.clone()
    }

    /// Number of ancestors between this scope and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Create or overwrite a binding in this scope only.
    pub fn declare_local(&self, name: &str, value: Value) {
        self.0.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Overwrite the nearest binding of `name`. With no binding anywhere in
    /// the chain, the value lands in the root scope.
    pub fn assign(&self, name: &str, value: Value) {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(slot) = scope.0.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return;
            }
            current = scope.parent();
        }
        self.root().declare_local(name, value);
    }

    /// Nearest binding of `name`, searching outward.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(value) = scope.0.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            current = scope.parent();
        }
        None
    }

    /// Binding of `name` in this scope only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.bindings.borrow().get(name).cloned()
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    /// True if both handles point at the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Scope {
    // Bindings may hold functions that capture this scope; print names only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.0.bindings.borrow();
        let mut names: Vec<&String> = bindings.keys().collect();
        names.sort();
        f.debug_struct("Scope")
            .field("depth", &self.depth())
            .field("names", &names)
            .finish()
    }
}
