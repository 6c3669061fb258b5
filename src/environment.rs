// Lexical scope chain.
//
// Each scope owns its bindings and holds a shared handle to its parent.
// Function values keep their defining scope alive through the same handle,
// so assignments made through any holder are visible to all of them.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("Undefined variable: {0}")]
    Undefined(String),
    #[error("Cannot reassign a constant variable: {0}")]
    ConstantReassignment(String),
    #[error("Cannot redeclare block scoped variable {0}")]
    Redeclaration(String),
}

#[derive(Debug)]
struct Binding {
    value: Value,
    constant: bool,
}

#[derive(Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    parent: Option<Environment>,
}

/// Cheap-to-clone handle to one scope in the chain.
#[derive(Clone, Default)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Environment {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh child scope of `parent`.
    pub fn with_parent(parent: &Environment) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                bindings: HashMap::new(),
                parent: Some(parent.clone()),
            })),
        }
    }

    /// Bind `name` in this scope. Shadowing an outer binding is allowed,
    /// redeclaring one in the same scope is not.
    pub fn declare(
        &self,
        name: &str,
        value: Value,
        constant: bool,
    ) -> Result<Value, EnvironmentError> {
        let mut scope = self.scope.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(EnvironmentError::Redeclaration(name.to_string()));
        }
        scope.bindings.insert(
            name.to_string(),
            Binding {
                value: value.clone(),
                constant,
            },
        );
        Ok(value)
    }

    /// Overwrite `name` in the nearest scope that owns it.
    pub fn assign(&self, name: &str, value: Value) -> Result<Value, EnvironmentError> {
        let owner = self
            .resolve(name)
            .ok_or_else(|| EnvironmentError::Undefined(name.to_string()))?;

        let mut scope = owner.scope.borrow_mut();
        match scope.bindings.get_mut(name) {
            Some(binding) if binding.constant => {
                Err(EnvironmentError::ConstantReassignment(name.to_string()))
            }
            Some(binding) => {
                binding.value = value.clone();
                Ok(value)
            }
            None => Err(EnvironmentError::Undefined(name.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, EnvironmentError> {
        let owner = self
            .resolve(name)
            .ok_or_else(|| EnvironmentError::Undefined(name.to_string()))?;

        let scope = owner.scope.borrow();
        scope
            .bindings
            .get(name)
            .map(|binding| binding.value.clone())
            .ok_or_else(|| EnvironmentError::Undefined(name.to_string()))
    }

    /// Walk the chain outward from this scope to the one that owns `name`.
    pub fn resolve(&self, name: &str) -> Option<Environment> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.scope.borrow();
                if scope.bindings.contains_key(name) {
                    return Some(current.clone());
                }
                scope.parent.clone()
            };
            current = parent?;
        }
    }

    pub fn is_constant(&self, name: &str) -> bool {
        let Some(owner) = self.resolve(name) else {
            return false;
        };
        let scope = owner.scope.borrow();
        scope
            .bindings
            .get(name)
            .map_or(false, |binding| binding.constant)
    }

    /// Names bound directly in this scope, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scope.borrow().bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Environment {
    // Bindings can hold closures that point back at this scope, so only
    // names are printed.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.local_names())
            .field("has_parent", &self.scope.borrow().parent.is_some())
            .finish()
    }
}
