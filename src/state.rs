//! Scope stack for variables and functions, plus the global alias table
//!
//! Names resolve dynamically: innermost scope first, outward to the base
//! scope. The stack never empties; the base scope holds globals.

use std::collections::HashMap;
use std::env;
use std::rc::Rc;

use crate::ast::Function;

/// One frame of bindings
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: HashMap<String, String>,
    functions: HashMap<String, Rc<Function>>,
}

#[derive(Debug, Clone)]
pub struct State {
    scopes: Vec<Scope>,
    aliases: HashMap<String, String>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        State {
            scopes: vec![Scope::default()],
            aliases: HashMap::new(),
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pops the innermost scope. The base scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Binds `name` in the innermost scope, shadowing outer bindings.
    pub fn create_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.innermost()
            .variables
            .insert(name.into(), value.into());
    }

    /// Assigns to the nearest scope that already binds `name`.
    /// Returns `false`, creating nothing, when no scope does.
    pub fn mutate_variable(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.variables.get_mut(name))
        {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Scope-stack lookup only.
    pub fn lookup_variable(&self, name: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
            .map(String::as_str)
    }

    /// Resolves `name` through the scopes, then the process environment.
    /// Unset names read as the empty string.
    pub fn select_variable(&self, name: &str) -> String {
        match self.lookup_variable(name) {
            Some(value) => value.to_string(),
            None => env::var(name).unwrap_or_default(),
        }
    }

    /// Declares a function in the innermost scope under its own name.
    pub fn create_function(&mut self, function: Rc<Function>) {
        let name = function.name.lexeme.clone();
        self.innermost().functions.insert(name, function);
    }

    pub fn select_function(&self, name: &str) -> Option<Rc<Function>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.functions.get(name))
            .cloned()
    }

    pub fn put_alias(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.aliases.insert(key.into(), value.into());
    }

    pub fn select_alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }
}
