use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::Value;

/// A shared, mutable environment frame.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of the lexical environment chain.
///
/// Frames map names to values and link to an optional parent. Closures hold
/// on to their defining frame, so frames are reference-counted and interior
/// mutability serializes writes under the single-threaded executor.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Creates a root frame with no parent.
    #[must_use]
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Self { values: HashMap::new(),
                                    parent: None }))
    }

    /// Creates a frame chained under `parent`.
    #[must_use]
    pub fn with_parent(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self { values: HashMap::new(),
                                    parent: Some(parent) }))
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    ///
    /// Used for function parameters and loop variables.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Looks `name` up through the frame chain.
    ///
    /// The chain is never mutated by a lookup.
    #[must_use]
    pub fn get(env: &EnvRef, name: &str) -> Option<Value> {
        let mut current = Rc::clone(env);
        loop {
            if let Some(value) = current.borrow().values.get(name) {
                return Some(value.clone());
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(next) => current = next,
                None => return None,
            }
        }
    }

    /// Assigns `name`, writing to the nearest frame that already binds it.
    ///
    /// When no frame in the chain binds the name, the binding is created in
    /// `env` itself. Exactly one frame is mutated either way.
    pub fn assign(env: &EnvRef, name: &str, value: Value) {
        let mut current = Rc::clone(env);
        loop {
            if current.borrow().values.contains_key(name) {
                current.borrow_mut().define(name, value);
                return;
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(next) => current = next,
                None => break,
            }
        }

        env.borrow_mut().define(name, value);
    }

    /// Returns `true` when `name` is bound anywhere in the chain.
    #[must_use]
    pub fn exists(env: &EnvRef, name: &str) -> bool {
        Self::get(env, name).is_some()
    }
}
