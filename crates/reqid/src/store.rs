//! Per-request variable store.
//!
//! The injector only ever writes, through [`VariableStore::set`]. The host
//! owns the store and decides how long it lives; [`RequestVars`] is the store
//! carried in `http::Request` extensions by the tower integration.

use std::collections::HashMap;

use serde::Serialize;

/// Key for the primary identifier.
pub const PRIMARY_KEY: &str = "request_id";

/// Key for the additional identifier called `name`.
pub fn derived_key(name: &str) -> String {
    format!("{PRIMARY_KEY}.{name}")
}

/// Write capability into a host-owned per-request store.
pub trait VariableStore {
    fn set(&mut self, key: &str, value: String);
}

impl VariableStore for HashMap<String, String> {
    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// Request-scoped string variables, read by later pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestVars {
    vars: HashMap<String, String>,
}

impl RequestVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The primary identifier, if one was injected.
    pub fn request_id(&self) -> Option<&str> {
        self.get(PRIMARY_KEY)
    }

    /// The additional identifier called `name`, if one was injected.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.get(&derived_key(name))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VariableStore for RequestVars {
    fn set(&mut self, key: &str, value: String) {
        self.vars.insert(key.to_string(), value);
    }
}
