//! Persisted-state container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RevealResult;

/// Flat string-keyed integer map with nested bundles.
///
/// Stands in for the host's saved-instance-state container. Serializes to
/// JSON so hosts without a native container can still persist it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBundle {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ints: BTreeMap<String, i32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    bundles: BTreeMap<String, StateBundle>,
}

impl StateBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an integer under `key`, replacing any previous value.
    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.ints.insert(key.into(), value);
    }

    /// Integer stored under `key`, if any.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.ints.get(key).copied()
    }

    /// Store a nested bundle under `key`.
    pub fn put_bundle(&mut self, key: impl Into<String>, bundle: StateBundle) {
        self.bundles.insert(key.into(), bundle);
    }

    /// Nested bundle stored under `key`, if any.
    pub fn get_bundle(&self, key: &str) -> Option<&StateBundle> {
        self.bundles.get(key)
    }

    /// Integer entries in key order.
    pub fn ints(&self) -> impl Iterator<Item = (&str, i32)> {
        self.ints.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Serialize the bundle to JSON.
    pub fn to_json(&self) -> RevealResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a bundle previously written by [`StateBundle::to_json`].
    pub fn from_json(json: &str) -> RevealResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
