//! Build sets and their canonical textual form
//!
//! A build set maps build identifiers to build documents. The documents
//! belong to the application core; the bridge only carries them, so they
//! are kept as raw JSON values and written back exactly as received.

use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Storage key under which the latest snapshot lives
pub const STORED_BUILDS_KEY: &str = "storedBuilds";

/// Full collection of persisted builds, keyed by build identifier
///
/// Key order is preserved through parse and serialize, so a snapshot
/// loaded at bootstrap is handed to the core in the order it was stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildSet(Map<String, Value>);

impl BuildSet {
    /// Create an empty build set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse a stored snapshot
    ///
    /// `null` counts as "nothing stored". Anything that is not a JSON
    /// object is reported as a corrupt snapshot.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BridgeError::CorruptSnapshot(e.to_string()))?;
        Self::try_from(value)
    }

    /// Canonical textual form written to storage (compact JSON)
    pub fn to_canonical(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Insert or replace a build document
    pub fn insert(&mut self, id: impl Into<String>, doc: Value) -> Option<Value> {
        self.0.insert(id.into(), doc)
    }

    /// Look up a build document by identifier
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Build identifiers in stored order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for BuildSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for BuildSet {
    type Error = BridgeError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(BridgeError::CorruptSnapshot(format!(
                "expected an object of builds, found {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
