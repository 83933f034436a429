//! Read-only view over a resolved configuration document

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Immutable, map-like configuration view.
///
/// Nested objects are handed out as new `Config` values, so every level of a
/// document is read-only. Absent keys and explicit `null` values are treated
/// the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    data: Arc<Map<String, Value>>,
}

/// A single entry looked up in a [`Config`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    /// A nested section
    Section(Config),
    /// Any non-object value
    Value(Value),
}

impl ConfigEntry {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => ConfigEntry::Section(Config::new(map.clone())),
            other => ConfigEntry::Value(other.clone()),
        }
    }

    pub fn as_section(&self) -> Option<&Config> {
        match self {
            ConfigEntry::Section(config) => Some(config),
            ConfigEntry::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ConfigEntry::Value(value) => Some(value),
            ConfigEntry::Section(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    /// Convert back into plain data
    pub fn into_value(self) -> Value {
        match self {
            ConfigEntry::Section(config) => config.to_value(),
            ConfigEntry::Value(value) => value,
        }
    }
}

impl From<Value> for ConfigEntry {
    fn from(value: Value) -> Self {
        ConfigEntry::from_value(&value)
    }
}

impl From<&str> for ConfigEntry {
    fn from(value: &str) -> Self {
        ConfigEntry::Value(Value::String(value.to_string()))
    }
}

impl From<Config> for ConfigEntry {
    fn from(config: Config) -> Self {
        ConfigEntry::Section(config)
    }
}

impl Config {
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Look up `key`; nested objects come back wrapped in a new `Config`
    pub fn get(&self, key: &str) -> Option<ConfigEntry> {
        match self.data.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(ConfigEntry::from_value(value)),
        }
    }

    /// Look up `key`, falling back to `default`
    pub fn get_or(&self, key: &str, default: impl Into<ConfigEntry>) -> ConfigEntry {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Nested section under `key`, if that key holds an object
    pub fn section(&self, key: &str) -> Option<Config> {
        match self.get(key) {
            Some(ConfigEntry::Section(config)) => Some(config),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        !matches!(self.data.get(key), None | Some(Value::Null))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Entries in document order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.data.iter(),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.data.as_ref().clone()
    }

    pub fn into_map(self) -> Map<String, Value> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Always fails: configuration views cannot be modified
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        Err(Error::ImmutableSet {
            key: key.to_string(),
            value: value.into().to_string(),
        })
    }

    /// Always fails: configuration views cannot be modified
    pub fn unset(&self, key: &str) -> Result<()> {
        Err(Error::ImmutableUnset {
            key: key.to_string(),
        })
    }

    /// String form of the view; only an empty config has one
    pub fn try_to_string(&self) -> Result<String> {
        if self.data.is_empty() {
            Ok(String::new())
        } else {
            Err(Error::NotStringConvertible)
        }
    }

    /// Decode the view into a typed structure
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl From<Map<String, Value>> for Config {
    fn from(data: Map<String, Value>) -> Self {
        Config::new(data)
    }
}

impl TryFrom<Value> for Config {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Config::new(map)),
            other => Err(Error::NotAMapping {
                config_path: other.to_string(),
            }),
        }
    }
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.as_ref().serialize(serializer)
    }
}

/// Iterator over the entries of a [`Config`]
pub struct Iter<'a> {
    inner: serde_json::map::Iter<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, ConfigEntry);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_str(), ConfigEntry::from_value(value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a str, ConfigEntry);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
