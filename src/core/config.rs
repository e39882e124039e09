//! Configuration values with typed, defaulted lookups
//!
//! A [`Config`] is a JSON tree addressed with slash-separated paths such as
//! `Log/File/MaxLine`. Adapters read their settings through a
//! [`ConfigSection`], which never fails: a missing or malformed value yields
//! the caller's default.

use super::error::{LoggerError, Result};
use super::severity::Severity;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: Value,
}

impl Config {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(LoggerError::config("Config", "root must be a JSON object"));
        }
        Ok(Self { root })
    }

    /// Parse a JSON document
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_engine::core::Config;
    ///
    /// let config = Config::from_json_str(r#"{"Log": {"File": {"MaxLine": 3}}}"#).unwrap();
    /// assert_eq!(config.section("Log/File").get_i64("MaxLine", 0), 3);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&text)
    }

    /// Set a value, creating intermediate sections as needed
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };
        let mut node = &mut self.root;
        for part in parents {
            node = ensure_object(node)
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(node).insert(last.to_string(), value.into());
    }

    /// Builder form of [`Config::set`]
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('/')
            .filter(|p| !p.is_empty())
            .try_fold(&self.root, |node, part| node.get(part))
    }

    /// Section at `path`; a missing section behaves as empty
    pub fn section<'a>(&'a self, path: &'a str) -> ConfigSection<'a> {
        let name = path.rsplit('/').find(|p| !p.is_empty()).unwrap_or("");
        ConfigSection {
            name,
            value: self.get(path),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// A read-only view of one configuration section
#[derive(Debug, Clone, Copy)]
pub struct ConfigSection<'a> {
    name: &'a str,
    value: Option<&'a Value>,
}

impl<'a> ConfigSection<'a> {
    /// An empty section; every lookup returns its default
    pub fn empty(name: &'a str) -> Self {
        Self { name, value: None }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.value?.get(key)
    }

    /// Nested sections, in document order
    pub fn children(&self) -> impl Iterator<Item = ConfigSection<'a>> + 'a {
        self.value
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter())
            .filter(|(_, v)| v.is_object())
            .map(|(k, v)| ConfigSection {
                name: k.as_str(),
                value: Some(v),
            })
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Like [`ConfigSection::get_i64`], with negative values replaced by the default
    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        u64::try_from(self.get_i64(key, default as i64)).unwrap_or(default)
    }

    /// Severity by name; a present but unrecognised name degrades to `Undefined`
    pub fn get_severity(&self, key: &str, default: Severity) -> Severity {
        match self.get(key) {
            Some(Value::String(s)) => Severity::parse_lenient(s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|i| i8::try_from(i).ok())
                .map(Severity::from_i8)
                .unwrap_or(Severity::Undefined),
            Some(_) => Severity::Undefined,
            None => default,
        }
    }
}
