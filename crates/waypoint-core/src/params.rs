//! Loosely shaped route parameters
//!
//! `Params` is the input side of reverse routing: an ordered list of
//! positional or named entries, like an associative array. Reserved names
//! (`module`, `controller`, `action`, `ext`, `args`, `query`, `#`) map onto
//! the descriptor directly; any other name becomes a query entry and any
//! positional entry becomes a path argument.

use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Query mapping; ordering is irrelevant, sorted for stable output
pub type Query = BTreeMap<String, String>;

/// Entry key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }
}

/// Numeric strings become positional keys
impl From<&str> for Key {
    fn from(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(i) => Key::Index(i),
            Err(_) => Key::Name(s.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from(s.as_str())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// Entry value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
    Map(Query),
}

impl Value {
    /// Coerce to a single string
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::List(items) => items.join(","),
            Value::Map(map) => crate::encoding::encode_query(map),
        }
    }

    /// Coerce to a list of strings
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Value::Text(s) => vec![s.clone()],
            Value::List(items) => items.clone(),
            Value::Map(map) => map.values().cloned().collect(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Query> for Value {
    fn from(map: Query) -> Self {
        Value::Map(map)
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Text(n.to_string())
            }
        })*
    };
}

value_from_number!(i32, i64, u32, u64, usize);

/// Ordered parameter list
///
/// # Example
/// ```
/// use waypoint_core::Params;
///
/// let params = Params::new()
///     .module("users")
///     .controller("profile")
///     .arg(123)
///     .query("tab", "posts");
///
/// assert_eq!(params.get_text("module"), Some("users"));
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: SmallVec<[(Key, Value); 8]>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entry, replacing any entry with the same key
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn module(self, module: impl Into<String>) -> Self {
        self.with(Key::Name("module".into()), Value::Text(module.into()))
    }

    pub fn controller(self, controller: impl Into<String>) -> Self {
        self.with(Key::Name("controller".into()), Value::Text(controller.into()))
    }

    pub fn action(self, action: impl Into<String>) -> Self {
        self.with(Key::Name("action".into()), Value::Text(action.into()))
    }

    pub fn ext(self, ext: impl Into<String>) -> Self {
        self.with(Key::Name("ext".into()), Value::Text(ext.into()))
    }

    /// Append a positional argument
    pub fn arg(mut self, arg: impl ToString) -> Self {
        let index = self.next_index();
        self.entries.push((Key::Index(index), Value::Text(arg.to_string())));
        self
    }

    /// Set the `args` list
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let list: Vec<String> = args.into_iter().map(|a| a.to_string()).collect();
        self.with(Key::Name("args".into()), Value::List(list))
    }

    /// Add one entry to the `query` mapping
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let mut map = match self.get("query") {
            Some(Value::Map(map)) => map.clone(),
            _ => Query::new(),
        };
        map.insert(name.into(), value.to_string());
        self.insert(Key::Name("query".into()), Value::Map(map));
        self
    }

    /// Set the fragment (`#` key)
    pub fn fragment(self, fragment: impl Into<Value>) -> Self {
        self.with(Key::Name("#".into()), fragment)
    }

    /// Set the slug to resolve through `detect`
    pub fn slug(self, slug: impl Into<String>) -> Self {
        self.with(Key::Name("slug".into()), Value::Text(slug.into()))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_name() == Some(name))
            .map(|(_, v)| v)
    }

    /// Get a named entry holding plain text
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| k.as_name() == Some(name))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Key, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next free positional index
    fn next_index(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                Key::Index(i) => Some(i + 1),
                Key::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Merge `overrides` on top of these params
    ///
    /// Array-merge semantics: named entries replace, positional entries
    /// are renumbered and appended. `args` lists are extended and `query`
    /// maps are merged key by key, so base arguments survive an override.
    pub fn merge(&mut self, overrides: &Params) {
        for (key, value) in overrides.iter() {
            match key {
                Key::Index(_) => {
                    let index = self.next_index();
                    self.entries.push((Key::Index(index), value.clone()));
                }
                Key::Name(name) if name == "args" => {
                    let merged = match self.get("args") {
                        Some(existing) => {
                            let mut list = existing.to_list();
                            list.extend(value.to_list());
                            Value::List(list)
                        }
                        None => value.clone(),
                    };
                    self.insert(key.clone(), merged);
                }
                Key::Name(name) if name == "query" => {
                    let merged = match (self.get("query"), value) {
                        (Some(Value::Map(existing)), Value::Map(extra)) => {
                            let mut map = existing.clone();
                            map.extend(extra.clone());
                            Value::Map(map)
                        }
                        _ => value.clone(),
                    };
                    self.insert(key.clone(), merged);
                }
                Key::Name(_) => self.insert(key.clone(), value.clone()),
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<Key>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
