//! Slug (alias) index for reverse building

use crate::descriptor::RouteDescriptor;
use crate::params::Params;
use crate::{Error, Result};
use std::collections::HashMap;

/// What a slug resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugTarget {
    /// Canonical descriptor, built on use
    Descriptor(RouteDescriptor),
    /// Literal path, returned verbatim
    Path(String),
}

/// Input accepted by `map_slug`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugInput {
    Params(Params),
    Path(String),
}

impl From<Params> for SlugInput {
    fn from(params: Params) -> Self {
        SlugInput::Params(params)
    }
}

impl From<&str> for SlugInput {
    fn from(path: &str) -> Self {
        SlugInput::Path(path.to_string())
    }
}

impl From<String> for SlugInput {
    fn from(path: String) -> Self {
        SlugInput::Path(path)
    }
}

/// Slug key -> target; no ordering, one target per key
#[derive(Debug, Clone, Default)]
pub struct SlugIndex {
    entries: HashMap<String, SlugTarget>,
}

impl SlugIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a target; a repeated key replaces the previous one
    pub fn insert(&mut self, key: impl Into<String>, target: SlugTarget) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::EmptySlugKey);
        }
        self.entries.insert(key, target);
        Ok(())
    }

    /// Pure lookup; absence is not an error
    pub fn get(&self, key: &str) -> Option<&SlugTarget> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut slugs = SlugIndex::new();
        slugs.insert("about", SlugTarget::Path("/about-us".to_string())).unwrap();

        assert_eq!(slugs.get("about"), Some(&SlugTarget::Path("/about-us".to_string())));
        assert!(slugs.contains("about"));
        assert_eq!(slugs.get("missing"), None);
        assert_eq!(slugs.len(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut slugs = SlugIndex::new();
        let err = slugs.insert("", SlugTarget::Path("/".to_string())).unwrap_err();
        assert!(matches!(err, Error::EmptySlugKey));
        assert!(slugs.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut slugs = SlugIndex::new();
        slugs.insert("a", SlugTarget::Path("/one".to_string())).unwrap();
        slugs.insert("a", SlugTarget::Path("/two".to_string())).unwrap();
        assert_eq!(slugs.get("a"), Some(&SlugTarget::Path("/two".to_string())));
        assert_eq!(slugs.len(), 1);
    }

    #[test]
    fn test_input_conversions() {
        assert_eq!(SlugInput::from("/x"), SlugInput::Path("/x".to_string()));
        assert!(matches!(SlugInput::from(Params::new()), SlugInput::Params(_)));
    }
}
