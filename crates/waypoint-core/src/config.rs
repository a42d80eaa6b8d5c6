//! Router configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! base_path = "/"
//! locales = ["en", "fr"]
//!
//! [defaults]
//! module = "pages"
//!
//! [[routes]]
//! key = "blog-page"
//! pattern = "/blog/page-{n}"
//!
//! [slugs]
//! about = "/about-us"
//! view = { module = "pages", action = "view", args = ["123"] }
//! ```
//!
//! Semantic validation runs after parsing and reports every problem at
//! once, before any state is built.

use crate::descriptor::{RouteDefaults, ACTION, ARGS, CONTROLLER, EXT, FRAGMENT, MODULE, QUERY};
use crate::inflect::{Inflector, RouteTokenInflector};
use crate::params::{Key, Params, Query, Value};
use crate::slug::SlugInput;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use waypoint_router::PathTemplate;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Application mount point
    pub base_path: String,

    /// Default module/controller/action
    pub defaults: RouteDefaults,

    /// Locale ids; more than one selects the locale-aware matcher family
    pub locales: Vec<String>,

    /// Fill an absent query from the current request's query
    pub inherit_query: bool,

    /// Application routes, matched before the standard cascade
    pub routes: Vec<RouteConfig>,

    /// Slug key -> literal path or descriptor
    pub slugs: BTreeMap<String, SlugConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            defaults: RouteDefaults::default(),
            locales: vec!["en".to_string()],
            inherit_query: true,
            routes: Vec::new(),
            slugs: BTreeMap::new(),
        }
    }
}

/// One application route
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub key: String,
    pub pattern: String,
}

/// Slug target as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SlugConfig {
    Path(String),
    Descriptor(SlugDescriptor),
}

/// Descriptor table for a slug; absent fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlugDescriptor {
    pub module: Option<String>,
    pub controller: Option<String>,
    pub action: Option<String>,
    pub ext: Option<String>,
    pub args: Vec<String>,
    pub query: Query,
    pub fragment: Option<String>,
}

impl SlugConfig {
    pub fn to_input(&self) -> SlugInput {
        match self {
            SlugConfig::Path(path) => SlugInput::Path(path.clone()),
            SlugConfig::Descriptor(d) => SlugInput::Params(d.to_params()),
        }
    }
}

impl SlugDescriptor {
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        let named = [
            (MODULE, &self.module),
            (CONTROLLER, &self.controller),
            (ACTION, &self.action),
            (EXT, &self.ext),
            (FRAGMENT, &self.fragment),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                params.insert(Key::Name(name.to_string()), value.as_str());
            }
        }
        if !self.args.is_empty() {
            params.insert(Key::Name(ARGS.to_string()), Value::List(self.args.clone()));
        }
        params.insert(Key::Name(QUERY.to_string()), Value::Map(self.query.clone()));
        params
    }
}

impl RouterConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RouterConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Semantic checks; collects every problem
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.locales.is_empty() {
            problems.push("locales must not be empty".to_string());
        }
        for locale in &self.locales {
            if locale.is_empty() || locale.contains('/') {
                problems.push(format!("invalid locale id '{locale}'"));
            }
        }

        let inflector = RouteTokenInflector;
        let defaults = [
            ("module", &self.defaults.module),
            ("controller", &self.defaults.controller),
            ("action", &self.defaults.action),
        ];
        for (name, value) in defaults {
            if inflector.to_route_token(value) != *value {
                problems.push(format!(
                    "default {name} '{value}' is not a canonical route token"
                ));
            }
        }

        for route in &self.routes {
            if route.key.is_empty() {
                problems.push(format!("route with pattern '{}' has an empty key", route.pattern));
            }
            if let Err(e) = PathTemplate::compile(&route.pattern) {
                problems.push(format!("route '{}': {e}", route.key));
            }
        }

        if self.slugs.keys().any(|k| k.is_empty()) {
            problems.push("slug key must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.base_path, "/");
        assert_eq!(config.defaults.module, "pages");
        assert!(config.inherit_query);
    }

    #[test]
    fn test_full_config() {
        let config = RouterConfig::from_toml_str(
            r#"
            base_path = "/app"
            locales = ["en", "fr"]
            inherit_query = false

            [defaults]
            module = "home"

            [[routes]]
            key = "blog-page"
            pattern = "/blog/page-{n}"

            [slugs]
            about = "/about-us"
            view = { module = "pages", action = "view", args = ["123"] }
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path, "/app");
        assert_eq!(config.locales.len(), 2);
        assert!(!config.inherit_query);
        assert_eq!(config.defaults.module, "home");
        assert_eq!(config.defaults.controller, "index");
        assert_eq!(config.routes[0].key, "blog-page");
        assert_eq!(config.slugs["about"], SlugConfig::Path("/about-us".to_string()));

        match config.slugs["view"].to_input() {
            SlugInput::Params(params) => {
                assert_eq!(params.get_text("action"), Some("view"));
                assert_eq!(params.get("args"), Some(&Value::List(vec!["123".to_string()])));
                assert!(params.get("controller").is_none());
            }
            other => panic!("unexpected slug input: {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_problems() {
        let err = RouterConfig::from_toml_str(
            r#"
            locales = ["en", "f/r"]

            [defaults]
            action = "Show Item"

            [[routes]]
            key = ""
            pattern = "/{broken"
            "#,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("invalid locale id 'f/r'"));
        assert!(message.contains("default action"));
        assert!(message.contains("empty key"));
        assert!(message.contains("Unbalanced brace"));
    }

    #[test]
    fn test_empty_locales_rejected() {
        let err = RouterConfig::from_toml_str("locales = []").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = RouterConfig::from_toml_str("base_path = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RouterConfig::load(Path::new("/nonexistent/waypoint.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
