//! Insertion-ordered route table with root fallback

use crate::{Captures, Matcher, MatcherFamily, PathTemplate, TemplateError};
use std::collections::HashMap;

/// Key of the synthetic static root route
pub const ROOT_KEY: &str = "root";

/// Route table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    key: String,
    matcher: Matcher,
}

impl Route {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn template(&self) -> &PathTemplate {
        self.matcher.template()
    }

    /// True for the static root route
    pub fn is_root(&self) -> bool {
        self.template().is_static()
    }
}

/// Result of a table lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'t> {
    /// Matched entry, or the root route on fallback
    pub route: &'t Route,
    /// Raw captures in declaration order
    pub params: Captures,
    /// Explicit locale prefix, localized family only
    pub locale: Option<String>,
    /// True when nothing matched and the root route was substituted
    pub fallback: bool,
}

impl RouteMatch<'_> {
    /// Get a captured value by token name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered route table
///
/// Lookup scans templates in registration order and the first match wins,
/// so callers must register the most specific templates first. Nothing
/// here reorders or checks for shadowed entries.
#[derive(Debug, Clone)]
pub struct RouteTable {
    family: MatcherFamily,
    routes: Vec<Route>,
    /// Key -> index of the last route registered under it
    by_key: HashMap<String, usize>,
    root: Route,
}

impl RouteTable {
    /// Create an empty table; only the root route is present
    pub fn new(family: MatcherFamily) -> Self {
        let root = Route {
            key: ROOT_KEY.to_string(),
            matcher: family.matcher(PathTemplate::root()),
        };
        Self {
            family,
            routes: Vec::new(),
            by_key: HashMap::new(),
            root,
        }
    }

    pub fn family(&self) -> &MatcherFamily {
        &self.family
    }

    /// Append a compiled template
    ///
    /// A repeated key replaces the lookup-by-key entry; both templates
    /// stay in match order.
    pub fn map(&mut self, key: impl Into<String>, template: PathTemplate) {
        let key = key.into();
        self.by_key.insert(key.clone(), self.routes.len());
        self.routes.push(Route {
            key,
            matcher: self.family.matcher(template),
        });
    }

    /// Compile and append a pattern
    pub fn insert(&mut self, key: impl Into<String>, pattern: &str) -> Result<(), TemplateError> {
        let template = PathTemplate::compile(pattern)?;
        self.map(key, template);
        Ok(())
    }

    /// Resolve a path; never fails
    ///
    /// Falls back to the root route when no template matches.
    pub fn match_path(&self, path: &str) -> RouteMatch<'_> {
        for route in &self.routes {
            if let Some(result) = route.matcher.test(path) {
                return RouteMatch {
                    route,
                    params: result.params,
                    locale: result.locale,
                    fallback: false,
                };
            }
        }

        if let Some(result) = self.root.matcher.test(path) {
            return RouteMatch {
                route: &self.root,
                params: result.params,
                locale: result.locale,
                fallback: false,
            };
        }

        RouteMatch {
            route: &self.root,
            params: Vec::new(),
            locale: self.root.matcher.locale_prefix(path).map(str::to_string),
            fallback: true,
        }
    }

    /// Look up a route by key; [`ROOT_KEY`] returns the root route
    pub fn get(&self, key: &str) -> Option<&Route> {
        match self.by_key.get(key) {
            Some(&i) => self.routes.get(i),
            None if key == ROOT_KEY => Some(&self.root),
            None => None,
        }
    }

    pub fn root(&self) -> &Route {
        &self.root
    }

    /// Registered routes in match order (root excluded)
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
