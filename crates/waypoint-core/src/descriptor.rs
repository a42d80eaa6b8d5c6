//! Canonical route descriptor and default filling

use crate::inflect::Inflector;
use crate::params::{Key, Params, Query, Value};
use serde::{Deserialize, Serialize};

/// Reserved descriptor keys
pub(crate) const MODULE: &str = "module";
pub(crate) const CONTROLLER: &str = "controller";
pub(crate) const ACTION: &str = "action";
pub(crate) const EXT: &str = "ext";
pub(crate) const ARGS: &str = "args";
pub(crate) const QUERY: &str = "query";
pub(crate) const FRAGMENT: &str = "#";

/// Fragment part of a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Fragment {
    #[default]
    None,
    Text(String),
    /// Rendered as its own encoded query string
    Query(Query),
}

impl Fragment {
    pub fn is_none(&self) -> bool {
        matches!(self, Fragment::None)
    }
}

/// Canonical destination
///
/// Produced by `defaults()`: module, controller and action are always
/// filled and inflected. Structurally comparable and hashable, so it
/// doubles as the build-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteDescriptor {
    pub module: String,
    pub controller: String,
    pub action: String,
    pub ext: String,
    pub args: Vec<String>,
    pub query: Query,
    #[serde(skip_serializing_if = "Fragment::is_none")]
    pub fragment: Fragment,
}

impl RouteDescriptor {
    /// Bare descriptor for the given defaults
    pub fn home(defaults: &RouteDefaults) -> Self {
        Self {
            module: defaults.module.clone(),
            controller: defaults.controller.clone(),
            action: defaults.action.clone(),
            ext: String::new(),
            args: Vec::new(),
            query: Query::new(),
            fragment: Fragment::None,
        }
    }

    /// True when nothing distinguishes this from the home destination
    pub fn is_home(&self, defaults: &RouteDefaults) -> bool {
        *self == Self::home(defaults)
    }

    /// Convert back into params
    ///
    /// `query` is always present, so building from the result never
    /// inherits the current request's query.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new()
            .module(self.module.as_str())
            .controller(self.controller.as_str())
            .action(self.action.as_str());
        if !self.ext.is_empty() {
            params.insert(Key::Name(EXT.into()), self.ext.as_str());
        }
        if !self.args.is_empty() {
            params.insert(Key::Name(ARGS.into()), Value::List(self.args.clone()));
        }
        params.insert(Key::Name(QUERY.into()), Value::Map(self.query.clone()));
        match &self.fragment {
            Fragment::None => {}
            Fragment::Text(s) => params.insert(Key::Name(FRAGMENT.into()), s.as_str()),
            Fragment::Query(q) => params.insert(Key::Name(FRAGMENT.into()), Value::Map(q.clone())),
        }
        params
    }
}

/// Default module/controller/action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDefaults {
    pub module: String,
    pub controller: String,
    pub action: String,
}

impl Default for RouteDefaults {
    fn default() -> Self {
        Self {
            module: "pages".to_string(),
            controller: "index".to_string(),
            action: "index".to_string(),
        }
    }
}

/// Fill defaults and bucket loosely shaped params into a descriptor
///
/// `inherited` seeds the query when `params` carries no `query` entry.
pub(crate) fn canonicalize(
    params: &Params,
    defaults: &RouteDefaults,
    inflector: &dyn Inflector,
    inherited: Option<&Query>,
) -> RouteDescriptor {
    let mut descriptor = RouteDescriptor::home(defaults);
    if !params.contains(QUERY) {
        if let Some(query) = inherited {
            descriptor.query = query.clone();
        }
    }

    for (key, value) in params.iter() {
        let name = match key {
            Key::Index(_) => {
                descriptor.args.extend(value.to_list());
                continue;
            }
            Key::Name(name) => name.as_str(),
        };

        match name {
            MODULE => descriptor.module = token_or(inflector, value, &defaults.module),
            CONTROLLER => descriptor.controller = token_or(inflector, value, &defaults.controller),
            ACTION => descriptor.action = token_or(inflector, value, &defaults.action),
            EXT => descriptor.ext = value.to_text().trim_start_matches('.').to_string(),
            ARGS => descriptor.args.extend(value.to_list()),
            QUERY => match value {
                Value::Map(map) => descriptor.query.extend(map.clone()),
                Value::Text(s) => descriptor.query.extend(crate::encoding::parse_query(s)),
                Value::List(items) => descriptor
                    .query
                    .extend(items.iter().cloned().enumerate().map(|(i, v)| (i.to_string(), v))),
            },
            FRAGMENT => {
                descriptor.fragment = match value {
                    Value::Map(map) => Fragment::Query(map.clone()),
                    other => Fragment::Text(other.to_text()),
                }
            }
            other => {
                descriptor.query.insert(other.to_string(), value.to_text());
            }
        }
    }

    descriptor
}

fn token_or(inflector: &dyn Inflector, value: &Value, default: &str) -> String {
    let token = inflector.to_route_token(&value.to_text());
    if token.is_empty() {
        default.to_string()
    } else {
        token
    }
}
