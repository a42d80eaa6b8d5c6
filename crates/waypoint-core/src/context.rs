//! Per-request routing context
//!
//! Created once per request by [`Router::request`]. Holds the request's
//! `Segments`, the route matched for it and a fresh build cache, so
//! nothing request-specific outlives the request.

use crate::cache::BuildCache;
use crate::descriptor::{
    Fragment, RouteDescriptor, ACTION, ARGS, CONTROLLER, EXT, FRAGMENT, MODULE, QUERY,
};
use crate::encoding::{encode, encode_arg, parse_query};
use crate::params::{Key, Params, Query, Value};
use crate::router::{append_query, mount_prefix, MatchedRoute, Router};
use crate::segments::Segments;
use crate::slug::SlugTarget;
use crate::{Error, Result};
use tracing::trace;

/// Target accepted by [`RequestContext::detect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Slug key or literal path
    Path(String),
    /// Params, optionally carrying a `slug` entry
    Params(Params),
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::Path(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::Path(s)
    }
}

impl From<Params> for Target {
    fn from(params: Params) -> Self {
        Target::Params(params)
    }
}

/// Routing state for one request
#[derive(Debug)]
pub struct RequestContext<'r> {
    router: &'r Router,
    segments: Segments,
    current: MatchedRoute<'r>,
    cache: BuildCache,
}

impl<'r> RequestContext<'r> {
    pub(crate) fn new(router: &'r Router, segments: Segments, implied_locale: &str) -> Self {
        let current = router.match_with(segments.path(), implied_locale);
        Self {
            router,
            segments,
            current,
            cache: BuildCache::new(),
        }
    }

    /// Route matched when the request started; never recomputed
    pub fn current(&self) -> &MatchedRoute<'r> {
        &self.current
    }

    /// Canonical destination of the current route
    pub fn destination(&self) -> RouteDescriptor {
        self.router.descriptor_for(&self.current)
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    /// Active locale, explicit from the path or implied
    pub fn locale(&self) -> &str {
        self.current.locale()
    }

    pub fn router(&self) -> &'r Router {
        self.router
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// Canonicalize params; an absent query is taken from this request
    /// when the router inherits queries
    pub fn defaults(&self, params: &Params) -> RouteDescriptor {
        let inherited = self
            .router
            .inherits_query()
            .then(|| self.segments.query());
        self.router.defaults_with(params, inherited)
    }

    /// Build a canonical URL, memoized per descriptor
    pub fn build(&mut self, params: &Params) -> String {
        let descriptor = self.defaults(params);
        if let Some(url) = self.cache.get(&descriptor) {
            trace!(url = %url, "Build cache hit");
            return url;
        }

        let url = self.router.assemble(
            &descriptor,
            self.segments.base_path(),
            self.locale_prefix(),
        );
        trace!(url = %url, "Build cache miss");
        self.cache.insert(descriptor, url.clone());
        url
    }

    /// Resolve a slug, params or literal path to a URL
    ///
    /// A `slug` entry in params is looked up and its descriptor merged
    /// under the remaining params. A string that names a slug resolves
    /// to it; any other string is returned unchanged.
    pub fn detect(&mut self, target: impl Into<Target>) -> String {
        let router = self.router;
        match target.into() {
            Target::Path(path) => match router.slug(&path) {
                Some(SlugTarget::Descriptor(d)) => self.build(&d.to_params()),
                Some(SlugTarget::Path(literal)) => literal.clone(),
                None => path,
            },
            Target::Params(mut params) => {
                let key = params.remove("slug").map(|v| v.to_text());
                match key.as_deref().and_then(|k| router.slug(k)) {
                    Some(SlugTarget::Descriptor(d)) => {
                        let mut merged = d.to_params();
                        merged.merge(&params);
                        self.build(&merged)
                    }
                    Some(SlugTarget::Path(literal)) => literal.clone(),
                    None => self.build(&params),
                }
            }
        }
    }

    /// Build a URL from a named route's own template
    ///
    /// Tokens are filled from same-named params (`args` from positional
    /// params). Reserved names the template lacks are dropped; any other
    /// named param becomes the query. Returns
    /// `Ok(None)` when a required token has no value.
    pub fn build_route(&self, key: &str, params: &Params) -> Result<Option<String>> {
        let route = self
            .router
            .table()
            .get(key)
            .ok_or_else(|| Error::UnknownRoute(key.to_string()))?;
        let template = route.template();
        let inflector = self.router.inflector();

        let mut args = Vec::new();
        let mut query = Query::new();
        let mut fragment = Fragment::None;
        for (k, value) in params.iter() {
            let name = match k {
                Key::Index(_) => {
                    args.extend(value.to_list());
                    continue;
                }
                Key::Name(name) => name.as_str(),
            };
            if name == ARGS {
                args.extend(value.to_list());
            } else if template.tokens().iter().any(|t| t == name)
                || matches!(name, MODULE | CONTROLLER | ACTION | EXT)
            {
                continue;
            } else if name == QUERY {
                match value {
                    Value::Map(map) => query.extend(map.clone()),
                    other => query.extend(parse_query(&other.to_text())),
                }
            } else if name == FRAGMENT {
                fragment = match value {
                    Value::Map(map) => Fragment::Query(map.clone()),
                    other => Fragment::Text(other.to_text()),
                };
            } else {
                query.insert(name.to_string(), value.to_text());
            }
        }

        let path = template.fill(|token| {
            if token == ARGS {
                let encoded: Vec<String> = args.iter().map(|a| encode_arg(a)).collect();
                return Some(encoded.join("/"));
            }
            let value = params.get(token)?.to_text();
            match token {
                MODULE | CONTROLLER | ACTION => Some(inflector.to_route_token(&value)),
                _ => Some(encode(&value).into_owned()),
            }
        });
        let Some(path) = path else {
            trace!(key, "Route token missing, nothing built");
            return Ok(None);
        };

        let mut url = mount_prefix(self.segments.base_path(), self.locale_prefix());
        url.push_str(&path);
        append_query(&mut url, &query, &fragment);
        Ok(Some(url))
    }

    /// Locale path prefix for built URLs: only in the localized family and
    /// only when the active locale is not the primary one
    fn locale_prefix(&self) -> Option<&str> {
        let locale = self.locale();
        (self.router.is_localized() && locale != self.router.primary_locale()).then_some(locale)
    }
}
