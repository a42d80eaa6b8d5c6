//! Router: start-up state shared by every request
//!
//! Owns the route table, the slug index and the canonicalization rules.
//! Populated once during start-up, read-only while serving. Per-request
//! state lives in [`RequestContext`].

use crate::config::RouterConfig;
use crate::context::RequestContext;
use crate::descriptor::{canonicalize, Fragment, RouteDefaults, RouteDescriptor, ARGS};
use crate::encoding::{decode, encode, encode_arg, encode_query};
use crate::inflect::{Inflector, RouteTokenInflector};
use crate::locale::{LocaleCascade, StaticLocales};
use crate::params::{Key, Params, Query, Value};
use crate::segments::{normalize_base, Segments};
use crate::slug::{SlugIndex, SlugInput, SlugTarget};
use crate::{Error, Result};
use tracing::{debug, info};
use waypoint_router::{Captures, LocaleSet, MatcherFamily, Route, RouteTable};

/// Standard template cascade, most specific first
///
/// Registration order is the match order; do not reorder.
pub const STANDARD_ROUTES: [(&str, &str); 5] = [
    ("args", "/{module}/{controller}/{action}/{*args}.{ext}"),
    ("action.ext", "/{module}/{controller}/{action}.{ext}"),
    ("action", "/{module}/{controller}/{action}"),
    ("controller", "/{module}/{controller}"),
    ("module", "/{module}"),
];

/// Route selected for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute<'r> {
    route: &'r Route,
    params: Captures,
    locale: String,
    explicit_locale: bool,
    fallback: bool,
}

impl<'r> MatchedRoute<'r> {
    /// The table entry; identical for every path that falls back to root
    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn key(&self) -> &'r str {
        self.route.key()
    }

    /// Raw captures in declaration order
    pub fn params(&self) -> &Captures {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Locale of the request, explicit or implied
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// True when the locale came from a path prefix
    pub fn is_locale_explicit(&self) -> bool {
        self.explicit_locale
    }

    /// True when nothing matched and root was substituted
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_root(&self) -> bool {
        self.route.is_root()
    }
}

/// URL routing engine
///
/// # Example
/// ```
/// use waypoint_core::{Params, Router, RouterConfig, Segments};
///
/// let router = Router::from_config(&RouterConfig::default()).unwrap();
///
/// let mut ctx = router.request(Segments::new("https", "example.com", "/", "/users/profile"));
/// assert_eq!(ctx.current().key(), "controller");
///
/// assert_eq!(ctx.build(&Params::new()), "/");
/// assert_eq!(ctx.build(&Params::new().module("users").arg(123)), "/users/index/index/123");
/// ```
pub struct Router {
    table: RouteTable,
    slugs: SlugIndex,
    defaults: RouteDefaults,
    inflector: Box<dyn Inflector>,
    base_path: String,
    primary_locale: String,
    inherit_query: bool,
}

impl Router {
    /// Empty router: only the root route, no slugs
    ///
    /// The locale list in `config` decides the matcher family.
    pub fn new(config: &RouterConfig) -> Result<Self> {
        let locales = StaticLocales::new(config.locales.iter().cloned());
        Self::with_cascade(config, &locales)
    }

    /// Empty router whose matcher family comes from `cascade`
    ///
    /// Chosen once here and never re-evaluated.
    pub fn with_cascade(config: &RouterConfig, cascade: &dyn LocaleCascade) -> Result<Self> {
        config.validate()?;

        let family = if cascade.is_multi_locale() {
            MatcherFamily::Localized(LocaleSet::new(cascade.locales().iter().cloned()))
        } else {
            MatcherFamily::Plain
        };
        info!(
            localized = family.is_localized(),
            locales = ?cascade.locales(),
            "Matcher family selected"
        );

        Ok(Self {
            table: RouteTable::new(family),
            slugs: SlugIndex::new(),
            defaults: config.defaults.clone(),
            inflector: Box::new(RouteTokenInflector),
            base_path: normalize_base(&config.base_path),
            primary_locale: cascade
                .locales()
                .first()
                .cloned()
                .unwrap_or_else(|| "en".to_string()),
            inherit_query: config.inherit_query,
        })
    }

    /// Fully wired router: configured routes, then the standard cascade,
    /// then slugs
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let mut router = Self::new(config)?;
        for route in &config.routes {
            router.map(&route.key, &route.pattern)?;
        }
        router.map_standard_routes()?;
        for (key, slug) in &config.slugs {
            router.map_slug(key, slug.to_input())?;
        }
        Ok(router)
    }

    /// Replace the inflection service
    pub fn with_inflector(mut self, inflector: impl Inflector + 'static) -> Self {
        self.inflector = Box::new(inflector);
        self
    }

    /// Append a template; match order is registration order
    pub fn map(&mut self, key: &str, pattern: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::EmptyRouteKey);
        }
        self.table.insert(key, pattern)?;
        debug!(key, pattern, position = self.table.len(), "Route mapped");
        Ok(())
    }

    /// Register the standard cascade after any application routes
    pub fn map_standard_routes(&mut self) -> Result<()> {
        for (key, pattern) in STANDARD_ROUTES {
            self.map(key, pattern)?;
        }
        Ok(())
    }

    /// Register a slug
    ///
    /// Params are canonicalized now; a literal path is stored as-is.
    pub fn map_slug(&mut self, key: &str, target: impl Into<SlugInput>) -> Result<()> {
        let target = match target.into() {
            SlugInput::Params(params) => SlugTarget::Descriptor(self.defaults(&params)),
            SlugInput::Path(path) => SlugTarget::Path(path),
        };
        self.slugs.insert(key, target)?;
        debug!(key, "Slug mapped");
        Ok(())
    }

    /// Slug lookup; `None` means "not a slug"
    pub fn slug(&self, key: &str) -> Option<&SlugTarget> {
        self.slugs.get(key)
    }

    /// Canonicalize params without any request context
    pub fn defaults(&self, params: &Params) -> RouteDescriptor {
        self.defaults_with(params, None)
    }

    pub(crate) fn defaults_with(&self, params: &Params, inherited: Option<&Query>) -> RouteDescriptor {
        canonicalize(params, &self.defaults, self.inflector.as_ref(), inherited)
    }

    /// Resolve a path; never fails
    ///
    /// A path-implied locale is the primary locale here.
    pub fn match_route(&self, path: &str) -> MatchedRoute<'_> {
        self.match_with(path, &self.primary_locale)
    }

    pub(crate) fn match_with(&self, path: &str, implied_locale: &str) -> MatchedRoute<'_> {
        let m = self.table.match_path(path);
        if m.fallback {
            debug!(path, "No route matched, serving root");
        }
        let (locale, explicit_locale) = match m.locale {
            Some(locale) => (locale, true),
            None => (implied_locale.to_string(), false),
        };
        MatchedRoute {
            route: m.route,
            params: m.params,
            locale,
            explicit_locale,
            fallback: m.fallback,
        }
    }

    /// Decode and canonicalize a match into a descriptor
    ///
    /// The wildcard `args` capture is split into positional args; tokens
    /// outside the reserved set become query entries.
    pub fn descriptor_for(&self, matched: &MatchedRoute<'_>) -> RouteDescriptor {
        let mut params = Params::new();
        for (name, raw) in matched.params() {
            if name == ARGS {
                let args: Vec<String> = raw
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(decode)
                    .collect();
                params.insert(Key::Name(ARGS.to_string()), Value::List(args));
            } else if !raw.is_empty() {
                params.insert(Key::Name(name.clone()), decode(raw));
            }
        }
        self.defaults(&params)
    }

    /// Start a request with the primary locale as the implied locale
    pub fn request(&self, segments: Segments) -> RequestContext<'_> {
        RequestContext::new(self, segments, &self.primary_locale)
    }

    /// Start a request with the implied locale taken from `cascade`
    ///
    /// A locale this router does not know falls back to the primary one.
    pub fn request_in(&self, segments: Segments, cascade: &dyn LocaleCascade) -> RequestContext<'_> {
        let current = cascade.current_locale();
        if self.knows_locale(current) {
            RequestContext::new(self, segments, current)
        } else {
            debug!(locale = current, "Unknown locale, using primary");
            RequestContext::new(self, segments, &self.primary_locale)
        }
    }

    /// True for the primary locale and, in the localized family, any
    /// configured locale id
    pub fn knows_locale(&self, id: &str) -> bool {
        match self.table.family() {
            MatcherFamily::Localized(locales) => locales.contains(id),
            MatcherFamily::Plain => id == self.primary_locale,
        }
    }

    /// Build a URL from a canonical descriptor
    ///
    /// `base` is the request's mount point, `locale` an optional path
    /// prefix. In the localized family a module named like a locale is
    /// always prefixed, with the primary locale if need be, so the path
    /// matches back to the same module. Empty args are kept as empty
    /// segments and are dropped again when the URL is matched.
    pub(crate) fn assemble(&self, d: &RouteDescriptor, base: &str, locale: Option<&str>) -> String {
        if d.is_home(&self.defaults) {
            let mut url = mount_prefix(base, locale);
            url.push('/');
            return url;
        }

        let locale = match locale {
            None if self.is_localized() && self.knows_locale(&d.module) => {
                Some(self.primary_locale.as_str())
            }
            other => other,
        };
        let mut url = mount_prefix(base, locale);

        for part in [&d.module, &d.controller] {
            url.push('/');
            url.push_str(part);
        }
        // Default action is elided unless something follows it
        if d.action != self.defaults.action || !d.args.is_empty() || !d.ext.is_empty() {
            url.push('/');
            url.push_str(&d.action);
        }
        for arg in &d.args {
            url.push('/');
            url.push_str(&encode_arg(arg));
        }
        if !d.ext.is_empty() {
            url.push('.');
            url.push_str(&encode(&d.ext));
        }

        append_query(&mut url, &d.query, &d.fragment);
        url
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn slugs(&self) -> &SlugIndex {
        &self.slugs
    }

    pub(crate) fn inflector(&self) -> &dyn Inflector {
        self.inflector.as_ref()
    }

    /// Configured mount point, normalized
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn primary_locale(&self) -> &str {
        &self.primary_locale
    }

    pub fn is_localized(&self) -> bool {
        self.table.family().is_localized()
    }

    pub fn inherits_query(&self) -> bool {
        self.inherit_query
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("slugs", &self.slugs)
            .field("defaults", &self.defaults)
            .field("base_path", &self.base_path)
            .field("primary_locale", &self.primary_locale)
            .field("inherit_query", &self.inherit_query)
            .finish_non_exhaustive()
    }
}

/// `""`, `/app` or `/app/fr`: the part every built path starts with
pub(crate) fn mount_prefix(base: &str, locale: Option<&str>) -> String {
    let mut prefix = base.trim_end_matches('/').to_string();
    if let Some(locale) = locale {
        prefix.push('/');
        prefix.push_str(locale);
    }
    prefix
}

pub(crate) fn append_query(url: &mut String, query: &Query, fragment: &Fragment) {
    if !query.is_empty() {
        url.push('?');
        url.push_str(&encode_query(query));
    }
    match fragment {
        Fragment::None => {}
        Fragment::Text(text) => {
            url.push('#');
            url.push_str(&encode(text));
        }
        Fragment::Query(nested) => {
            url.push('#');
            url.push_str(&encode_query(nested));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::from_config(&RouterConfig::default()).unwrap()
    }

    fn build(router: &Router, params: Params) -> String {
        router.assemble(&router.defaults(&params), "/", None)
    }

    #[test]
    fn test_default_collapse() {
        let r = router();
        assert_eq!(build(&r, Params::new()), "/");
        assert_eq!(
            build(&r, Params::new().module("pages").controller("index").action("index")),
            "/"
        );
    }

    #[test]
    fn test_index_elision() {
        let r = router();
        assert_eq!(build(&r, Params::new().module("users")), "/users/index");
        assert_eq!(
            build(&r, Params::new().module("users").controller("profile")),
            "/users/profile"
        );
        assert_eq!(
            build(&r, Params::new().module("users").controller("profile").action("activity")),
            "/users/profile/activity"
        );
    }

    #[test]
    fn test_args_and_ext_force_action() {
        let r = router();
        assert_eq!(build(&r, Params::new().module("users").arg(123)), "/users/index/index/123");
        assert_eq!(build(&r, Params::new().module("users").ext("json")), "/users/index/index.json");
        assert_eq!(build(&r, Params::new().ext("xml")), "/pages/index/index.xml");
    }

    #[test]
    fn test_zero_arg_kept() {
        let r = router();
        assert_eq!(build(&r, Params::new().module("m").arg(0)), "/m/index/index/0");
        assert_eq!(build(&r, Params::new().module("m").arg("")), "/m/index/index/");
    }

    #[test]
    fn test_args_are_encoded() {
        let r = router();
        assert_eq!(
            build(&r, Params::new().module("files").arg("a b/c").arg("v1.2")),
            "/files/index/index/a%20b%2Fc/v1%2E2"
        );
    }

    #[test]
    fn test_query_and_fragment() {
        let r = router();
        assert_eq!(
            build(&r, Params::new().module("search").with("q", "rust lang").with("empty", "")),
            "/search/index?empty=&q=rust%20lang"
        );
        assert_eq!(
            build(&r, Params::new().module("docs").fragment("see also")),
            "/docs/index#see%20also"
        );

        let mut nested = Query::new();
        nested.insert("tab".to_string(), "2".to_string());
        assert_eq!(
            build(&r, Params::new().module("docs").fragment(nested)),
            "/docs/index#tab=2"
        );
    }

    #[test]
    fn test_query_alone_is_not_home() {
        let r = router();
        assert_eq!(build(&r, Params::new().with("page", 2)), "/pages/index?page=2");
    }

    #[test]
    fn test_mount_prefix() {
        let r = router();
        let d = r.defaults(&Params::new().module("users"));
        assert_eq!(r.assemble(&d, "/app/", None), "/app/users/index");
        assert_eq!(r.assemble(&d, "/app/", Some("fr")), "/app/fr/users/index");

        let home = r.defaults(&Params::new());
        assert_eq!(r.assemble(&home, "/app/", None), "/app/");
        assert_eq!(r.assemble(&home, "/", Some("fr")), "/fr/");
    }

    #[test]
    fn test_standard_cascade_order() {
        let r = router();
        let keys: Vec<&str> = r.table().iter().map(|route| route.key()).collect();
        assert_eq!(keys, vec!["args", "action.ext", "action", "controller", "module"]);
    }

    #[test]
    fn test_match_route() {
        let r = router();
        assert_eq!(r.match_route("/users").key(), "module");
        assert_eq!(r.match_route("/users/profile").key(), "controller");
        assert_eq!(r.match_route("/users/profile/edit").key(), "action.ext");
        assert_eq!(r.match_route("/users/index/index/123").key(), "args");

        let m = r.match_route("/users/profile/edit.json");
        assert_eq!(m.param("ext"), Some("json"));
        assert_eq!(m.locale(), "en");
        assert!(!m.is_locale_explicit());
    }

    #[test]
    fn test_fallback_to_root() {
        let r = router();
        let unknown = r.match_route("/totally/unknown/path/structure/x/y/z");
        let root = r.match_route("/");
        assert!(std::ptr::eq(unknown.route(), root.route()));
        assert!(unknown.is_fallback());
        assert!(unknown.is_root());
        assert!(!root.is_fallback());
    }

    #[test]
    fn test_round_trip() {
        let r = router();
        let cases = [
            Params::new(),
            Params::new().module("users"),
            Params::new().module("users").controller("profile"),
            Params::new().module("UserAdmin").controller("edit_profile").action("Save"),
            Params::new().module("users").arg(123).arg("a b"),
            Params::new().module("feed").action("latest").ext("rss"),
            Params::new().module("files").arg("v1.2").ext("tar"),
        ];
        for params in cases {
            let d = r.defaults(&params);
            let url = r.assemble(&d, "/", None);
            let back = r.descriptor_for(&r.match_route(&url));
            assert_eq!(back.module, d.module, "{url}");
            assert_eq!(back.controller, d.controller, "{url}");
            assert_eq!(back.action, d.action, "{url}");
            assert_eq!(back.args, d.args, "{url}");
            assert_eq!(back.ext, d.ext, "{url}");
        }
    }

    #[test]
    fn test_localized_round_trip() {
        let config = RouterConfig {
            locales: vec!["en".to_string(), "fr".to_string()],
            ..RouterConfig::default()
        };
        let r = Router::from_config(&config).unwrap();
        let cases = [
            (Params::new().module("fr").controller("news"), None, "/en/fr/news"),
            (Params::new().module("fr").controller("news"), Some("fr"), "/fr/fr/news"),
            (Params::new().module("en").action("list"), None, "/en/en/index/list"),
            (Params::new().module("users"), None, "/users/index"),
            (Params::new().module("users"), Some("fr"), "/fr/users/index"),
        ];
        for (params, locale, expected) in cases {
            let d = r.defaults(&params);
            let url = r.assemble(&d, "/", locale);
            assert_eq!(url, expected);

            let matched = r.match_route(&url);
            assert_eq!(matched.locale(), locale.unwrap_or("en"), "{url}");
            let back = r.descriptor_for(&matched);
            assert_eq!(back.module, d.module, "{url}");
            assert_eq!(back.controller, d.controller, "{url}");
            assert_eq!(back.action, d.action, "{url}");
        }
    }

    #[test]
    fn test_empty_arg_dropped_on_match() {
        let r = router();
        let d = r.defaults(&Params::new().module("m").arg("").arg("x"));
        assert_eq!(d.args, vec![String::new(), "x".to_string()]);

        let url = r.assemble(&d, "/", None);
        assert_eq!(url, "/m/index/index//x");
        let back = r.descriptor_for(&r.match_route(&url));
        assert_eq!(back.args, vec!["x".to_string()]);
    }

    #[test]
    fn test_request_in_unknown_locale() {
        let config = RouterConfig {
            locales: vec!["en".to_string(), "fr".to_string()],
            ..RouterConfig::default()
        };
        let r = Router::from_config(&config).unwrap();
        assert!(r.knows_locale("fr"));
        assert!(!r.knows_locale("de"));

        let cascade = crate::locale::StaticLocales::new(["de", "fr"]);
        let mut ctx = r.request_in(Segments::new("http", "h", "/", "/users"), &cascade);
        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.build(&Params::new().module("users")), "/users/index");

        let cascade = crate::locale::StaticLocales::new(["en", "fr"]).with_current("fr");
        let ctx = r.request_in(Segments::new("http", "h", "/", "/users"), &cascade);
        assert_eq!(ctx.locale(), "fr");

        assert!(router().knows_locale("en"));
        assert!(!router().knows_locale("fr"));
    }

    #[test]
    fn test_descriptor_for_custom_tokens() {
        let mut r = Router::new(&RouterConfig::default()).unwrap();
        r.map("blog", "/blog/{slug}/page-{n}").unwrap();
        let d = r.descriptor_for(&r.match_route("/blog/hello%20world/page-2"));
        assert_eq!(d.module, "pages");
        assert_eq!(d.query.get("slug").map(String::as_str), Some("hello world"));
        assert_eq!(d.query.get("n").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_map_errors() {
        let mut r = Router::new(&RouterConfig::default()).unwrap();
        assert!(matches!(r.map("", "/x"), Err(Error::EmptyRouteKey)));
        assert!(matches!(r.map("bad", "x"), Err(Error::Template(_))));
        assert!(matches!(r.map_slug("", "/x"), Err(Error::EmptySlugKey)));
        assert!(r.table().is_empty());
    }

    #[test]
    fn test_map_slug_canonicalizes() {
        let mut r = router();
        r.map_slug("view", Params::new().module("Pages").action("view").arg(123))
            .unwrap();
        r.map_slug("about", "/about-us").unwrap();

        match r.slug("view") {
            Some(SlugTarget::Descriptor(d)) => {
                assert_eq!(d.module, "pages");
                assert_eq!(d.controller, "index");
                assert_eq!(d.args, vec!["123".to_string()]);
            }
            other => panic!("unexpected slug: {other:?}"),
        }
        assert_eq!(r.slug("about"), Some(&SlugTarget::Path("/about-us".to_string())));
        assert_eq!(r.slug("missing"), None);
    }

    #[test]
    fn test_localized_family_selected_once() {
        let config = RouterConfig {
            locales: vec!["en".to_string(), "fr".to_string()],
            ..RouterConfig::default()
        };
        let r = Router::from_config(&config).unwrap();
        assert!(r.is_localized());
        assert_eq!(r.primary_locale(), "en");

        let m = r.match_route("/fr/users/profile");
        assert_eq!(m.key(), "controller");
        assert_eq!(m.locale(), "fr");
        assert!(m.is_locale_explicit());

        let m = r.match_route("/users/profile");
        assert_eq!(m.locale(), "en");
        assert!(!m.is_locale_explicit());

        assert!(!router().is_localized());
    }

    #[test]
    fn test_custom_inflector() {
        struct Upper;
        impl Inflector for Upper {
            fn to_route_token(&self, value: &str) -> String {
                value.to_uppercase()
            }
        }
        let r = Router::from_config(&RouterConfig::default())
            .unwrap()
            .with_inflector(Upper);
        assert_eq!(r.defaults(&Params::new().module("users")).module, "USERS");
    }
}
