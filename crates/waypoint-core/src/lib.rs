//! waypoint-core: URL routing engine
//!
//! Turns request paths into canonical route descriptors and descriptors
//! back into URLs. Built on the ordered matcher in `waypoint-router`.
//!
//! ## Features
//! - Standard `module/controller/action` cascade with a root fallback
//! - Reverse building with default collapse and index elision
//! - Slugs: named shortcuts to a descriptor or a literal path
//! - Per-request build cache keyed by canonical descriptor
//! - Locale-aware matching and building when several locales are configured
//! - TOML configuration
//!
//! ## Example
//! ```
//! use waypoint_core::{Params, Router, RouterConfig, Segments};
//!
//! let config = RouterConfig::from_toml_str(r#"
//!     [slugs]
//!     view = { module = "pages", action = "view", args = ["123"] }
//! "#).unwrap();
//! let router = Router::from_config(&config).unwrap();
//!
//! let mut ctx = router.request(Segments::new("https", "example.com", "/", "/"));
//! assert_eq!(ctx.detect("view"), "/pages/index/view/123");
//! assert_eq!(ctx.build(&Params::new().module("users")), "/users/index");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod inflect;
pub mod locale;
pub mod params;
pub mod router;
pub mod segments;
pub mod slug;

// Re-exports
pub use cache::BuildCache;
pub use config::{RouteConfig, RouterConfig, SlugConfig, SlugDescriptor};
pub use context::{RequestContext, Target};
pub use descriptor::{Fragment, RouteDefaults, RouteDescriptor};
pub use error::{Error, Result};
pub use inflect::{Inflector, RouteTokenInflector};
pub use locale::{LocaleCascade, StaticLocales};
pub use params::{Key, Params, Query, Value};
pub use router::{MatchedRoute, Router, STANDARD_ROUTES};
pub use segments::Segments;
pub use slug::{SlugIndex, SlugInput, SlugTarget};

// Matcher re-exports
pub use waypoint_router::{
    LocaleSet, MatcherFamily, PathTemplate, Route, RouteTable, TemplateError, ROOT_KEY,
};
