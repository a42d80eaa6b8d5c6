//! waypoint-router: Ordered path-template matcher
//!
//! Leaf crate used by waypoint-core. Compiles declarative path templates
//! and resolves a request path against an insertion-ordered route table.
//!
//! ## Features
//! - Whole-path matching, first registered template wins
//! - Tokens: `/{module}/{controller}`, composite segments like `/page-{n}`
//! - Optional trailing extension: `/{action}.{ext}`
//! - Trailing wildcard: `/files/{*path}` (one or more segments)
//! - Static root fallback, so a lookup never fails
//! - Locale-aware matcher variant that strips a known locale prefix
//!
//! ## Template Syntax
//! - `{name}` - Named token (captures within one segment)
//! - `.{name}` - Optional extension suffix on the final segment
//! - `{*name}` - Wildcard (captures the remaining segments, final segment only)
//! - `/` - Static root template
//!
//! ## Example
//! ```
//! use waypoint_router::{MatcherFamily, PathTemplate, RouteTable};
//!
//! let mut table = RouteTable::new(MatcherFamily::Plain);
//! table.insert("action", "/{module}/{controller}/{action}.{ext}").unwrap();
//! table.insert("module", "/{module}").unwrap();
//!
//! let m = table.match_path("/users/profile/edit.json");
//! assert_eq!(m.route.key(), "action");
//! assert_eq!(m.param("ext"), Some("json"));
//!
//! // Nothing structural matches: degrade to the root route
//! let m = table.match_path("/a/b");
//! assert!(m.route.is_root());
//! ```

mod matcher;
mod table;
mod template;

pub use matcher::{LocaleSet, MatchResult, Matcher, MatcherFamily};
pub use table::{Route, RouteMatch, RouteTable, ROOT_KEY};
pub use template::PathTemplate;

use thiserror::Error;

/// Captured token values as (name, raw value) pairs, in declaration order
pub type Captures = Vec<(String, String)>;

/// Template compilation errors
///
/// These are configuration errors: a template that fails to compile is
/// a wiring bug and is reported at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Empty pattern string
    #[error("Empty path template")]
    Empty,

    /// Pattern does not start with `/`
    #[error("Path template must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// `//` or a trailing extension with nothing before it
    #[error("Empty segment in path template: {0}")]
    EmptySegment(String),

    /// Unmatched `{` or `}`
    #[error("Unbalanced brace in path template: {0}")]
    UnbalancedBrace(String),

    /// `{}`
    #[error("Empty token name in path template: {0}")]
    EmptyToken(String),

    /// Token name with characters outside `[A-Za-z0-9_-]`
    #[error("Invalid token name '{name}' in path template: {pattern}")]
    InvalidToken { pattern: String, name: String },

    /// Same token declared twice
    #[error("Duplicate token '{name}' in path template: {pattern}")]
    DuplicateToken { pattern: String, name: String },

    /// `{a}{b}` - no literal text to split the two captures on
    #[error("Adjacent tokens without a separator in path template: {0}")]
    AdjacentTokens(String),

    /// `{*name}` anywhere but the final segment, or mixed with literals
    #[error("Wildcard must be the whole final segment in path template: {0}")]
    MisplacedWildcard(String),
}
