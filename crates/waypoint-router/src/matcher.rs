//! Matcher strategies
//!
//! The strategy is chosen once per route table: plain templates, or
//! templates that also recognize a leading locale segment.

use crate::{Captures, PathTemplate};
use std::sync::Arc;

/// Known locale ids, shared by every localized matcher of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    ids: Arc<[String]>,
}

impl LocaleSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|l| l == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Split a leading locale segment off `path`
    ///
    /// Returns the locale and the remaining path (always starting with `/`).
    pub fn strip_prefix<'p>(&self, path: &'p str) -> Option<(&'p str, &'p str)> {
        let trimmed = path.trim_start_matches('/');
        let (first, rest) = match trimmed.find('/') {
            Some(i) => (&trimmed[..i], &trimmed[i..]),
            None => (trimmed, "/"),
        };
        self.contains(first).then_some((first, rest))
    }
}

/// Matcher family, resolved once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherFamily {
    Plain,
    Localized(LocaleSet),
}

impl MatcherFamily {
    /// Wrap a compiled template in this family's strategy
    pub fn matcher(&self, template: PathTemplate) -> Matcher {
        match self {
            MatcherFamily::Plain => Matcher::Plain(template),
            MatcherFamily::Localized(locales) => Matcher::Localized {
                template,
                locales: locales.clone(),
            },
        }
    }

    pub fn is_localized(&self) -> bool {
        matches!(self, MatcherFamily::Localized(_))
    }
}

/// Successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Raw captures in declaration order
    pub params: Captures,
    /// Locale taken from an explicit path prefix; `None` means implied
    pub locale: Option<String>,
}

/// A template plus its matching strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Plain(PathTemplate),
    Localized {
        template: PathTemplate,
        locales: LocaleSet,
    },
}

impl Matcher {
    pub fn template(&self) -> &PathTemplate {
        match self {
            Matcher::Plain(template) => template,
            Matcher::Localized { template, .. } => template,
        }
    }

    /// Test a candidate path
    ///
    /// The localized variant strips a known locale prefix and matches the
    /// rest. A path without a locale prefix is matched as-is and the result
    /// carries no explicit locale.
    pub fn test(&self, path: &str) -> Option<MatchResult> {
        match self {
            Matcher::Plain(template) => template.match_path(path).map(|params| MatchResult {
                params,
                locale: None,
            }),
            Matcher::Localized { template, locales } => {
                if let Some((locale, rest)) = locales.strip_prefix(path) {
                    return template.match_path(rest).map(|params| MatchResult {
                        params,
                        locale: Some(locale.to_string()),
                    });
                }
                template.match_path(path).map(|params| MatchResult {
                    params,
                    locale: None,
                })
            }
        }
    }

    /// Explicit locale prefix of `path`, if this matcher recognizes one
    pub fn locale_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        match self {
            Matcher::Plain(_) => None,
            Matcher::Localized { locales, .. } => locales.strip_prefix(path).map(|(l, _)| l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localized(pattern: &str) -> Matcher {
        MatcherFamily::Localized(LocaleSet::new(["en", "fr"]))
            .matcher(PathTemplate::compile(pattern).unwrap())
    }

    #[test]
    fn test_plain_matcher() {
        let m = MatcherFamily::Plain.matcher(PathTemplate::compile("/{module}").unwrap());
        let result = m.test("/users").unwrap();
        assert_eq!(result.params, vec![("module".to_string(), "users".to_string())]);
        assert_eq!(result.locale, None);
        assert!(m.test("/fr/users").is_none());
        assert_eq!(m.locale_prefix("/fr/users"), None);
    }

    #[test]
    fn test_localized_explicit_prefix() {
        let m = localized("/{module}");
        let result = m.test("/fr/users").unwrap();
        assert_eq!(result.params, vec![("module".to_string(), "users".to_string())]);
        assert_eq!(result.locale.as_deref(), Some("fr"));
    }

    #[test]
    fn test_localized_implied_locale() {
        let m = localized("/{module}");
        let result = m.test("/users").unwrap();
        assert_eq!(result.params, vec![("module".to_string(), "users".to_string())]);
        assert_eq!(result.locale, None);
    }

    #[test]
    fn test_localized_prefix_is_not_a_token() {
        let m = localized("/{module}");
        assert!(m.test("/fr").is_none());
    }

    #[test]
    fn test_localized_unknown_prefix_is_not_a_locale() {
        let m = localized("/{module}/{controller}");
        let result = m.test("/de/users").unwrap();
        assert_eq!(result.params[0], ("module".to_string(), "de".to_string()));
        assert_eq!(result.locale, None);
    }

    #[test]
    fn test_localized_root() {
        let m = MatcherFamily::Localized(LocaleSet::new(["en", "fr"])).matcher(PathTemplate::root());
        assert_eq!(m.test("/fr").unwrap().locale.as_deref(), Some("fr"));
        assert_eq!(m.test("/fr/").unwrap().locale.as_deref(), Some("fr"));
        assert_eq!(m.test("/").unwrap().locale, None);
        assert!(m.test("/users").is_none());
    }

    #[test]
    fn test_strip_prefix() {
        let locales = LocaleSet::new(["en", "fr"]);
        assert_eq!(locales.strip_prefix("/fr/users/x"), Some(("fr", "/users/x")));
        assert_eq!(locales.strip_prefix("/en"), Some(("en", "/")));
        assert_eq!(locales.strip_prefix("/users"), None);
        assert_eq!(locales.strip_prefix("/"), None);
        assert!(locales.contains("en"));
        assert_eq!(locales.ids().len(), 2);
    }
}
