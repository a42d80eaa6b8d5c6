//! Decomposed snapshot of the current request URL

use crate::encoding::{decode, encode, encode_query, parse_query};
use crate::params::Query;

/// Current request URL split into parts
///
/// Built once per request and read-only afterwards. `path` is relative to
/// `base_path`, always starts with `/`, and is left percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    scheme: String,
    host: String,
    base_path: String,
    path: String,
    query: Query,
    fragment: String,
}

impl Segments {
    /// Decompose a request target (`/path?query#fragment`)
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        base_path: &str,
        target: &str,
    ) -> Self {
        let (rest, fragment) = match target.split_once('#') {
            Some((rest, fragment)) => (rest, decode(fragment)),
            None => (target, String::new()),
        };
        let (raw_path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (rest, Query::new()),
        };

        let base_path = normalize_base(base_path);
        let path = strip_base(raw_path, &base_path);

        Self {
            scheme: scheme.into(),
            host: host.into(),
            base_path,
            path,
            query,
            fragment,
        }
    }

    /// Decompose an `http::Uri`; missing scheme or authority default to
    /// `http` and `localhost`
    pub fn from_uri(uri: &http::Uri, base_path: &str) -> Self {
        let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
        Self::new(
            uri.scheme_str().unwrap_or("http"),
            uri.authority().map_or("localhost", |a| a.as_str()),
            base_path,
            target,
        )
    }

    /// Decompose an `http::Request`; the `Host` header wins over the URI
    /// authority
    pub fn from_request<B>(req: &http::Request<B>, base_path: &str) -> Self {
        let mut segments = Self::from_uri(req.uri(), base_path);
        if let Some(host) = req
            .headers()
            .get(http::header::HOST)
            .and_then(|h| h.to_str().ok())
        {
            segments.host = host.to_string();
        }
        segments
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Mount point, normalized with leading and trailing `/`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// String-keyed access: `scheme`, `host`, `base`, `path`, `fragment`
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "scheme" => Some(&self.scheme),
            "host" => Some(&self.host),
            "base" => Some(&self.base_path),
            "path" => Some(&self.path),
            "fragment" => Some(&self.fragment),
            _ => None,
        }
    }

    /// Reassemble the absolute URL
    pub fn url(&self) -> String {
        let mut url = format!(
            "{}://{}{}{}",
            self.scheme,
            self.host,
            self.base_path.trim_end_matches('/'),
            self.path
        );
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&self.query));
        }
        if !self.fragment.is_empty() {
            url.push('#');
            url.push_str(&encode(&self.fragment));
        }
        url
    }
}

impl Default for Segments {
    fn default() -> Self {
        Self::new("http", "localhost", "/", "/")
    }
}

/// Normalize a mount point to `/` or `/a/b/`
pub fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

fn strip_base(raw_path: &str, base: &str) -> String {
    let mount = base.trim_end_matches('/');
    let relative = if mount.is_empty() {
        raw_path
    } else if raw_path == mount {
        ""
    } else {
        raw_path
            .strip_prefix(mount)
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(raw_path)
    };

    if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("/{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_target() {
        let s = Segments::new("https", "example.com", "/", "/users/profile?tab=posts&q=a+b#top");
        assert_eq!(s.scheme(), "https");
        assert_eq!(s.host(), "example.com");
        assert_eq!(s.base_path(), "/");
        assert_eq!(s.path(), "/users/profile");
        assert_eq!(s.query_param("tab"), Some("posts"));
        assert_eq!(s.query_param("q"), Some("a b"));
        assert_eq!(s.fragment(), "top");
    }

    #[test]
    fn test_base_path_stripped() {
        let s = Segments::new("http", "h", "app", "/app/users");
        assert_eq!(s.base_path(), "/app/");
        assert_eq!(s.path(), "/users");

        let s = Segments::new("http", "h", "/app/", "/app");
        assert_eq!(s.path(), "/");

        // Not under the mount point: kept as-is
        let s = Segments::new("http", "h", "/app", "/application/x");
        assert_eq!(s.path(), "/application/x");
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base(""), "/");
        assert_eq!(normalize_base("/"), "/");
        assert_eq!(normalize_base("app"), "/app/");
        assert_eq!(normalize_base("/a/b/"), "/a/b/");
    }

    #[test]
    fn test_get() {
        let s = Segments::new("http", "h", "/app", "/app/x#f");
        assert_eq!(s.get("scheme"), Some("http"));
        assert_eq!(s.get("base"), Some("/app/"));
        assert_eq!(s.get("path"), Some("/x"));
        assert_eq!(s.get("fragment"), Some("f"));
        assert_eq!(s.get("query"), None);
    }

    #[test]
    fn test_url() {
        let s = Segments::new("https", "example.com", "/app", "/app/users?b=2&a=1#top");
        assert_eq!(s.url(), "https://example.com/app/users?a=1&b=2#top");
        assert_eq!(Segments::default().url(), "http://localhost/");
    }

    #[test]
    fn test_from_request() {
        let req = http::Request::builder()
            .uri("/app/users?page=2")
            .header("Host", "example.org")
            .body(())
            .unwrap();
        let s = Segments::from_request(&req, "/app");
        assert_eq!(s.scheme(), "http");
        assert_eq!(s.host(), "example.org");
        assert_eq!(s.path(), "/users");
        assert_eq!(s.query_param("page"), Some("2"));

        let uri: http::Uri = "https://example.net/x".parse().unwrap();
        let s = Segments::from_uri(&uri, "/");
        assert_eq!(s.scheme(), "https");
        assert_eq!(s.host(), "example.net");
        assert_eq!(s.path(), "/x");
    }
}
