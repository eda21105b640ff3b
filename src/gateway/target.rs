//! Upstream URL construction.
//!
//! The configured base is normalized to end with exactly one `/`, and the
//! inbound path segments are appended joined by `/`. Segments are taken as
//! they arrived (still percent-encoded) and are never decoded or re-encoded.
//!
//! The `url` parser would otherwise rewrite some paths (`\` read as `/`,
//! dot segments resolved, unsafe bytes escaped). A resolved URL whose path
//! differs from the joined segments is refused, so what `routing::PathPolicy`
//! checked is exactly what goes upstream.

use std::fmt;

use url::Url;

use crate::gateway::error::GatewayError;

/// Non-empty, ordered list of path segments captured by the catch-all route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments(Vec<String>);

impl PathSegments {
    /// Split a raw path tail (e.g. `home/page/2`) into segments.
    ///
    /// Empty segments from doubled or trailing slashes are dropped.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        Self::new(raw.split('/'))
    }

    /// Build from individual segments.
    pub fn new<I, S>(segments: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            if segment.contains(['/', '\\', '?', '#']) {
                return Err(GatewayError::InvalidTarget(format!(
                    "segment {segment:?} contains a reserved character"
                )));
            }
            out.push(segment.to_string());
        }

        if out.is_empty() {
            return Err(GatewayError::InvalidTarget("empty path".to_string()));
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments joined with `/`, no leading or trailing separator.
    pub fn joined(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for PathSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Ensure `base` ends with exactly one `/`.
pub fn normalize_base(base: &str) -> String {
    format!("{}/", base.trim().trim_end_matches('/'))
}

/// Normalized upstream base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    base: Url,
}

impl UpstreamTarget {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        if base_url.trim().is_empty() {
            return Err(GatewayError::Config(
                "upstream base URL is not set".to_string(),
            ));
        }

        let normalized = normalize_base(base_url);
        let base = Url::parse(&normalized)
            .map_err(|e| GatewayError::Config(format!("invalid upstream base URL: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") || !base.has_host() {
            return Err(GatewayError::Config(format!(
                "upstream base URL must be http(s) with a host: {normalized}"
            )));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(GatewayError::Config(
                "upstream base URL must not carry a query or fragment".to_string(),
            ));
        }

        Ok(Self { base })
    }

    /// The normalized base, always ending in `/`.
    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// Full upstream URL for the given segments and raw query string.
    pub fn resolve(
        &self,
        segments: &PathSegments,
        query: Option<&str>,
    ) -> Result<Url, GatewayError> {
        let mut target = format!("{}{}", self.base.as_str(), segments.joined());
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }

        let url = Url::parse(&target).map_err(|e| GatewayError::InvalidTarget(e.to_string()))?;

        let expected = format!("{}{}", self.base.path(), segments.joined());
        if url.path() != expected {
            return Err(GatewayError::PathNotAllowed(format!(
                "{segments} resolves to {}",
                url.path()
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(raw: &str) -> PathSegments {
        PathSegments::parse(raw).unwrap()
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base("https://a.example/v1"), "https://a.example/v1/");
        assert_eq!(normalize_base("https://a.example/v1/"), "https://a.example/v1/");
        assert_eq!(normalize_base("https://a.example/v1///"), "https://a.example/v1/");
        assert_eq!(normalize_base("https://a.example"), "https://a.example/");
    }

    #[test]
    fn test_trailing_separator_does_not_change_target() {
        let paths = [
            "home",
            "home/page/2",
            "anime/solo-leveling-episode-1",
            "search/naruto%20shippuden",
            "genres/action",
        ];
        let bases = [
            ("https://upstream.example/v1", "https://upstream.example/v1/"),
            ("https://upstream.example", "https://upstream.example/"),
            ("http://127.0.0.1:9000/api/v2", "http://127.0.0.1:9000/api/v2//"),
        ];

        for (bare, slashed) in bases {
            let a = UpstreamTarget::new(bare).unwrap();
            let b = UpstreamTarget::new(slashed).unwrap();
            assert_eq!(a, b);
            for path in paths {
                let url_a = a.resolve(&segs(path), None).unwrap();
                let url_b = b.resolve(&segs(path), None).unwrap();
                assert_eq!(url_a, url_b);
                assert!(url_a.as_str().ends_with(path));
                assert!(!url_a.path().contains("//"), "doubled separator in {url_a}");
            }
        }
    }

    #[test]
    fn test_resolve_with_query() {
        let target = UpstreamTarget::new("https://upstream.example/v1/").unwrap();
        let url = target.resolve(&segs("home"), Some("page=2")).unwrap();
        assert_eq!(url.as_str(), "https://upstream.example/v1/home?page=2");

        let url = target.resolve(&segs("home"), Some("")).unwrap();
        assert_eq!(url.as_str(), "https://upstream.example/v1/home");
    }

    #[test]
    fn test_segments_keep_encoding() {
        let target = UpstreamTarget::new("https://upstream.example/v1").unwrap();
        let url = target
            .resolve(&segs("search/one%2Fpiece"), None)
            .unwrap();
        assert_eq!(url.as_str(), "https://upstream.example/v1/search/one%2Fpiece");
    }

    #[test]
    fn test_segments_parse() {
        assert_eq!(segs("/home//page/2/").as_slice(), ["home", "page", "2"]);
        assert!(PathSegments::parse("").is_err());
        assert!(PathSegments::parse("///").is_err());
        assert!(PathSegments::new(["a", "b?c"]).is_err());
        assert!(PathSegments::new(["home", "..\\admin"]).is_err());
        assert!(PathSegments::parse("home/a\\b").is_err());
        assert_eq!(PathSegments::new(["a", "", "b"]).unwrap().joined(), "a/b");
    }

    #[test]
    fn test_resolve_never_rewrites_path() {
        let target = UpstreamTarget::new("http://u.example/v1").unwrap();
        for raw in [
            "home/../admin",
            "home/%2e%2e/admin",
            "home/%2E./admin",
            "./home",
            "search/\"quoted\"",
        ] {
            let segments = PathSegments::new(raw.split('/')).unwrap();
            assert!(
                matches!(
                    target.resolve(&segments, None),
                    Err(GatewayError::PathNotAllowed(_))
                ),
                "{raw} was rewritten instead of refused"
            );
        }

        let url = target.resolve(&segs("home/..hidden/x.y"), None).unwrap();
        assert_eq!(url.path(), "/v1/home/..hidden/x.y");
    }

    #[test]
    fn test_query_follows_url_encoding_rules() {
        let target = UpstreamTarget::new("http://u.example/v1").unwrap();
        let url = target
            .resolve(&segs("search"), Some("q=don't&page=2&order=desc"))
            .unwrap();
        assert_eq!(url.query(), Some("q=don%27t&page=2&order=desc"));

        let url = target
            .resolve(&segs("search"), Some("q=one%20piece"))
            .unwrap();
        assert_eq!(url.as_str(), "http://u.example/v1/search?q=one%20piece");
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(matches!(
            UpstreamTarget::new(""),
            Err(GatewayError::Config(_))
        ));
        assert!(UpstreamTarget::new("not a url").is_err());
        assert!(UpstreamTarget::new("mailto:someone@example.com").is_err());
        assert!(UpstreamTarget::new("https://upstream.example/v1?x=1").is_err());
    }
}
