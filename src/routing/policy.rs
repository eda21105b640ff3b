//! Path allow-list.
//!
//! # Responsibilities
//! - Decide whether a forwarded path may reach the upstream
//! - Reject dot segments when an allow-list is active
//!
//! # Design Decisions
//! - No allow-list configured = every path is forwarded untouched
//! - Built once from config, immutable afterwards (swapped on reload)

use crate::config::RouteConfig;
use crate::gateway::{GatewayError, PathSegments};
use crate::routing::matcher::{AnyMatcher, Matcher, SegmentPrefixMatcher};

/// Which upstream paths the gateway exposes.
#[derive(Debug, Default)]
pub struct PathPolicy {
    allow: Option<AnyMatcher>,
}

impl PathPolicy {
    /// Forward every path as-is.
    pub fn allow_all() -> Self {
        Self { allow: None }
    }

    /// Only forward paths under one of `prefixes`.
    pub fn allow_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers: Vec<Box<dyn Matcher>> = prefixes
            .into_iter()
            .map(|p| Box::new(SegmentPrefixMatcher::new(p.as_ref())) as Box<dyn Matcher>)
            .collect();

        if matchers.is_empty() {
            return Self::allow_all();
        }
        Self {
            allow: Some(AnyMatcher::new(matchers)),
        }
    }

    pub fn from_config(route: &RouteConfig) -> Self {
        Self::allow_prefixes(&route.allowed_prefixes)
    }

    pub fn is_restricted(&self) -> bool {
        self.allow.is_some()
    }

    pub fn check(&self, segments: &PathSegments) -> Result<(), GatewayError> {
        let Some(allow) = &self.allow else {
            return Ok(());
        };

        if segments.as_slice().iter().any(|s| is_dot_segment(s)) {
            return Err(GatewayError::PathNotAllowed(segments.joined()));
        }
        if !allow.matches(segments) {
            return Err(GatewayError::PathNotAllowed(segments.joined()));
        }
        Ok(())
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(raw: &str) -> PathSegments {
        PathSegments::parse(raw).unwrap()
    }

    #[test]
    fn test_allow_all_forwards_everything() {
        let policy = PathPolicy::allow_all();
        assert!(!policy.is_restricted());
        assert!(policy.check(&segs("anything/../goes")).is_ok());
    }

    #[test]
    fn test_empty_prefix_list_is_unrestricted() {
        let policy = PathPolicy::from_config(&RouteConfig::default());
        assert!(!policy.is_restricted());
    }

    #[test]
    fn test_allow_list() {
        let policy = PathPolicy::allow_prefixes(["home", "ongoing", "search"]);
        assert!(policy.check(&segs("home")).is_ok());
        assert!(policy.check(&segs("search/naruto")).is_ok());
        assert!(matches!(
            policy.check(&segs("admin/users")),
            Err(GatewayError::PathNotAllowed(_))
        ));
    }

    #[test]
    fn test_allow_list_rejects_traversal() {
        let policy = PathPolicy::allow_prefixes(["home"]);
        assert!(policy.check(&segs("home/../admin")).is_err());
        assert!(policy.check(&segs("home/%2E%2E/admin")).is_err());
        assert!(policy.check(&segs("home/./x")).is_err());
    }
}
