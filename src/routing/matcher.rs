//! Path matching logic.
//!
//! # Responsibilities
//! - Match upstream path segments against configured prefixes
//! - Combine prefixes with OR semantics
//!
//! # Design Decisions
//! - Matching is segment-wise: `home` matches `home/2` but not `homepage`
//! - Matching is case-sensitive
//! - No regex to guarantee O(n) matching

use crate::gateway::PathSegments;

/// Trait for matching forwarded paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, segments: &PathSegments) -> bool;
}

/// Matches a leading run of path segments.
#[derive(Debug, Clone)]
pub struct SegmentPrefixMatcher {
    prefix: Vec<String>,
}

impl SegmentPrefixMatcher {
    /// Create a matcher from a slash-separated prefix such as `"anime/detail"`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, segments: &PathSegments) -> bool {
        let segments = segments.as_slice();
        segments.len() >= self.prefix.len()
            && self.prefix.iter().zip(segments).all(|(p, s)| p == s)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, segments: &PathSegments) -> bool {
        self.matchers.iter().any(|m| m.matches(segments))
    }
}
