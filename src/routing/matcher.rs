//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse `/payments/:id/pixQrCode` style patterns
//! - Match a pattern against decoded path segments
//! - Render upstream templates from captured parameters
//!
//! # Design Decisions
//! - Segment matching is case-sensitive
//! - `:name` captures exactly one non-empty segment
//! - No regex to guarantee O(n) matching

use std::collections::HashMap;

/// One segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

/// Parameters captured by a successful match.
pub type Captures = HashMap<String, String>;

impl PathPattern {
    /// Parse a pattern. Empty segments (double or trailing slashes) are ignored.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Names of the parameters this pattern captures.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match against path segments, returning captured parameters.
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> Option<Captures> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut captures = Captures::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            let actual = actual.as_ref();
            match segment {
                Segment::Literal(expected) if expected == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if actual.is_empty() => return None,
                Segment::Param(name) => {
                    captures.insert(name.clone(), actual.to_string());
                }
            }
        }
        Some(captures)
    }

    /// Render this pattern as a list of segments, substituting `captures`.
    ///
    /// Parameters missing from `captures` render as empty segments; config
    /// validation rejects templates that could produce them.
    pub fn render(&self, captures: &Captures) -> Vec<String> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(value) => value.clone(),
                Segment::Param(name) => captures.get(name).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/finance/balance");
        assert!(pattern.matches(&["finance", "balance"]).is_some());
        assert!(pattern.matches(&["finance"]).is_none());
        assert!(pattern.matches(&["Finance", "balance"]).is_none()); // Case sensitive
    }

    #[test]
    fn test_param_capture_and_render() {
        let pattern = PathPattern::parse("/payments/:id/pixQrCode");
        let captures = pattern.matches(&["payments", "pay_123", "pixQrCode"]).unwrap();
        assert_eq!(captures.get("id").map(String::as_str), Some("pay_123"));

        let template = PathPattern::parse("/payments/:id");
        assert_eq!(template.render(&captures), vec!["payments", "pay_123"]);
    }

    #[test]
    fn test_params_listing() {
        let pattern = PathPattern::parse("/accounts/:id/balance/:kind");
        assert_eq!(pattern.params().collect::<Vec<_>>(), vec!["id", "kind"]);
    }
}
