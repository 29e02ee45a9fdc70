//! Route template matching.
//!
//! # Responsibilities
//! - Compile `/`-separated templates into literal and `{name}` segments
//! - Match a concrete request path against a compiled template
//! - Extract parameter bindings verbatim from the matched path
//!
//! # Design Decisions
//! - Segment counts must be equal (no wildcard or greedy tail)
//! - Literal segments compare case-sensitively, no normalization
//! - A parameter binds exactly one non-empty segment, unconstrained
//! - No regex: one pass over the segments

use std::collections::HashMap;
use std::fmt;

/// One `/`-separated piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// `{name}`: binds `name` to whatever the path holds at this position.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }
}

/// A route template compiled once at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a template such as `/api/media/{mediaId}/ratings`.
    pub fn parse(template: impl Into<String>) -> Self {
        let raw = template.into();
        let segments = raw.split('/').map(Segment::parse).collect();
        Self { raw, segments }
    }

    /// The template exactly as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template has no `{name}` segments.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Match `path` against this template, returning the parameter bindings.
    ///
    /// Returns `None` on a segment count mismatch, a differing literal, or an
    /// empty segment in a parameter position.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::default();
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        // Path longer than the template.
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Match a template string against a path without registering it.
///
/// Yields the same bindings dispatch would produce for the same inputs.
pub fn match_path(template: &str, path: &str) -> Option<PathParams> {
    PathTemplate::parse(template).match_path(path)
}

/// Parameter bindings extracted from a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    fn insert(&mut self, name: String, value: String) {
        self.values.insert(name, value);
    }

    /// The raw segment bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
