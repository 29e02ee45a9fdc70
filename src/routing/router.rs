//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Resolve (method, path) to a handler plus parameter bindings
//! - Return an explicit no-match rather than a default handler
//!
//! # Design Decisions
//! - Built once through [`RouteTableBuilder`], then frozen (lock-free reads)
//! - O(1) exact lookup for parameterless templates via HashMap
//! - O(n) pattern scan in registration order; first match wins
//! - Duplicate (method, template) pairs: first registration wins everywhere

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;

use super::matcher::{PathParams, PathTemplate};

/// A registered route: method, compiled template, handler.
pub struct Route<H> {
    method: Method,
    template: PathTemplate,
    handler: H,
}

impl<H> Route<H> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .finish_non_exhaustive()
    }
}

/// How a route was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Hit in the literal index; no parameter extraction was performed.
    Exact,
    /// Found by scanning templates in registration order.
    Pattern,
}

/// Result of a successful dispatch.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub params: PathParams,
    pub template: &'a str,
    pub kind: MatchKind,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{}:{}", method, path)
}

/// Collects routes during startup. Consumed by [`RouteTableBuilder::build`].
pub struct RouteTableBuilder<H> {
    routes: Vec<Route<H>>,
    exact: HashMap<String, usize>,
}

impl<H> RouteTableBuilder<H> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            exact: HashMap::new(),
        }
    }

    /// Register `handler` for `method` requests matching `template`.
    ///
    /// Re-registering a (method, template) pair is accepted but the earlier
    /// registration keeps precedence on both lookup paths.
    pub fn register(&mut self, method: Method, template: &str, handler: H) -> &mut Self {
        let template = PathTemplate::parse(template);

        let duplicate = self
            .routes
            .iter()
            .any(|r| r.method == method && r.template == template);
        if duplicate {
            tracing::warn!(
                method = %method,
                template = %template,
                "Duplicate route registration; earlier route keeps precedence"
            );
        }

        let index = self.routes.len();
        if template.is_literal() {
            self.exact
                .entry(route_key(&method, template.as_str()))
                .or_insert(index);
        }

        self.routes.push(Route {
            method,
            template,
            handler,
        });
        self
    }

    pub fn get(&mut self, template: &str, handler: H) -> &mut Self {
        self.register(Method::GET, template, handler)
    }

    pub fn post(&mut self, template: &str, handler: H) -> &mut Self {
        self.register(Method::POST, template, handler)
    }

    pub fn put(&mut self, template: &str, handler: H) -> &mut Self {
        self.register(Method::PUT, template, handler)
    }

    pub fn delete(&mut self, template: &str, handler: H) -> &mut Self {
        self.register(Method::DELETE, template, handler)
    }

    /// Freeze the routes into an immutable table.
    pub fn build(self) -> RouteTable<H> {
        RouteTable {
            routes: self.routes,
            exact: self.exact,
        }
    }
}

impl<H> Default for RouteTableBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable route table shared by all request tasks.
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
    exact: HashMap<String, usize>,
}

impl<H> RouteTable<H> {
    pub fn builder() -> RouteTableBuilder<H> {
        RouteTableBuilder::new()
    }

    /// Resolve a request to its handler.
    ///
    /// Tries the literal index first, then scans routes with the same method
    /// in registration order. Returns `None` when nothing matches.
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        if let Some(&index) = self.exact.get(&route_key(method, path)) {
            let route = &self.routes[index];
            return Some(RouteMatch {
                handler: &route.handler,
                params: PathParams::default(),
                template: route.template.as_str(),
                kind: MatchKind::Exact,
            });
        }

        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route.template.match_path(path).map(|params| RouteMatch {
                    handler: &route.handler,
                    params,
                    template: route.template.as_str(),
                    kind: MatchKind::Pattern,
                })
            })
    }

    /// All routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("exact", &self.exact.len())
            .finish()
    }
}
