//! Route table and request dispatch.

use axum::http::Method;

use crate::config::{FallbackPolicy, RouteConfig, RoutingConfig, UnmatchedPolicy};
use crate::routing::matcher::PathPattern;

/// What the server should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Service banner.
    Root,
    /// Liveness probe; never reaches upstream.
    Health,
    /// Webhook delivery, acknowledged locally.
    Webhook,
    /// Forward to upstream under these path segments.
    Forward { upstream: Vec<String> },
    /// Outside the prefix, echoed back.
    Echo,
    /// No route and no fallback.
    NotFound,
}

/// A compiled route table entry.
#[derive(Debug, Clone)]
struct Route {
    method: Method,
    pattern: PathPattern,
    upstream: PathPattern,
}

/// Immutable routing engine built from [`RoutingConfig`].
#[derive(Debug, Clone)]
pub struct Router {
    prefix: Vec<String>,
    routes: Vec<Route>,
    fallback: FallbackPolicy,
    unmatched: UnmatchedPolicy,
    webhook_enabled: bool,
}

impl Router {
    /// Compile the route table. Entries with unparseable methods are skipped;
    /// config validation reports them.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let routes = config.routes.iter().filter_map(compile).collect();

        Self {
            prefix: split_path(&config.prefix),
            routes,
            fallback: config.fallback,
            unmatched: config.unmatched,
            webhook_enabled: config.webhook_enabled,
        }
    }

    /// Decide how to handle `method` on the logical path `segments`.
    pub fn dispatch(&self, method: &Method, segments: &[String]) -> Dispatch {
        match segments {
            [] => return Dispatch::Root,
            [only] if only == "health" => return Dispatch::Health,
            _ => {}
        }

        let Some(rest) = self.strip_prefix(segments) else {
            return match self.unmatched {
                UnmatchedPolicy::Echo => Dispatch::Echo,
                UnmatchedPolicy::NotFound => Dispatch::NotFound,
            };
        };

        if self.webhook_enabled && method == Method::POST && rest == ["webhook"] {
            return Dispatch::Webhook;
        }

        for route in &self.routes {
            if route.method != method {
                continue;
            }
            if let Some(captures) = route.pattern.matches(rest) {
                return Dispatch::Forward {
                    upstream: route.upstream.render(&captures),
                };
            }
        }

        match self.fallback {
            FallbackPolicy::Passthrough => Dispatch::Forward {
                upstream: rest.to_vec(),
            },
            FallbackPolicy::NotFound => Dispatch::NotFound,
        }
    }

    fn strip_prefix<'a>(&self, segments: &'a [String]) -> Option<&'a [String]> {
        if segments.len() < self.prefix.len() {
            return None;
        }
        let (head, rest) = segments.split_at(self.prefix.len());
        (head == self.prefix.as_slice()).then_some(rest)
    }
}

fn compile(route: &RouteConfig) -> Option<Route> {
    let method = route.method.parse::<Method>().ok()?;
    Some(Route {
        method,
        pattern: PathPattern::parse(&route.pattern),
        upstream: PathPattern::parse(&route.upstream),
    })
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
