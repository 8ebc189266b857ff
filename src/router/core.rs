//! Router core: route records, table construction and the dispatch hot path.

use anyhow::Context;
use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::derive::{derive_template, extract_method};
use super::order::order_routes;
use super::pattern::{PatternMatch, RoutePattern};
use crate::config::RouterConfig;
use crate::discovery::{Discovery, HandlerDefinition};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for the dispatch path.
///
/// Names are `Arc<str>` so path parameter names are shared with the compiled
/// route instead of copied per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Dispatch slower than this is logged at `warn`.
const SLOW_MATCH: Duration = Duration::from_millis(1);

/// Methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    /// Every method. Routes without a method token in their template.
    Any,
    /// Exactly one method, bound by a `.get`/`.post`/... token.
    Only(Method),
}

impl MethodSet {
    #[inline]
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(m) => m == method,
        }
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => write!(f, "ANY"),
            MethodSet::Only(m) => write!(f, "{m}"),
        }
    }
}

/// One compiled entry of the route table.
///
/// Built once from a [`HandlerDefinition`] and never changed afterwards.
#[derive(Debug)]
pub struct Route<H> {
    path: String,
    methods: MethodSet,
    pattern: RoutePattern,
    priority: Option<f64>,
    comment: Option<String>,
    source: Option<PathBuf>,
    handler: H,
}

impl<H> Route<H> {
    /// Build a route from a definition.
    ///
    /// The definition's explicit `path` wins over `default_template`. The
    /// method token is stripped before the template is compiled, so the
    /// stored [`path`](Route::path) and the pattern both describe the
    /// residual template.
    ///
    /// # Errors
    ///
    /// Fails if the template cannot be compiled into a regex.
    pub fn new(default_template: &str, definition: HandlerDefinition<H>) -> anyhow::Result<Self> {
        let HandlerDefinition {
            path,
            priority,
            comment,
            handler,
        } = definition;

        let template = path.as_deref().unwrap_or(default_template);
        let (path, methods) = extract_method(template);
        let pattern = RoutePattern::compile(&path)
            .with_context(|| format!("failed to compile route template '{path}'"))?;

        Ok(Self {
            path,
            methods,
            pattern,
            priority,
            comment,
            source: None,
            handler,
        })
    }

    /// Record the handler unit this route was loaded from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Residual template (method token removed, `index` not folded).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    #[must_use]
    pub fn is_index(&self) -> bool {
        self.pattern.is_index()
    }

    /// The explicitly declared priority, if any.
    #[must_use]
    pub fn priority(&self) -> Option<f64> {
        self.priority
    }

    /// Priority used for ordering: the declared value, else `-1` for index
    /// routes and `0` for everything else.
    #[must_use]
    pub fn effective_priority(&self) -> f64 {
        match self.priority {
            Some(p) => p,
            None if self.is_index() => -1.0,
            None => 0.0,
        }
    }

    /// Opaque documentation attached to the handler unit.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Result of a successful dispatch.
#[derive(Debug)]
pub struct RouteMatch<H> {
    /// The selected route.
    pub route: Arc<Route<H>>,
    /// Path parameters (e.g. `/users/:id` → `[("id", "42")]`).
    pub params: ParamVec,
    /// Decoded query pairs, all of them, in request order.
    pub query: ParamVec,
}

impl<H> Clone for RouteMatch<H> {
    fn clone(&self) -> Self {
        Self {
            route: Arc::clone(&self.route),
            params: self.params.clone(),
            query: self.query.clone(),
        }
    }
}

impl<H> RouteMatch<H> {
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        self.route.handler()
    }

    /// Get a path parameter by name.
    ///
    /// A template may repeat a name (`/:id/x/:id`); the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. For `?tag=a&tag=b` this returns `b`.
    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value given for a query key, in request order.
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Anything that carries a method and a request target.
pub trait RouteRequest {
    fn request_method(&self) -> &Method;
    /// Path plus optional `?query`.
    fn request_url(&self) -> &str;
}

impl<B> RouteRequest for http::Request<B> {
    fn request_method(&self) -> &Method {
        http::Request::method(self)
    }

    fn request_url(&self) -> &str {
        self.uri()
            .path_and_query()
            .map_or_else(|| self.uri().path(), |pq| pq.as_str())
    }
}

impl RouteRequest for (Method, &str) {
    fn request_method(&self) -> &Method {
        &self.0
    }

    fn request_url(&self) -> &str {
        self.1
    }
}

impl RouteRequest for (Method, String) {
    fn request_method(&self) -> &Method {
        &self.0
    }

    fn request_url(&self) -> &str {
        &self.1
    }
}

/// The ordered, read-only route table.
///
/// Cloning is cheap and shares the routes. Dispatch takes `&self`, so one
/// router can serve any number of threads.
pub struct Router<H> {
    routes: Vec<Arc<Route<H>>>,
}

impl<H> Clone for Router<H> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.iter().map(Arc::clone).collect(),
        }
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.path_templates())
            .finish()
    }
}

impl<H> Router<H> {
    /// Build the route table for a directory tree.
    ///
    /// Candidates are enumerated by `discovery`, passed through `config`'s
    /// filters, loaded, derived, compiled and finally ordered. Any failure is
    /// returned immediately; nothing is deferred to request time.
    ///
    /// # Errors
    ///
    /// Propagates discovery failures (unreadable root), load failures
    /// (malformed handler unit) and template compilation failures, each with
    /// the offending path in its context.
    pub fn build<D>(root: impl AsRef<Path>, config: &RouterConfig, discovery: &D) -> anyhow::Result<Self>
    where
        D: Discovery<Handler = H> + ?Sized,
    {
        let root = root.as_ref();
        let candidates = discovery
            .candidates(root)
            .with_context(|| format!("failed to discover handler units under {}", root.display()))?;

        let mut routes = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !config.accepts(root, &candidate) {
                debug!(candidate = %candidate.display(), "Handler unit filtered out");
                continue;
            }

            let definition = discovery
                .load(root, &candidate)
                .with_context(|| format!("failed to load handler unit {}", candidate.display()))?;
            let template = derive_template(root, &candidate);
            let route = Route::new(&template, definition)
                .with_context(|| format!("invalid route in {}", candidate.display()))?
                .with_source(&candidate);

            debug!(
                source = %candidate.display(),
                path = %route.path(),
                methods = %route.methods(),
                is_index = route.is_index(),
                priority = route.effective_priority(),
                "Route derived"
            );
            routes.push(route);
        }

        Ok(Self::from_routes(routes))
    }

    /// Order pre-built routes into a table.
    ///
    /// The input order is the discovery order used as the final tie-breaker.
    #[must_use]
    pub fn from_routes(mut routes: Vec<Route<H>>) -> Self {
        order_routes(&mut routes);
        let routes: Vec<Arc<Route<H>>> = routes.into_iter().map(Arc::new).collect();

        if routes.is_empty() {
            info!(routes_count = 0, "Routing table loaded with no routes");
        } else {
            let routes_summary: Vec<String> = routes
                .iter()
                .take(10)
                .map(|r| format!("{} {}", r.methods(), r.path()))
                .collect();
            info!(
                routes_count = routes.len(),
                routes_summary = ?routes_summary,
                "Routing table loaded"
            );
        }

        Self { routes }
    }

    /// Routes in evaluation order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<Route<H>>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `METHOD template` for every route, in evaluation order.
    #[must_use]
    pub fn path_templates(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| format!("{} {}", r.methods(), r.path()))
            .collect()
    }

    /// Log the full table at `info`, one event per route.
    pub fn dump_routes(&self) {
        info!(count = self.routes.len(), "Route table");
        for (position, route) in self.routes.iter().enumerate() {
            info!(
                position,
                methods = %route.methods(),
                path = %route.path(),
                priority = route.effective_priority(),
                is_index = route.is_index(),
                source = ?route.source(),
                "Route"
            );
        }
    }

    /// Find the first route whose pattern matches `url` and whose method set
    /// accepts `method`.
    ///
    /// Routes that match the URL but not the method are skipped. `None` means
    /// no route applies, which callers usually turn into a 404.
    #[must_use]
    pub fn route(&self, method: &Method, url: &str) -> Option<RouteMatch<H>> {
        debug!(method = %method, url = %url, "Route match attempt");
        let match_start = Instant::now();

        for route in &self.routes {
            let Some(PatternMatch { params, query }) = route.pattern.matches(url) else {
                continue;
            };
            if !route.methods.accepts(method) {
                debug!(
                    method = %method,
                    url = %url,
                    route_path = %route.path,
                    route_methods = %route.methods,
                    "Route pattern matched but method rejected"
                );
                continue;
            }

            let match_duration = match_start.elapsed();
            if match_duration > SLOW_MATCH {
                warn!(
                    method = %method,
                    url = %url,
                    route_path = %route.path,
                    path_params = ?params,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    method = %method,
                    url = %url,
                    route_path = %route.path,
                    path_params = ?params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }

            return Some(RouteMatch {
                route: Arc::clone(route),
                params,
                query,
            });
        }

        warn!(
            method = %method,
            url = %url,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        None
    }

    /// [`route`](Router::route) for any [`RouteRequest`].
    #[must_use]
    pub fn dispatch<R>(&self, request: &R) -> Option<RouteMatch<H>>
    where
        R: RouteRequest + ?Sized,
    {
        self.route(request.request_method(), request.request_url())
    }
}
