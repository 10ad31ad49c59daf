//! The route table.
//!
//! Routes are tried in registration order. The first route whose pattern
//! matches the whole path and whose method set contains the request method
//! wins, so a catch-all registered early shadows anything registered after it.
//!
//! A [`Router`] is populated before serving starts and only read afterwards.
//! [`RouterBuilder`] makes that ordering explicit:
//!
//! ```
//! use dispatch_web::handler_fn;
//! use dispatch_web::router::{Router, get, post};
//!
//! let router = Router::builder()
//!     .route("/users/<int:id>", get(handler_fn(|conn| conn.write("user").unwrap())))
//!     .route("/users", post(handler_fn(|conn| conn.write("created").unwrap())))
//!     .build()
//!     .unwrap();
//! assert_eq!(router.len(), 2);
//! ```

use std::sync::Arc;

use dispatch_http::handler::{DefaultErrorHandler, ErrorHandler};
use dispatch_http::protocol::{HttpMethod, MethodSet};
use thiserror::Error;
use tracing::trace;

use crate::handler::RequestHandler;
use crate::pattern::{PatternError, RoutePattern};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
}

/// A registered route
pub struct Route {
    pattern: RoutePattern,
    methods: MethodSet,
    handler: Box<dyn RequestHandler>,
}

impl Route {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.source())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Result of looking up a path and method
pub enum RouteMatch<'router, 'req> {
    Found { handler: &'router dyn RequestHandler, params: Vec<(&'router str, &'req str)> },
    NotFound,
}

impl RouteMatch<'_, '_> {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, RouteMatch::Found { .. })
    }
}

pub struct Router {
    routes: Vec<Route>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Default for Router {
    fn default() -> Self {
        Self { routes: Vec::new(), error_handler: Arc::new(DefaultErrorHandler) }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish_non_exhaustive()
    }
}

impl Router {
    /// Creates an empty router using [`DefaultErrorHandler`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Registers a route after the existing ones.
    ///
    /// A pattern that does not compile is rejected and the table is left unchanged.
    pub fn add(
        &mut self,
        pattern: &str,
        methods: impl Into<MethodSet>,
        handler: impl RequestHandler + 'static,
    ) -> Result<(), RouteError> {
        self.insert(pattern, methods.into(), Box::new(handler))
    }

    fn insert(&mut self, pattern: &str, methods: MethodSet, handler: Box<dyn RequestHandler>) -> Result<(), RouteError> {
        let compiled = RoutePattern::compile(pattern)
            .map_err(|source| RouteError::InvalidPattern { pattern: pattern.to_owned(), source })?;
        trace!(pattern, regex = %compiled.as_regex(), methods = %methods, "add route");
        self.routes.push(Route { pattern: compiled, methods, handler });
        Ok(())
    }

    /// Finds the first route matching `path` and `method`
    pub fn at<'router, 'req>(&'router self, path: &'req str, method: HttpMethod) -> RouteMatch<'router, 'req> {
        self.routes
            .iter()
            .filter(|route| route.methods.contains(method))
            .find_map(|route| {
                route.pattern.matches(path).map(|params| RouteMatch::Found { handler: route.handler(), params })
            })
            .unwrap_or(RouteMatch::NotFound)
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    pub fn set_error_handler(&mut self, error_handler: impl ErrorHandler + 'static) {
        self.error_handler = Arc::new(error_handler);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects routes and the error handler, then compiles them all at once.
#[derive(Default)]
pub struct RouterBuilder {
    items: Vec<(String, RouteItem)>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, item: RouteItem) -> Self {
        self.items.push((pattern.into(), item));
        self
    }

    #[must_use]
    pub fn error_handler(mut self, error_handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(error_handler));
        self
    }

    /// Builds the router, failing on the first pattern that does not compile
    pub fn build(self) -> Result<Router, RouteError> {
        let mut router = Router::new();
        if let Some(error_handler) = self.error_handler {
            router.error_handler = error_handler;
        }
        for (pattern, item) in self.items {
            router.insert(&pattern, item.methods, item.handler)?;
        }
        Ok(router)
    }
}

/// A handler paired with the methods it answers
pub struct RouteItem {
    methods: MethodSet,
    handler: Box<dyn RequestHandler>,
}

impl RouteItem {
    /// Also answers `method`
    #[must_use]
    pub fn and(mut self, method: HttpMethod) -> Self {
        self.methods.insert(method);
        self
    }
}

/// Answers every method in `methods`
pub fn on<H: RequestHandler + 'static>(methods: impl Into<MethodSet>, handler: H) -> RouteItem {
    RouteItem { methods: methods.into(), handler: Box::new(handler) }
}

/// Answers any method, `Other` included
pub fn any<H: RequestHandler + 'static>(handler: H) -> RouteItem {
    on(MethodSet::all(), handler)
}

macro_rules! method_route {
    ($method:ident, $variant:ident) => {
        pub fn $method<H: RequestHandler + 'static>(handler: H) -> RouteItem {
            on(HttpMethod::$variant, handler)
        }
    };
}

method_route!(get, Get);
method_route!(post, Post);
method_route!(put, Put);
method_route!(patch, Patch);
method_route!(delete, Delete);
method_route!(head, Head);
method_route!(options, Options);
