//! The tenant route chain.
//!
//! A [`RouteChain`] is an ordered list of [`RouteEntry`] values. Each entry
//! pairs a [`RoutePredicate`] with a handler that may decline. The first entry
//! whose predicate matches and whose handler answers wins; when every entry
//! declines the chain answers `None` and the caller responds 404.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::dispatch::{HandlerContext, ResourceMapping, TenantRequest};
use crate::error::RestResult;

/// A route handler; `None` declines.
pub type RouteHandler =
    Arc<dyn Fn(&TenantRequest, &HandlerContext) -> Option<RestResult<Response>> + Send + Sync>;

/// Tests a header value, which is `None` when the header is absent.
pub type HeaderMatcher = fn(Option<&HeaderValue>) -> bool;

/// Decides whether a [`RouteEntry`] applies to a request.
///
/// An empty predicate matches everything.
#[derive(Clone, Debug, Default)]
pub struct RoutePredicate {
    methods: Vec<Method>,
    resource: Option<&'static str>,
    header: Option<(HeaderName, HeaderMatcher)>,
}

impl RoutePredicate {
    /// A predicate matching every request.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the predicate to `method`, in addition to earlier methods.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Requires the first path segment to equal `resource`.
    pub fn resource(mut self, resource: &'static str) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Requires the header `name` to satisfy `matcher`.
    pub fn header(mut self, name: HeaderName, matcher: HeaderMatcher) -> Self {
        self.header = Some((name, matcher));
        self
    }

    /// Returns `true` if `request` satisfies every condition.
    pub fn matches(&self, request: &TenantRequest) -> bool {
        (self.methods.is_empty() || self.methods.contains(&request.method))
            && self
                .resource
                .is_none_or(|resource| request.resource() == resource)
            && self
                .header
                .as_ref()
                .is_none_or(|(name, matcher)| matcher(request.headers.get(name)))
    }
}

/// A predicate and the handler it guards.
#[derive(Clone)]
pub struct RouteEntry {
    predicate: RoutePredicate,
    handler: RouteHandler,
}

impl RouteEntry {
    /// Creates an entry.
    pub fn new<F>(predicate: RoutePredicate, handler: F) -> Self
    where
        F: Fn(&TenantRequest, &HandlerContext) -> Option<RestResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            predicate,
            handler: Arc::new(handler),
        }
    }

    /// The entry's predicate.
    pub fn predicate(&self) -> &RoutePredicate {
        &self.predicate
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("predicate", &self.predicate)
            .finish_non_exhaustive()
    }
}

impl<I, B> From<ResourceMapping<I, B>> for RouteEntry
where
    I: Send + Sync + 'static,
    B: DeserializeOwned + Send + Sync + 'static,
{
    fn from(mapping: ResourceMapping<I, B>) -> Self {
        let predicate = RoutePredicate::any().resource(mapping.name());
        RouteEntry::new(predicate, move |request, context| {
            mapping.dispatch(request, context)
        })
    }
}

/// An ordered chain of routes.
#[derive(Clone, Debug, Default)]
pub struct RouteChain {
    entries: Vec<RouteEntry>,
}

impl RouteChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn route(mut self, entry: impl Into<RouteEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs `request` through the chain, returning `None` if every entry
    /// declined.
    pub fn handle(&self, request: &TenantRequest, context: &HandlerContext) -> Option<Response> {
        self.entries
            .iter()
            .filter(|entry| entry.predicate.matches(request))
            .find_map(|entry| (entry.handler)(request, context))
            .map(IntoResponse::into_response)
    }
}
