//! Request dispatch below the spreadsheet id.
//!
//! A request addressed to `/api/spreadsheet/<id>/...` travels through:
//!
//! 1. [`PathDispatcher`] - finds the id, resolves the tenant and its router
//! 2. [`RouteChain`](crate::routing::RouteChain) - the tenant's ordered routes
//! 3. [`ResourceMapping`] - selection parsing, method and relation lookup
//!
//! Handlers receive a [`HandlerContext`] giving access to the tenant and the
//! caller.

mod mapping;
mod path;
mod selection;

pub use mapping::{LinkRelation, MappingHandler, RequestBody, ResourceMapping};
pub use path::PathDispatcher;
pub use selection::Selection;

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use tabulon_persistence::engine::SpreadsheetEngine;
use tabulon_persistence::store::StoreRepository;

use crate::marshall::MarshallContext;
use crate::provider::LocaleInfo;
use crate::tenant::{IdentityContext, LocaleContext, MarshallContextProvider, TenantContext};

/// Header carrying the already authenticated caller.
pub const X_USER: HeaderName = HeaderName::from_static("x-user");

/// A request as seen below the spreadsheet id.
#[derive(Clone, Debug)]
pub struct TenantRequest {
    /// The HTTP method.
    pub method: Method,
    /// The path after the id segment, without a leading `/`.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// The request body, possibly empty.
    pub body: Bytes,
}

impl TenantRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The first path segment.
    pub fn resource(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }

    /// The `Content-Type` header, if readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// The caller named by the `X-User` header.
    pub fn user(&self) -> Option<&str> {
        user_of(&self.headers)
    }
}

/// Reads the caller from request headers.
pub fn user_of(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_USER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|user| !user.is_empty())
}

/// What a tenant handler can reach.
#[derive(Clone, Debug)]
pub struct HandlerContext {
    tenant: Arc<TenantContext>,
    user: Option<String>,
}

impl HandlerContext {
    /// Creates a context for a request by `user` against `tenant`.
    pub fn new(tenant: Arc<TenantContext>, user: Option<String>) -> Self {
        Self { tenant, user }
    }

    /// The tenant.
    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    /// The tenant's stores.
    pub fn repository(&self) -> &StoreRepository {
        self.tenant.repository()
    }

    /// The formula engine.
    pub fn engine(&self) -> &dyn SpreadsheetEngine {
        self.tenant.engine()
    }
}

impl LocaleContext for HandlerContext {
    fn locale(&self) -> &LocaleInfo {
        self.tenant.locale()
    }
}

impl IdentityContext for HandlerContext {
    fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl MarshallContextProvider for HandlerContext {
    fn marshall_context(&self) -> &MarshallContext {
        self.tenant.marshall_context()
    }
}
