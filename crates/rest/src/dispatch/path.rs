//! Dispatch on the spreadsheet id path segment.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use parking_lot::Mutex;
use tabulon_persistence::id::SpreadsheetId;
use tracing::{debug, trace};

use super::{HandlerContext, TenantRequest};
use crate::error::{RestError, RestResult};
use crate::routing::RouteChain;
use crate::tenant::{TenantCache, TenantContext};

/// Builds the route chain serving one tenant.
pub type TenantRouterFactory = fn(&TenantContext) -> RouteChain;

/// Finds the spreadsheet id in a path and hands the rest of the request to
/// that spreadsheet's router.
///
/// Segments are counted after the leading `/`, so for
/// `/api/spreadsheet/<id>/cell/B2` the id is component 2. Routers are built
/// once per tenant context and rebuilt whenever the cache publishes a
/// different context for the id.
pub struct PathDispatcher {
    path_component: usize,
    cache: Arc<TenantCache>,
    router_factory: TenantRouterFactory,
    routers: Mutex<HashMap<SpreadsheetId, (Arc<TenantContext>, Arc<RouteChain>)>>,
}

impl PathDispatcher {
    /// Creates a dispatcher reading the id from segment `path_component`.
    pub fn new(
        path_component: usize,
        cache: Arc<TenantCache>,
        router_factory: TenantRouterFactory,
    ) -> Self {
        Self {
            path_component,
            cache,
            router_factory,
            routers: Mutex::new(HashMap::new()),
        }
    }

    /// Dispatches a request for `path`.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> RestResult<Response> {
        let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
        let id_index = self.path_component;

        if segments
            .get(id_index + 1)
            .is_none_or(|segment| segment.is_empty())
        {
            return Err(RestError::not_found(format!("No resource at {}", path)));
        }
        let token = segments[id_index];
        if token.is_empty() {
            return Err(RestError::bad_request("Missing spreadsheet-id"));
        }
        let id = SpreadsheetId::parse(token)
            .map_err(|_| RestError::bad_request(format!("Invalid spreadsheet-id \"{}\"", token)))?;

        let tenant = self.cache.resolve(id).await?;
        let router = self.router_for(&tenant);

        let request = TenantRequest {
            method,
            path: segments[id_index + 1..].join("/"),
            headers,
            body,
        };
        let context = HandlerContext::new(tenant, request.user().map(str::to_string));

        trace!(spreadsheet = %id, path = %request.path, "Dispatching tenant request");
        router.handle(&request, &context).ok_or_else(|| {
            RestError::not_found(format!("No route for {} {}", request.method, path))
        })
    }

    fn router_for(&self, tenant: &Arc<TenantContext>) -> Arc<RouteChain> {
        let mut routers = self.routers.lock();
        if let Some((context, router)) = routers.get(&tenant.id()) {
            if Arc::ptr_eq(context, tenant) {
                return Arc::clone(router);
            }
        }

        debug!(spreadsheet = %tenant.id(), "Building tenant router");
        let router = Arc::new((self.router_factory)(tenant));
        // A context evicted or replaced since it was resolved is served once, not kept.
        let current = self
            .cache
            .get(tenant.id())
            .is_some_and(|cached| Arc::ptr_eq(&cached, tenant));
        if current {
            routers.insert(tenant.id(), (Arc::clone(tenant), Arc::clone(&router)));
        }
        router
    }

    /// Drops the router cached for `id`.
    pub fn forget(&self, id: SpreadsheetId) {
        self.routers.lock().remove(&id);
    }

    /// The tenant cache this dispatcher resolves through.
    pub fn cache(&self) -> &Arc<TenantCache> {
        &self.cache
    }
}

impl std::fmt::Debug for PathDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathDispatcher")
            .field("path_component", &self.path_component)
            .field("routers", &self.routers.lock().len())
            .finish()
    }
}
