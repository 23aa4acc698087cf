//! Route configuration.
//!
//! - [`create_routes`] - The top-level axum router
//! - [`tenant_routes`] - The route chain serving one spreadsheet
//! - [`RouteChain`] - Ordered, declinable routes below a spreadsheet id

mod app_routes;
mod chain;
mod tenant_routes;

pub use app_routes::create_routes;
pub use chain::{HeaderMatcher, RouteChain, RouteEntry, RouteHandler, RoutePredicate};
pub use tenant_routes::tenant_routes;
