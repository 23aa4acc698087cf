//! The routes below `/api/spreadsheet/<id>`.

use axum::http::{Method, header};
use serde_json::Value;

use super::chain::{RouteChain, RouteEntry, RoutePredicate};
use crate::dispatch::{HandlerContext, TenantRequest};
use crate::error::{RestError, RestResult};
use crate::handlers::{cell, column, label, row};
use crate::middleware::is_json;
use crate::tenant::TenantContext;

/// Builds the route chain for one spreadsheet.
///
/// PATCH bodies are checked first: a non-JSON content type answers 415
/// and a body that is not JSON answers 400, both before any label in the
/// body is resolved.
pub fn tenant_routes(_tenant: &TenantContext) -> RouteChain {
    RouteChain::new()
        .route(RouteEntry::new(
            RoutePredicate::any()
                .method(Method::PATCH)
                .header(header::CONTENT_TYPE, |value| !is_json(value)),
            reject_media_type,
        ))
        .route(RouteEntry::new(
            RoutePredicate::any().method(Method::PATCH),
            reject_malformed_json,
        ))
        .route(cell::mapping())
        .route(column::mapping())
        .route(row::mapping())
        .route(label::mapping())
}

fn reject_media_type(
    request: &TenantRequest,
    _: &HandlerContext,
) -> Option<RestResult<axum::response::Response>> {
    Some(Err(RestError::UnsupportedMediaType {
        content_type: request.content_type().unwrap_or("none").to_string(),
    }))
}

fn reject_malformed_json(
    request: &TenantRequest,
    _: &HandlerContext,
) -> Option<RestResult<axum::response::Response>> {
    if request.body.is_empty() {
        return None;
    }
    serde_json::from_slice::<Value>(&request.body)
        .err()
        .map(|e| Err(RestError::bad_request(format!("Invalid JSON: {}", e))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::handler_context;
    use axum::http::{HeaderValue, StatusCode};
    use tabulon_persistence::reference::CellReference;

    fn patch(content_type: Option<&'static str>, body: &'static str) -> TenantRequest {
        let request = TenantRequest::new(Method::PATCH, "cell").with_body(body);
        match content_type {
            Some(value) => request.with_header(header::CONTENT_TYPE, HeaderValue::from_static(value)),
            None => request,
        }
    }

    fn status(request: &TenantRequest, context: &HandlerContext) -> StatusCode {
        tenant_routes(context.tenant())
            .handle(request, context)
            .map(|response| response.status())
            .unwrap_or(StatusCode::NOT_FOUND)
    }

    #[test]
    fn test_patch_requires_json_content_type() {
        let context = handler_context();
        let body = r#"{"cells": {"A1": {"formula": {"text": "1"}}}}"#;
        assert_eq!(
            status(&patch(Some("text/plain"), body), &context),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(status(&patch(None, body), &context), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(context.repository().cells.is_empty());

        assert_eq!(
            status(&patch(Some("application/merge-patch+json"), body), &context),
            StatusCode::OK
        );
        let a1 = CellReference::parse("A1").unwrap();
        assert!(context.repository().cells.get(&a1).is_some());
    }

    #[test]
    fn test_malformed_json_is_400_even_with_labels() {
        let context = handler_context();
        let request = patch(Some("application/json"), r#"{"cells": {"Missing": "#);
        assert_eq!(status(&request, &context), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resources_routed() {
        let context = handler_context();
        for path in ["cell/A1", "column/A", "row/1", "label/Total"] {
            let request = TenantRequest::new(Method::GET, path);
            let status = status(&request, &context);
            assert!(
                status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND,
                "{} answered {}",
                path,
                status
            );
        }
        assert_eq!(
            status(&TenantRequest::new(Method::GET, "sheet/A1"), &context),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(&TenantRequest::new(Method::PUT, "cell/A1"), &context),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
