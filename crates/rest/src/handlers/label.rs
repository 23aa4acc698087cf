//! The `label` resource.
//!
//! `GET label/Total` answers the mapping itself; listing several labels
//! (or `*`) answers a delta carrying them. `POST label` creates a mapping
//! and `POST label/Old` replaces `Old`, renaming it when the body names a
//! different label.

use axum::http::Method;
use tabulon_persistence::model::SpreadsheetDelta;
use tabulon_persistence::reference::{LabelMapping, LabelName};
use tracing::debug;

use super::{required, respond};
use crate::dispatch::{HandlerContext, LinkRelation, RequestBody, ResourceMapping, Selection};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;
use crate::tenant::MarshallContextProvider;

type Body = Option<RequestBody<LabelMapping>>;

/// Builds the `label` mapping.
pub fn mapping() -> ResourceMapping<LabelName, LabelMapping> {
    ResourceMapping::new("label", LabelName::parse, false)
        .handle(LinkRelation::SELF, Method::GET, load)
        .handle(LinkRelation::SELF, Method::POST, save)
        .handle(LinkRelation::SELF, Method::DELETE, delete)
}

fn load(
    selection: Selection<LabelName>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let labels = &context.repository().labels;
    let delta = match selection {
        Selection::One(label) => {
            let mapping = labels.load(&label)?;
            return context.marshall_context().marshall(&mapping).map(Some);
        }
        Selection::None | Selection::All => SpreadsheetDelta {
            labels: labels.all(),
            ..Default::default()
        },
        Selection::Many(names) => SpreadsheetDelta {
            labels: names
                .iter()
                .map(|label| labels.load(label))
                .collect::<Result<_, _>>()?,
            ..Default::default()
        },
        Selection::Range(..) => {
            return Err(RestError::bad_request("Label ranges are not supported"));
        }
    };
    respond(context, delta)
}

fn save(
    selection: Selection<LabelName>,
    body: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let mapping = required(body)?.decode()?;
    let labels = &context.repository().labels;

    let saved = match selection {
        Selection::None => labels.save(mapping)?,
        Selection::One(existing) => {
            labels.load(&existing)?;
            let saved = labels.save(mapping)?;
            if saved.label != existing {
                debug!(from = %existing, to = %saved.label, "Renamed label");
                labels.delete(&existing);
            }
            saved
        }
        _ => return Err(RestError::bad_request("Labels are saved one at a time")),
    };
    context.marshall_context().marshall(&saved).map(Some)
}

fn delete(
    selection: Selection<LabelName>,
    _: Body,
    context: &HandlerContext,
) -> RestResult<Option<Marshalled>> {
    let labels = &context.repository().labels;
    match selection {
        Selection::One(label) => {
            labels.delete(&label);
        }
        Selection::Many(names) => {
            for label in &names {
                labels.delete(label);
            }
        }
        Selection::All => {
            for mapping in labels.all() {
                labels.delete(&mapping.label);
            }
        }
        Selection::None | Selection::Range(..) => {
            return Err(RestError::bad_request("Deleting labels requires a selection"));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TenantRequest;
    use crate::dispatch::test_support::handler_context;
    use crate::responses::X_CONTENT_TYPE_NAME;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde_json::{Value, json};
    use tabulon_persistence::reference::LabelTarget;

    fn run(context: &HandlerContext, method: Method, path: &str, body: Option<Value>) -> Response {
        let mut request = TenantRequest::new(method, path);
        if let Some(body) = body {
            request = request.with_body(body.to_string());
        }
        mapping()
            .dispatch(&request, context)
            .expect("label mapping answers")
            .unwrap_or_else(IntoResponse::into_response)
    }

    fn name(text: &str) -> LabelName {
        LabelName::parse(text).unwrap()
    }

    #[test]
    fn test_create_and_load() {
        let context = handler_context();
        let created = run(
            &context,
            Method::POST,
            "label",
            Some(json!({"label": "Total", "reference": "B2:C3"})),
        );
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(created.headers()[X_CONTENT_TYPE_NAME], "spreadsheet-label-mapping");

        let loaded = run(&context, Method::GET, "label/Total", None);
        assert_eq!(loaded.status(), StatusCode::OK);
        assert_eq!(run(&context, Method::GET, "label/*", None).status(), StatusCode::OK);
        assert_eq!(
            run(&context, Method::GET, "label/Missing", None).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_rename() {
        let context = handler_context();
        let labels = &context.repository().labels;
        labels
            .save(LabelMapping::new(name("Old"), LabelTarget::parse("A1").unwrap()))
            .unwrap();

        let renamed = run(
            &context,
            Method::POST,
            "label/Old",
            Some(json!({"label": "New", "reference": "A1"})),
        );
        assert_eq!(renamed.status(), StatusCode::OK);
        assert!(labels.load(&name("Old")).is_err());
        assert!(labels.load(&name("New")).is_ok());

        let missing = run(
            &context,
            Method::POST,
            "label/Old",
            Some(json!({"label": "Other", "reference": "A1"})),
        );
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(labels.load(&name("Other")).is_err());
    }

    #[test]
    fn test_cycle_rejected() {
        let context = handler_context();
        run(&context, Method::POST, "label", Some(json!({"label": "A", "reference": "B"})));
        let cycle = run(
            &context,
            Method::POST,
            "label",
            Some(json!({"label": "B", "reference": "A"})),
        );
        assert_eq!(cycle.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_delete_and_ranges_refused() {
        let context = handler_context();
        run(&context, Method::POST, "label", Some(json!({"label": "Total", "reference": "A1"})));
        run(&context, Method::POST, "label", Some(json!({"label": "Tax", "reference": "A2"})));

        assert_eq!(
            run(&context, Method::GET, "label/Total:Tax", None).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            run(&context, Method::DELETE, "label/Total", None).status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(run(&context, Method::DELETE, "label/*", None).status(), StatusCode::NO_CONTENT);
        assert!(context.repository().labels.all().is_empty());
        assert_eq!(run(&context, Method::GET, "label", None).status(), StatusCode::NO_CONTENT);
    }
}
