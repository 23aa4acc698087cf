//! Resource mappings.
//!
//! A [`ResourceMapping`] serves one resource below a tenant, for example
//! `cell`. Paths take the form `<resource>[/<selection>[/<relation>]]`;
//! the relation defaults to `self`. Handlers are registered per relation and
//! method and are looked up in this order:
//!
//! 1. the resource name must match, otherwise the mapping declines
//! 2. no handler for the method under any relation answers 405
//! 3. a malformed selection answers 400
//! 4. no handler for the relation and method declines
//! 5. a JSON body is pre-processed by the tenant's marshall context
//! 6. the handler runs; `None` answers 204, `Some` answers 201 for a POST
//!    without selection and 200 otherwise

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tabulon_persistence::engine::EngineEvaluation;
use tabulon_persistence::error::ReferenceError;
use tracing::debug;

use super::selection::Selection;
use super::{HandlerContext, TenantRequest};
use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;
use crate::responses::{ResponseHeaders, marshalled_response};
use crate::tenant::{LocaleContext, MarshallContextProvider};

/// Names the view of a resource a handler produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkRelation(&'static str);

impl LinkRelation {
    /// The default relation.
    pub const SELF: LinkRelation = LinkRelation("self");

    /// Creates a relation.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The name used in URLs.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl From<EngineEvaluation> for LinkRelation {
    fn from(evaluation: EngineEvaluation) -> Self {
        Self(evaluation.relation())
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A request body that has been pre-processed for `B`.
#[derive(Debug)]
pub struct RequestBody<B> {
    value: Value,
    _type: PhantomData<fn() -> B>,
}

impl<B: DeserializeOwned> RequestBody<B> {
    /// Wraps an already pre-processed document.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            _type: PhantomData,
        }
    }

    /// The JSON document.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Takes the JSON document, for merge patches.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Decodes the document.
    pub fn decode(self) -> RestResult<B> {
        Ok(serde_json::from_value(self.value)?)
    }
}

/// A handler registered on a [`ResourceMapping`].
pub type MappingHandler<I, B> = Arc<
    dyn Fn(Selection<I>, Option<RequestBody<B>>, &HandlerContext) -> RestResult<Option<Marshalled>>
        + Send
        + Sync,
>;

/// Serves one resource below a tenant.
pub struct ResourceMapping<I, B> {
    name: &'static str,
    parse_id: fn(&str) -> Result<I, ReferenceError>,
    ranges: bool,
    handlers: Vec<(LinkRelation, Method, MappingHandler<I, B>)>,
}

impl<I, B> ResourceMapping<I, B>
where
    I: 'static,
    B: DeserializeOwned + 'static,
{
    /// Creates a mapping for `name` without handlers.
    ///
    /// `parse_id` reads one id of a selection; `ranges` allows `a:b`.
    pub fn new(
        name: &'static str,
        parse_id: fn(&str) -> Result<I, ReferenceError>,
        ranges: bool,
    ) -> Self {
        Self {
            name,
            parse_id,
            ranges,
            handlers: Vec::new(),
        }
    }

    /// The resource name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers `handler` for `relation` and `method`.
    ///
    /// # Panics
    ///
    /// Panics if a handler is already registered for the pair.
    pub fn handle<F>(mut self, relation: LinkRelation, method: Method, handler: F) -> Self
    where
        F: Fn(Selection<I>, Option<RequestBody<B>>, &HandlerContext) -> RestResult<Option<Marshalled>>
            + Send
            + Sync
            + 'static,
    {
        assert!(
            self.lookup(relation.name(), &method).is_none(),
            "duplicate {} handler for relation {} on {}",
            method,
            relation,
            self.name
        );
        self.handlers.push((relation, method, Arc::new(handler)));
        self
    }

    /// Returns `true` if any relation handles `method`.
    pub fn handles_method(&self, method: &Method) -> bool {
        self.handlers.iter().any(|(_, m, _)| m == method)
    }

    fn lookup(&self, relation: &str, method: &Method) -> Option<&MappingHandler<I, B>> {
        self.handlers
            .iter()
            .find(|(r, m, _)| r.name() == relation && m == method)
            .map(|(_, _, handler)| handler)
    }

    /// Dispatches `request`, returning `None` when this mapping declines.
    pub fn dispatch(
        &self,
        request: &TenantRequest,
        context: &HandlerContext,
    ) -> Option<RestResult<Response>> {
        let mut segments = request.path.splitn(3, '/');
        if segments.next()? != self.name {
            return None;
        }
        if !self.handles_method(&request.method) {
            return Some(Err(RestError::MethodNotAllowed {
                method: request.method.to_string(),
                resource: self.name.to_string(),
            }));
        }

        let selection = match Selection::parse(segments.next(), self.parse_id, self.ranges) {
            Ok(selection) => selection,
            Err(e) => return Some(Err(e.into())),
        };
        let relation = segments
            .next()
            .filter(|relation| !relation.is_empty())
            .unwrap_or(LinkRelation::SELF.name());
        let handler = self.lookup(relation, &request.method)?;

        debug!(
            resource = self.name,
            method = %request.method,
            relation,
            "Dispatching to resource handler"
        );
        Some(self.invoke(handler, selection, request, context))
    }

    fn invoke(
        &self,
        handler: &MappingHandler<I, B>,
        selection: Selection<I>,
        request: &TenantRequest,
        context: &HandlerContext,
    ) -> RestResult<Response> {
        let body = if request.body.is_empty() {
            None
        } else {
            let document: Value = serde_json::from_slice(&request.body)?;
            let document = context.marshall_context().pre_process::<B>(document)?;
            Some(RequestBody::new(document))
        };

        let created = request.method == Method::POST && selection.is_none();
        match handler(selection, body, context)? {
            None => Ok(StatusCode::NO_CONTENT.into_response()),
            Some(marshalled) => {
                let status = if created {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                let headers = ResponseHeaders::new().with_content_language(context.locale().tag);
                Ok(marshalled_response(status, marshalled, headers))
            }
        }
    }
}

impl<I, B> fmt::Debug for ResourceMapping<I, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMapping")
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
