//! Provider catalog lookups.
//!
//! Every [`Feature`] is served at `/api/<feature>` (list) and
//! `/api/<feature>/{name}` (lookup). Names compare ignoring ASCII case.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};

use crate::error::{RestError, RestResult};
use crate::marshall::Marshalled;
use crate::provider::{Catalog, Feature, ProviderFactory};
use crate::responses::{ResponseHeaders, marshalled_response};
use crate::state::AppState;

/// Builds the router for one feature.
pub fn feature_router(feature: Feature) -> Router<AppState> {
    let base = format!("/api/{}", feature.path());
    Router::new()
        .route(
            &base,
            get(move |State(state): State<AppState>| async move { list(&state, feature) }),
        )
        .route(
            &format!("{}/{{name}}", base),
            get(
                move |State(state): State<AppState>, Path(name): Path<String>| async move {
                    lookup(&state, feature, &name)
                },
            ),
        )
}

/// Builds the routers of every feature.
pub fn feature_routers() -> Router<AppState> {
    Feature::ALL
        .into_iter()
        .fold(Router::new(), |router, feature| router.merge(feature_router(feature)))
}

fn catalog(providers: &ProviderFactory, feature: Feature) -> RestResult<&Catalog> {
    providers.catalog(feature).ok_or_else(|| RestError::InternalError {
        message: format!("No catalog serves {}", feature.path()),
    })
}

fn list(state: &AppState, feature: Feature) -> RestResult<Response> {
    let providers = state.providers();
    let marshall = state.marshall();
    let locales = providers.locales();

    let marshalled = match feature {
        Feature::Locale => marshall.marshall(&locales.to_vec())?,
        Feature::DateTimeSymbols => marshall.marshall(
            &locales
                .iter()
                .map(|l| (l.tag.to_string(), l.date_time_symbols.clone()))
                .collect::<BTreeMap<_, _>>(),
        )?,
        Feature::DecimalNumberSymbols => marshall.marshall(
            &locales
                .iter()
                .map(|l| (l.tag.to_string(), l.decimal_number_symbols.clone()))
                .collect::<BTreeMap<_, _>>(),
        )?,
        Feature::Function => marshall.marshall(
            &providers
                .functions()
                .iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>(),
        )?,
        feature => marshall.marshall(&catalog(providers, feature)?.list().to_vec())?,
    };
    Ok(ok(marshalled))
}

fn lookup(state: &AppState, feature: Feature, name: &str) -> RestResult<Response> {
    let providers = state.providers();
    let marshall = state.marshall();
    let unknown = || RestError::not_found(format!("Unknown {} \"{}\"", feature.path(), name));

    let marshalled = match feature {
        Feature::Locale => marshall.marshall(providers.locale(name).ok_or_else(unknown)?)?,
        Feature::DateTimeSymbols => marshall.marshall(
            &providers
                .locale(name)
                .ok_or_else(unknown)?
                .date_time_symbols,
        )?,
        Feature::DecimalNumberSymbols => marshall.marshall(
            &providers
                .locale(name)
                .ok_or_else(unknown)?
                .decimal_number_symbols,
        )?,
        Feature::Function => {
            let function = providers
                .functions()
                .iter()
                .find(|f| f.eq_ignore_ascii_case(name))
                .ok_or_else(unknown)?;
            marshall.marshall(&function.to_string())?
        }
        feature => {
            let info = catalog(providers, feature)?.get(name).ok_or_else(unknown)?;
            marshall.marshall(info)?
        }
    };
    Ok(ok(marshalled))
}

fn ok(marshalled: Marshalled) -> Response {
    marshalled_response(StatusCode::OK, marshalled, ResponseHeaders::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::responses::X_CONTENT_TYPE_NAME;
    use std::sync::Arc;
    use tabulon_persistence::engine::BasicEngine;
    use tabulon_persistence::store::MemoryMetadataStore;

    fn state() -> AppState {
        AppState::new(
            ServerConfig::for_testing(),
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(BasicEngine),
        )
    }

    #[test]
    fn test_every_feature_lists() {
        let state = state();
        for feature in Feature::ALL {
            let response = list(&state, feature).unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", feature.path());
        }
    }

    #[test]
    fn test_lookup_type_names() {
        let state = state();
        let cases = [
            (Feature::Locale, "en-au", "locale"),
            (Feature::DateTimeSymbols, "de-DE", "date-time-symbols"),
            (Feature::DecimalNumberSymbols, "fr-FR", "decimal-number-symbols"),
            (Feature::Function, "sum", "function-name"),
            (Feature::Converter, "GENERAL", "provider-info"),
        ];
        for (feature, name, type_name) in cases {
            let response = lookup(&state, feature, name).unwrap();
            assert_eq!(response.headers()[X_CONTENT_TYPE_NAME], type_name);
        }
    }

    #[test]
    fn test_unknown_names() {
        let state = state();
        for feature in [Feature::Locale, Feature::Function, Feature::Plugin, Feature::Parser] {
            let err = lookup(&state, feature, "klingon").unwrap_err();
            assert_eq!(err.status(), StatusCode::NOT_FOUND);
        }
    }
}
