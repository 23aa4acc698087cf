//! Content type checks.
//!
//! Patch documents must be JSON: `application/json` or any `+json` media
//! type such as `application/merge-patch+json`.

use axum::http::{HeaderMap, HeaderValue, header};

use crate::error::{RestError, RestResult};

/// Returns `true` if `value` names a JSON media type.
pub fn is_json(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .is_some_and(|mime| {
            (mime.type_() == mime::APPLICATION && mime.subtype() == mime::JSON)
                || mime.suffix() == Some(mime::JSON)
        })
}

/// Fails with 415 unless the request declares a JSON body.
pub fn require_json(headers: &HeaderMap) -> RestResult<()> {
    let content_type = headers.get(header::CONTENT_TYPE);
    if is_json(content_type) {
        Ok(())
    } else {
        Err(RestError::UnsupportedMediaType {
            content_type: content_type
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(value: &'static str) -> bool {
        is_json(Some(&HeaderValue::from_static(value)))
    }

    #[test]
    fn test_json_types() {
        assert!(json("application/json"));
        assert!(json("application/json; charset=utf-8"));
        assert!(json("application/merge-patch+json"));
        assert!(json("text/vnd.spreadsheet+json"));
    }

    #[test]
    fn test_other_types() {
        assert!(!json("text/plain"));
        assert!(!json("application/xml"));
        assert!(!json("garbage"));
        assert!(!is_json(None));
    }

    #[test]
    fn test_require_json() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            require_json(&headers),
            Err(RestError::UnsupportedMediaType { content_type }) if content_type == "none"
        ));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(require_json(&headers).is_ok());
    }
}
