//! HTTP request checks shared by handlers and the tenant route chain.
//!
//! - [`content_type`] - JSON content type detection for patch documents

pub mod content_type;

pub use content_type::{is_json, require_json};
