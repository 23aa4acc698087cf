//! Common test utilities for REST API testing.
//!
//! - [`harness`] - A test server over the full application
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod harness;
