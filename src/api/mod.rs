//! Course catalog API module
//!
//! This module provides the HTTP client, wire payloads, and error taxonomy
//! for the REST service that stores courses and course instances. All list,
//! create, and delete operations the rest of the application performs go
//! through [`client::ApiClient`].

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{ApiMessage, NewCourse, NewInstance};
