//! Client and schema tooling for resource-oriented APIs that follow the AEP
//! URL-pattern convention (`publishers/{publisher}/books/{book}`).
//!
//! - [`openapi`] parses Swagger 2 and OpenAPI 3 documents and resolves
//!   `$ref` pointers against the right definitions table.
//! - [`api`] collects resources from a document and turns patterns into URLs.
//! - [`client`] runs create/list/get/update/delete calls.

pub mod api;
pub mod cases;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod openapi;

pub use api::{Api, Resource};
pub use client::{Client, JsonObject};
pub use error::{ApiError, ClientError, ConfigError, LoadError, ParseError, PatternError, ResolveError};
pub use openapi::spec::{Dialect, OpenApi};
