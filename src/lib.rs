//! # Identity token helpers for Google Cloud
//!
//! Provides identity token sources for calling authenticated services
//! (Cloud Run, IAP and friends), an HTTP transport that attaches those
//! tokens, and project id resolution.
//!
//! Modules:
//! - `auth`: identity token source selection and the authorizing transport
//! - `sources`: service account, user, metadata and adapter token sources
//! - `cache`: token type and the single-slot reuse cache
//! - `credentials`: Application Default Credentials discovery
//! - `project`: project id from the environment or the metadata server
//! - `config`: YAML settings

pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod project;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::transport::{AuthTransport, Transport};
pub use crate::auth::{id_token_source, Mechanisms};
pub use crate::cache::token::Token;
pub use crate::error::{Error, Result};
pub use crate::project::ProjectResolver;
pub use crate::sources::default::GoogleMechanisms;
pub use crate::sources::{BoxTokenSource, TokenSource};
