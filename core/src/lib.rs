//! Synchronous client core for the Elastic App Search management API.
//!
//! # Overview
//! Every API operation (engines, curations, synonym sets) is an
//! `EndpointSpec` value: a verb, a URI template and its route parameters.
//! The client resolves an operation into an `HttpRequest` and classifies the
//! `HttpResponse` without touching the network; a `Transport` performs the
//! actual round-trip.
//!
//! # Design
//! - Endpoint declarations are data, validated once when the registry is
//!   first used and shared read-only afterwards.
//! - `EndpointSpec::resolve` is pure and percent-encodes route values.
//! - Failures are one tagged enum, `ClientError`. Nothing is retried.
//! - The `ureq` feature (on by default) provides a blocking `UreqTransport`.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{AppSearchClient, RouteParams, API_PREFIX};
pub use config::ClientConfig;
pub use endpoint::{EndpointSpec, ResolvedRequest};
pub use endpoints::{Operation, Registry};
pub use error::{ClientError, ConfigError, EndpointError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError, TransportErrorKind};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    CreateEngine, Curation, CurationId, CurationInput, DeleteResponse, Engine, ErrorBody,
    ListMeta, ListResponse, Page, PageMeta, SynonymSet, SynonymSetInput,
};
