//! Error types for the App Search client.
//!
//! # Design
//! `ClientError` is the single failure type of every request-level
//! operation. Callers branch on the variant rather than on a type hierarchy:
//! `Api` carries the status code and the raw body, `Connection` carries the
//! transport fault. `EndpointError` is reported only while endpoint
//! declarations are validated and never on the request path.

use crate::transport::TransportError;

/// Errors returned while resolving, dispatching or decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The caller did not supply a value for a declared route parameter.
    #[error("missing route parameter `{name}` for `{template}`")]
    MissingRouteParameter { template: String, name: String },

    /// A route value that would collapse or climb a path segment: empty, `.`
    /// or `..`.
    #[error("route parameter `{name}` for `{template}` has invalid value `{value}`")]
    InvalidRouteParameter {
        template: String,
        name: String,
        value: String,
    },

    /// The transport could not complete the round-trip.
    #[error("connection to App Search failed: {source}")]
    Connection {
        #[from]
        source: TransportError,
    },

    /// The server answered with a 4xx or 5xx status.
    #[error("App Search returned HTTP {status}: {}", summarize(.errors, .body))]
    Api {
        status: u16,
        /// Messages from the `{"errors": [...]}` body, empty if it did not parse.
        errors: Vec<String>,
        body: String,
    },

    /// A request body could not be encoded, or a response body did not match
    /// the expected JSON shape.
    #[error("serialization failed: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller-side retry could succeed without changing the request.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Connection { .. } => true,
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::MissingRouteParameter { .. }
            | ClientError::InvalidRouteParameter { .. }
            | ClientError::Serialization { .. } => false,
        }
    }
}

fn summarize(errors: &[String], body: &str) -> String {
    if errors.is_empty() {
        body.to_string()
    } else {
        errors.join("; ")
    }
}

/// An endpoint declaration whose template and route parameters disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("template `{template}` uses `{{{name}}}` which is not a declared route parameter")]
    UndeclaredToken { template: String, name: String },

    #[error("route parameter `{name}` does not appear in template `{template}`")]
    UnusedRouteParameter { template: String, name: String },

    #[error("route parameter `{name}` is declared more than once for `{template}`")]
    DuplicateRouteParameter { template: String, name: String },

    #[error("template `{template}` is malformed at byte {position}")]
    MalformedTemplate { template: String, position: usize },
}

/// Failure to assemble a `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{name}` has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}
