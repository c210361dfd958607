//! The network collaborator.
//!
//! # Design
//! The core never opens a socket. Anything that can turn an `HttpRequest`
//! into an `HttpResponse` is a `Transport`, including plain closures, which
//! keeps tests free of I/O. A non-2xx status is a successful round-trip at
//! this layer; only faults that prevent a response (DNS, refused connection,
//! timeout, broken body stream) are `TransportError`s.
//!
//! With the `ureq` feature, `UreqTransport` provides a blocking adapter.

use std::error::Error as StdError;
use std::fmt;

use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Dns,
    Connect,
    Timeout,
    Io,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorKind::Dns => "dns lookup failed",
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Io => "i/o error",
            TransportErrorKind::Other => "transport error",
        }
    }
}

/// A fault that prevented the transport from producing a response.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(kind: TransportErrorKind, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::io;
    use std::time::Duration;

    use super::{Transport, TransportError, TransportErrorKind};
    use crate::config::ClientConfig;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a shared `ureq::Agent`.
    ///
    /// Status codes are returned as data so the client performs the
    /// classification.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }

        pub fn from_config(config: &ClientConfig) -> Self {
            Self::new(config.timeout())
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn classify(err: ureq::Error) -> TransportError {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::HostNotFound => TransportErrorKind::Dns,
            ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
            ureq::Error::Io(io_err) => match io_err.kind() {
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted => TransportErrorKind::Connect,
                io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
                _ => TransportErrorKind::Io,
            },
            _ => TransportErrorKind::Other,
        };
        TransportError::with_source(kind, err)
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.as_str();
            let headers = request.headers.as_slice();
            let body = request.body.as_deref().map(str::as_bytes);

            let result = match request.method {
                HttpMethod::Get => {
                    let builder = with_headers(self.agent.get(url), headers);
                    match body {
                        Some(bytes) => builder.force_send_body().send(bytes),
                        None => builder.call(),
                    }
                }
                HttpMethod::Delete => {
                    let builder = with_headers(self.agent.delete(url), headers);
                    match body {
                        Some(bytes) => builder.force_send_body().send(bytes),
                        None => builder.call(),
                    }
                }
                HttpMethod::Post => {
                    let builder = with_headers(self.agent.post(url), headers);
                    match body {
                        Some(bytes) => builder.send(bytes),
                        None => builder.send_empty(),
                    }
                }
                HttpMethod::Put => {
                    let builder = with_headers(self.agent.put(url), headers);
                    match body {
                        Some(bytes) => builder.send(bytes),
                        None => builder.send_empty(),
                    }
                }
                HttpMethod::Patch => {
                    let builder = with_headers(self.agent.patch(url), headers);
                    match body {
                        Some(bytes) => builder.send(bytes),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(classify)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let body = response.body_mut().read_to_string().map_err(classify)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost:3002/api/as/v1/engines".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn closures_are_transports() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: req.url.clone(),
            })
        };
        let response = transport.send(&request()).unwrap();
        assert_eq!(response.body, "http://localhost:3002/api/as/v1/engines");
    }

    #[test]
    fn error_display_includes_kind_and_message() {
        let err = TransportError::new(TransportErrorKind::Timeout, "no response after 30s");
        assert_eq!(err.to_string(), "timed out: no response after 30s");
        assert_eq!(err.kind(), TransportErrorKind::Timeout);
    }

    #[test]
    fn source_is_preserved() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::with_source(TransportErrorKind::Connect, io_err);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.message(), "refused");
    }
}
