//! Endpoint descriptors and route-parameter resolution.
//!
//! # Design
//! An `EndpointSpec` is data, not behavior: a verb, a URI template with
//! `{name}` placeholders and the ordered route-parameter names. The template
//! is parsed once on construction and checked against the declared names, so
//! `resolve` only has to look values up and percent-encode them. `resolve`
//! is pure and performs no I/O.

use std::collections::{BTreeMap, HashMap};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::debug;

use crate::error::{ClientError, EndpointError};
use crate::http::HttpMethod;

/// Characters escaped inside a single path segment. `/` and `%` are included
/// so a value can never introduce a new segment or a pre-encoded sequence.
pub(crate) const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// One REST operation: verb, URI template and declared route parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    method: HttpMethod,
    uri_template: String,
    route_params: Vec<String>,
    segments: Vec<Segment>,
}

/// A request with every placeholder substituted, relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl EndpointSpec {
    /// Validates that `uri_template` and `route_params` name the same set of
    /// parameters.
    pub fn new<S: Into<String>>(
        method: HttpMethod,
        uri_template: impl Into<String>,
        route_params: impl IntoIterator<Item = S>,
    ) -> Result<Self, EndpointError> {
        let uri_template = uri_template.into();
        let segments = parse_template(&uri_template)?;

        let mut declared: Vec<String> = Vec::new();
        for name in route_params.into_iter().map(Into::into) {
            if declared.contains(&name) {
                return Err(EndpointError::DuplicateRouteParameter {
                    template: uri_template,
                    name,
                });
            }
            declared.push(name);
        }

        for segment in &segments {
            if let Segment::Param(name) = segment {
                if !declared.contains(name) {
                    return Err(EndpointError::UndeclaredToken {
                        template: uri_template.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        if let Some(unused) = declared
            .iter()
            .find(|name| !segments.contains(&Segment::Param((*name).clone())))
        {
            return Err(EndpointError::UnusedRouteParameter {
                name: unused.clone(),
                template: uri_template,
            });
        }

        Ok(Self {
            method,
            uri_template,
            route_params: declared,
            segments,
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    pub fn route_params(&self) -> &[String] {
        &self.route_params
    }

    /// Substitutes every declared route parameter and attaches `body` and
    /// `query` unchanged. Keys in `params` that the template does not use are
    /// ignored. Empty, `.` and `..` values are rejected.
    pub fn resolve(
        &self,
        params: &HashMap<&str, &str>,
        body: Option<serde_json::Value>,
        query: BTreeMap<String, String>,
    ) -> Result<ResolvedRequest, ClientError> {
        let mut values: HashMap<&str, &str> = HashMap::with_capacity(self.route_params.len());
        for name in &self.route_params {
            let value = params.get(name.as_str()).copied().ok_or_else(|| {
                ClientError::MissingRouteParameter {
                    template: self.uri_template.clone(),
                    name: name.clone(),
                }
            })?;
            if is_dot_or_empty(value) {
                return Err(ClientError::InvalidRouteParameter {
                    template: self.uri_template.clone(),
                    name: name.clone(),
                    value: value.to_string(),
                });
            }
            values.insert(name.as_str(), value);
        }

        let mut path = String::with_capacity(self.uri_template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(name) => {
                    // Every token is declared, and every declared name was found above.
                    let value = values.get(name.as_str()).copied().unwrap_or_default();
                    path.extend(utf8_percent_encode(value, PATH_SEGMENT));
                }
            }
        }

        debug!(method = %self.method, template = %self.uri_template, %path, "resolved endpoint");

        Ok(ResolvedRequest {
            method: self.method,
            path,
            query,
            body,
        })
    }
}

/// Values that URL normalisers treat as a dot segment or an empty segment.
/// Escaping does not help: `%2E` is decoded back to `.` before dot removal.
fn is_dot_or_empty(value: &str) -> bool {
    matches!(value, "" | "." | "..")
}

fn parse_template(template: &str) -> Result<Vec<Segment>, EndpointError> {
    let malformed = |position| EndpointError::MalformedTemplate {
        template: template.to_string(),
        position,
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((at, '{')) => return Err(malformed(at)),
                        Some((_, c)) => name.push(c),
                        None => return Err(malformed(position)),
                    }
                }
                if name.is_empty() {
                    return Err(malformed(position));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Param(name));
            }
            '}' => return Err(malformed(position)),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
