//! Request builder, response classifier and typed operations for App Search.
//!
//! # Design
//! `AppSearchClient` holds only its configuration and a reference to the
//! process-wide endpoint registry; it carries no mutable state between calls.
//! Each operation is split into `build` (produces an absolute `HttpRequest`)
//! and `parse` (classifies and decodes an `HttpResponse`). Hosts that want to
//! drive the I/O themselves use those two directly. The typed methods run the
//! round-trip through a caller-supplied `Transport`, exactly once per call.

use std::collections::{BTreeMap, HashMap};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoints::{Operation, Registry};
use crate::error::{ClientError, EndpointError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    CreateEngine, Curation, CurationId, CurationInput, DeleteResponse, Engine, ErrorBody,
    ListResponse, Page, SynonymSet, SynonymSetInput,
};

/// Path prefix of the App Search v1 API.
pub const API_PREFIX: &str = "/api/as/v1";

/// Everything except RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Route parameters keyed by the names used in the URI templates.
pub type RouteParams<'a> = HashMap<&'a str, &'a str>;

/// Stateless client for the App Search management API.
#[derive(Debug, Clone)]
pub struct AppSearchClient {
    config: ClientConfig,
    registry: &'static Registry,
}

impl AppSearchClient {
    pub fn new(config: ClientConfig) -> Result<Self, EndpointError> {
        Ok(Self {
            config,
            registry: Registry::global()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves `op` and turns it into an absolute request with auth and
    /// content-type headers.
    pub fn build(
        &self,
        op: Operation,
        params: &RouteParams<'_>,
        body: Option<serde_json::Value>,
        query: BTreeMap<String, String>,
    ) -> Result<HttpRequest, ClientError> {
        let resolved = self.registry.get(op).resolve(params, body, query)?;

        let mut url = format!("{}{}{}", self.config.base_url(), API_PREFIX, resolved.path);
        if !resolved.query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&resolved.query));
        }

        let mut headers = Vec::new();
        if let Some(api_key) = self.config.api_key() {
            headers.push(("authorization".to_string(), format!("Bearer {api_key}")));
        }

        let body = match resolved.body {
            Some(value) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(&value)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: resolved.method,
            url,
            headers,
            body,
        })
    }

    /// Maps 4xx/5xx statuses to `ClientError::Api` and decodes anything else
    /// as `T`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ClientError> {
        if response.is_error_status() {
            let errors = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|body| body.errors)
                .unwrap_or_default();
            warn!(status = response.status, ?errors, "App Search returned an error status");
            return Err(ClientError::Api {
                status: response.status,
                errors,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|source| {
            warn!(status = response.status, error = %source, "response body did not decode");
            ClientError::Serialization { source }
        })
    }

    /// Builds `op`, sends it once through `transport` and parses the answer.
    pub fn call<T: DeserializeOwned>(
        &self,
        transport: &dyn Transport,
        op: Operation,
        params: &RouteParams<'_>,
        body: Option<serde_json::Value>,
        query: BTreeMap<String, String>,
    ) -> Result<T, ClientError> {
        let request = self.build(op, params, body, query)?;
        debug!(operation = %op, method = %request.method, url = %request.url, "sending request");

        let response = transport.send(&request).map_err(|source| {
            warn!(operation = %op, error = %source, "transport failed");
            ClientError::Connection { source }
        })?;
        debug!(operation = %op, status = response.status, "received response");

        self.parse(response)
    }

    pub fn list_engines(
        &self,
        transport: &dyn Transport,
        page: Option<Page>,
    ) -> Result<ListResponse<Engine>, ClientError> {
        self.call(transport, Operation::ListEngines, &RouteParams::new(), None, page_query(page))
    }

    pub fn create_engine(
        &self,
        transport: &dyn Transport,
        input: &CreateEngine,
    ) -> Result<Engine, ClientError> {
        let body = json_body(input)?;
        self.call(transport, Operation::CreateEngine, &RouteParams::new(), body, BTreeMap::new())
    }

    pub fn get_engine(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
    ) -> Result<Engine, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        self.call(transport, Operation::GetEngine, &params, None, BTreeMap::new())
    }

    pub fn delete_engine(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
    ) -> Result<DeleteResponse, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        self.call(transport, Operation::DeleteEngine, &params, None, BTreeMap::new())
    }

    pub fn list_curations(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        page: Option<Page>,
    ) -> Result<ListResponse<Curation>, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        self.call(transport, Operation::ListCurations, &params, None, page_query(page))
    }

    pub fn create_curation(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        input: &CurationInput,
    ) -> Result<CurationId, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        let body = json_body(input)?;
        self.call(transport, Operation::CreateCuration, &params, body, BTreeMap::new())
    }

    pub fn get_curation(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        curation_id: &str,
    ) -> Result<Curation, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("curation_id", curation_id),
        ]);
        self.call(transport, Operation::GetCuration, &params, None, BTreeMap::new())
    }

    pub fn update_curation(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        curation_id: &str,
        input: &CurationInput,
    ) -> Result<CurationId, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("curation_id", curation_id),
        ]);
        let body = json_body(input)?;
        self.call(transport, Operation::UpdateCuration, &params, body, BTreeMap::new())
    }

    pub fn delete_curation(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        curation_id: &str,
    ) -> Result<DeleteResponse, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("curation_id", curation_id),
        ]);
        self.call(transport, Operation::DeleteCuration, &params, None, BTreeMap::new())
    }

    pub fn list_synonym_sets(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        page: Option<Page>,
    ) -> Result<ListResponse<SynonymSet>, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        self.call(transport, Operation::ListSynonymSets, &params, None, page_query(page))
    }

    pub fn create_synonym_set(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        input: &SynonymSetInput,
    ) -> Result<SynonymSet, ClientError> {
        let params = RouteParams::from([("engine_name", engine_name)]);
        let body = json_body(input)?;
        self.call(transport, Operation::CreateSynonymSet, &params, body, BTreeMap::new())
    }

    pub fn get_synonym_set(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        synonym_set_id: &str,
    ) -> Result<SynonymSet, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("synonym_set_id", synonym_set_id),
        ]);
        self.call(transport, Operation::GetSynonymSet, &params, None, BTreeMap::new())
    }

    pub fn update_synonym_set(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        synonym_set_id: &str,
        input: &SynonymSetInput,
    ) -> Result<SynonymSet, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("synonym_set_id", synonym_set_id),
        ]);
        let body = json_body(input)?;
        self.call(transport, Operation::UpdateSynonymSet, &params, body, BTreeMap::new())
    }

    pub fn delete_synonym_set(
        &self,
        transport: &dyn Transport,
        engine_name: &str,
        synonym_set_id: &str,
    ) -> Result<DeleteResponse, ClientError> {
        let params = RouteParams::from([
            ("engine_name", engine_name),
            ("synonym_set_id", synonym_set_id),
        ]);
        self.call(transport, Operation::DeleteSynonymSet, &params, None, BTreeMap::new())
    }
}

fn json_body<T: Serialize>(input: &T) -> Result<Option<serde_json::Value>, ClientError> {
    Ok(Some(serde_json::to_value(input)?))
}

fn page_query(page: Option<Page>) -> BTreeMap<String, String> {
    let mut query = BTreeMap::new();
    if let Some(page) = page {
        query.insert("page[current]".to_string(), page.current.to_string());
        query.insert("page[size]".to_string(), page.size.to_string());
    }
    query
}

fn encode_query(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
