//! Request and response DTOs for the App Search management API.
//!
//! # Design
//! These types mirror the JSON documented by App Search but are defined
//! independently from the mock-server crate; the integration tests catch
//! schema drift between the two. Unknown response fields are ignored so newer
//! servers stay readable.

use serde::{Deserialize, Serialize};

/// Page cursor for list operations, sent as `page[current]` / `page[size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub current: u32,
    pub size: u32,
}

impl Page {
    pub fn new(current: u32, size: u32) -> Self {
        Self { current, size }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    pub page: PageMeta,
}

/// Envelope returned by every list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub meta: ListMeta,
    pub results: Vec<T>,
}

/// Acknowledgement returned by delete operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Error body returned by App Search for 4xx and 5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
    #[serde(rename = "type", default = "default_engine_type")]
    pub engine_type: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub document_count: u64,
}

fn default_engine_type() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEngine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Promoted and hidden documents for a set of queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curation {
    pub id: String,
    pub queries: Vec<String>,
    #[serde(default)]
    pub promoted: Vec<String>,
    #[serde(default)]
    pub hidden: Vec<String>,
}

/// Body of create and update curation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationInput {
    pub queries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promoted: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<String>,
}

/// Create and update curation operations only return the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymSet {
    pub id: String,
    pub synonyms: Vec<String>,
}

/// Body of create and update synonym set requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymSetInput {
    pub synonyms: Vec<String>,
}
