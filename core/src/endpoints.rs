//! Every App Search operation, declared as an `EndpointSpec` value.
//!
//! # Design
//! Operations are keys into a registry rather than types. The registry is
//! built and validated once, on first use, and shared read-only for the rest
//! of the process.

use std::fmt;
use std::sync::LazyLock;

use crate::endpoint::EndpointSpec;
use crate::error::EndpointError;
use crate::http::HttpMethod;

/// Names one registered App Search operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListEngines,
    CreateEngine,
    GetEngine,
    DeleteEngine,
    ListCurations,
    CreateCuration,
    GetCuration,
    UpdateCuration,
    DeleteCuration,
    ListSynonymSets,
    CreateSynonymSet,
    GetSynonymSet,
    UpdateSynonymSet,
    DeleteSynonymSet,
}

impl Operation {
    pub const ALL: [Operation; 14] = [
        Operation::ListEngines,
        Operation::CreateEngine,
        Operation::GetEngine,
        Operation::DeleteEngine,
        Operation::ListCurations,
        Operation::CreateCuration,
        Operation::GetCuration,
        Operation::UpdateCuration,
        Operation::DeleteCuration,
        Operation::ListSynonymSets,
        Operation::CreateSynonymSet,
        Operation::GetSynonymSet,
        Operation::UpdateSynonymSet,
        Operation::DeleteSynonymSet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::ListEngines => "ListEngines",
            Operation::CreateEngine => "CreateEngine",
            Operation::GetEngine => "GetEngine",
            Operation::DeleteEngine => "DeleteEngine",
            Operation::ListCurations => "ListCurations",
            Operation::CreateCuration => "CreateCuration",
            Operation::GetCuration => "GetCuration",
            Operation::UpdateCuration => "UpdateCuration",
            Operation::DeleteCuration => "DeleteCuration",
            Operation::ListSynonymSets => "ListSynonymSets",
            Operation::CreateSynonymSet => "CreateSynonymSet",
            Operation::GetSynonymSet => "GetSynonymSet",
            Operation::UpdateSynonymSet => "UpdateSynonymSet",
            Operation::DeleteSynonymSet => "DeleteSynonymSet",
        }
    }

    fn declaration(self) -> (HttpMethod, &'static str, &'static [&'static str]) {
        use HttpMethod::{Delete, Get, Post, Put};

        const NONE: &[&str] = &[];
        const ENGINE: &[&str] = &["engine_name"];
        const CURATION: &[&str] = &["engine_name", "curation_id"];
        const SYNONYM_SET: &[&str] = &["engine_name", "synonym_set_id"];

        const CURATIONS: &str = "/engines/{engine_name}/curations";
        const CURATION_ITEM: &str = "/engines/{engine_name}/curations/{curation_id}";
        const SYNONYMS: &str = "/engines/{engine_name}/synonyms";
        const SYNONYM_ITEM: &str = "/engines/{engine_name}/synonyms/{synonym_set_id}";

        match self {
            Operation::ListEngines => (Get, "/engines", NONE),
            Operation::CreateEngine => (Post, "/engines", NONE),
            Operation::GetEngine => (Get, "/engines/{engine_name}", ENGINE),
            Operation::DeleteEngine => (Delete, "/engines/{engine_name}", ENGINE),
            Operation::ListCurations => (Get, CURATIONS, ENGINE),
            Operation::CreateCuration => (Post, CURATIONS, ENGINE),
            Operation::GetCuration => (Get, CURATION_ITEM, CURATION),
            Operation::UpdateCuration => (Put, CURATION_ITEM, CURATION),
            Operation::DeleteCuration => (Delete, CURATION_ITEM, CURATION),
            Operation::ListSynonymSets => (Get, SYNONYMS, ENGINE),
            Operation::CreateSynonymSet => (Post, SYNONYMS, ENGINE),
            Operation::GetSynonymSet => (Get, SYNONYM_ITEM, SYNONYM_SET),
            Operation::UpdateSynonymSet => (Put, SYNONYM_ITEM, SYNONYM_SET),
            Operation::DeleteSynonymSet => (Delete, SYNONYM_ITEM, SYNONYM_SET),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static REGISTRY: LazyLock<Result<Registry, EndpointError>> = LazyLock::new(Registry::build);

/// Validated `EndpointSpec` for every `Operation`, stored in `Operation::ALL`
/// order.
#[derive(Debug)]
pub struct Registry {
    specs: Vec<EndpointSpec>,
}

impl Registry {
    /// The process-wide registry, built on first call.
    pub fn global() -> Result<&'static Registry, EndpointError> {
        REGISTRY.as_ref().map_err(Clone::clone)
    }

    pub fn build() -> Result<Self, EndpointError> {
        let specs = Operation::ALL
            .iter()
            .map(|op| {
                let (method, template, params) = op.declaration();
                EndpointSpec::new(method, template, params.iter().copied())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specs })
    }

    pub fn get(&self, op: Operation) -> &EndpointSpec {
        &self.specs[op as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &EndpointSpec)> {
        Operation::ALL.iter().copied().zip(self.specs.iter())
    }
}
