//! In-memory App Search mock covering engines, curations and synonym sets.
//!
//! Routes are nested under `/api/as/v1` and answer with the same JSON shapes
//! and `{"errors": [...]}` bodies as the real service.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/as/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
    #[serde(rename = "type")]
    pub engine_type: String,
    pub language: Option<String>,
    pub document_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curation {
    pub id: String,
    pub queries: Vec<String>,
    pub promoted: Vec<String>,
    pub hidden: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymSet {
    pub id: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageMeta {
    pub current: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub size: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMeta {
    pub page: PageMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub meta: ListMeta,
    pub results: Vec<T>,
}

#[derive(Deserialize)]
pub struct CreateEngine {
    pub name: String,
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct CurationInput {
    pub queries: Vec<String>,
    #[serde(default)]
    pub promoted: Vec<String>,
    #[serde(default)]
    pub hidden: Vec<String>,
}

#[derive(Deserialize)]
pub struct SynonymSetInput {
    pub synonyms: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "page[current]")]
    pub current: Option<u32>,
    #[serde(rename = "page[size]")]
    pub size: Option<u32>,
}

#[derive(Debug)]
struct EngineRecord {
    engine: Engine,
    curations: Vec<Curation>,
    synonyms: Vec<SynonymSet>,
}

type Db = Arc<RwLock<BTreeMap<String, EngineRecord>>>;

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            errors: vec![message.to_string()],
        }),
    )
}

/// `Json` extractor whose rejections use the `{"errors": [...]}` body.
struct AppJson<T>(T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(error(rejection.status(), &rejection.body_text())),
        }
    }
}

fn engine_not_found() -> ApiError {
    error(StatusCode::NOT_FOUND, "Could not find engine.")
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    let api = Router::new()
        .route("/engines", get(list_engines).post(create_engine))
        .route("/engines/{engine_name}", get(get_engine).delete(delete_engine))
        .route(
            "/engines/{engine_name}/curations",
            get(list_curations).post(create_curation),
        )
        .route(
            "/engines/{engine_name}/curations/{curation_id}",
            get(get_curation).put(update_curation).delete(delete_curation),
        )
        .route(
            "/engines/{engine_name}/synonyms",
            get(list_synonym_sets).post(create_synonym_set),
        )
        .route(
            "/engines/{engine_name}/synonyms/{synonym_set_id}",
            get(get_synonym_set).put(update_synonym_set).delete(delete_synonym_set),
        )
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock App Search listening");
    }
    axum::serve(listener, app()).await
}

fn paginate<T: Clone>(items: &[T], params: &PageParams) -> Result<ListResponse<T>, ApiError> {
    let current = params.current.unwrap_or(1);
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if current == 0 || size == 0 {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Page current and size must be greater than zero",
        ));
    }

    let total_results = items.len() as u32;
    let total_pages = total_results.div_ceil(size);
    let start = ((current - 1) as usize).saturating_mul(size as usize);
    let results = items.iter().skip(start).take(size as usize).cloned().collect();

    Ok(ListResponse {
        meta: ListMeta {
            page: PageMeta {
                current,
                total_pages,
                total_results,
                size,
            },
        },
        results,
    })
}

fn valid_engine_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

async fn list_engines(
    State(db): State<Db>,
    Query(page): Query<PageParams>,
) -> ApiResult<ListResponse<Engine>> {
    let engines: Vec<Engine> = db.read().await.values().map(|r| r.engine.clone()).collect();
    paginate(&engines, &page).map(Json)
}

async fn create_engine(
    State(db): State<Db>,
    AppJson(input): AppJson<CreateEngine>,
) -> ApiResult<Engine> {
    if !valid_engine_name(&input.name) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Name must only contain lowercase letters, numbers, and hyphens",
        ));
    }

    let mut engines = db.write().await;
    if engines.contains_key(&input.name) {
        return Err(error(StatusCode::BAD_REQUEST, "Name is already taken"));
    }

    let engine = Engine {
        name: input.name,
        engine_type: "default".to_string(),
        language: input.language,
        document_count: 0,
    };
    debug!(engine = %engine.name, "created engine");
    engines.insert(
        engine.name.clone(),
        EngineRecord {
            engine: engine.clone(),
            curations: Vec::new(),
            synonyms: Vec::new(),
        },
    );
    Ok(Json(engine))
}

async fn get_engine(State(db): State<Db>, Path(engine_name): Path<String>) -> ApiResult<Engine> {
    let engines = db.read().await;
    engines
        .get(&engine_name)
        .map(|r| Json(r.engine.clone()))
        .ok_or_else(engine_not_found)
}

async fn delete_engine(
    State(db): State<Db>,
    Path(engine_name): Path<String>,
) -> ApiResult<serde_json::Value> {
    let removed = db.write().await.remove(&engine_name);
    removed
        .map(|_| Json(serde_json::json!({ "deleted": true })))
        .ok_or_else(engine_not_found)
}

async fn list_curations(
    State(db): State<Db>,
    Path(engine_name): Path<String>,
    Query(page): Query<PageParams>,
) -> ApiResult<ListResponse<Curation>> {
    let engines = db.read().await;
    let record = engines.get(&engine_name).ok_or_else(engine_not_found)?;
    paginate(&record.curations, &page).map(Json)
}

fn check_queries(input: &CurationInput) -> Result<(), ApiError> {
    if input.queries.is_empty() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Queries must contain at least one query",
        ));
    }
    Ok(())
}

async fn create_curation(
    State(db): State<Db>,
    Path(engine_name): Path<String>,
    AppJson(input): AppJson<CurationInput>,
) -> ApiResult<serde_json::Value> {
    check_queries(&input)?;
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let id = format!("cur-{}", Uuid::new_v4().simple());
    record.curations.push(Curation {
        id: id.clone(),
        queries: input.queries,
        promoted: input.promoted,
        hidden: input.hidden,
    });
    Ok(Json(serde_json::json!({ "id": id })))
}

async fn get_curation(
    State(db): State<Db>,
    Path((engine_name, curation_id)): Path<(String, String)>,
) -> ApiResult<Curation> {
    let engines = db.read().await;
    let record = engines.get(&engine_name).ok_or_else(engine_not_found)?;
    record
        .curations
        .iter()
        .find(|c| c.id == curation_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Curation not found"))
}

async fn update_curation(
    State(db): State<Db>,
    Path((engine_name, curation_id)): Path<(String, String)>,
    AppJson(input): AppJson<CurationInput>,
) -> ApiResult<serde_json::Value> {
    check_queries(&input)?;
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let curation = record
        .curations
        .iter_mut()
        .find(|c| c.id == curation_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Curation not found"))?;
    curation.queries = input.queries;
    curation.promoted = input.promoted;
    curation.hidden = input.hidden;
    Ok(Json(serde_json::json!({ "id": curation.id })))
}

async fn delete_curation(
    State(db): State<Db>,
    Path((engine_name, curation_id)): Path<(String, String)>,
) -> ApiResult<serde_json::Value> {
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let before = record.curations.len();
    record.curations.retain(|c| c.id != curation_id);
    if record.curations.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Curation not found"));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_synonym_sets(
    State(db): State<Db>,
    Path(engine_name): Path<String>,
    Query(page): Query<PageParams>,
) -> ApiResult<ListResponse<SynonymSet>> {
    let engines = db.read().await;
    let record = engines.get(&engine_name).ok_or_else(engine_not_found)?;
    paginate(&record.synonyms, &page).map(Json)
}

fn check_synonyms(input: &SynonymSetInput) -> Result<(), ApiError> {
    if input.synonyms.len() < 2 {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Synonyms must contain at least two synonyms",
        ));
    }
    Ok(())
}

async fn create_synonym_set(
    State(db): State<Db>,
    Path(engine_name): Path<String>,
    AppJson(input): AppJson<SynonymSetInput>,
) -> ApiResult<SynonymSet> {
    check_synonyms(&input)?;
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let set = SynonymSet {
        id: format!("syn-{}", Uuid::new_v4().simple()),
        synonyms: input.synonyms,
    };
    record.synonyms.push(set.clone());
    Ok(Json(set))
}

async fn get_synonym_set(
    State(db): State<Db>,
    Path((engine_name, synonym_set_id)): Path<(String, String)>,
) -> ApiResult<SynonymSet> {
    let engines = db.read().await;
    let record = engines.get(&engine_name).ok_or_else(engine_not_found)?;
    record
        .synonyms
        .iter()
        .find(|s| s.id == synonym_set_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Synonym set not found"))
}

async fn update_synonym_set(
    State(db): State<Db>,
    Path((engine_name, synonym_set_id)): Path<(String, String)>,
    AppJson(input): AppJson<SynonymSetInput>,
) -> ApiResult<SynonymSet> {
    check_synonyms(&input)?;
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let set = record
        .synonyms
        .iter_mut()
        .find(|s| s.id == synonym_set_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Synonym set not found"))?;
    set.synonyms = input.synonyms;
    Ok(Json(set.clone()))
}

async fn delete_synonym_set(
    State(db): State<Db>,
    Path((engine_name, synonym_set_id)): Path<(String, String)>,
) -> ApiResult<serde_json::Value> {
    let mut engines = db.write().await;
    let record = engines.get_mut(&engine_name).ok_or_else(engine_not_found)?;
    let before = record.synonyms.len();
    record.synonyms.retain(|s| s.id != synonym_set_id);
    if record.synonyms.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Synonym set not found"));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
