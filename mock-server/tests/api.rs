use appsearch_mock_server::{app, Curation, Engine, ErrorBody, ListResponse, SynonymSet};
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

type MockService = axum::routing::RouterIntoService<String>;

async fn send(app: &mut MockService, req: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

fn service() -> MockService {
    let router: Router = app();
    router.into_service()
}

// --- engines ---

#[tokio::test]
async fn list_engines_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/as/v1/engines"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: ListResponse<Engine> = body_json(resp).await;
    assert!(list.results.is_empty());
    assert_eq!(list.meta.page.current, 1);
    assert_eq!(list.meta.page.total_results, 0);
}

#[tokio::test]
async fn create_engine_returns_engine() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/as/v1/engines",
            r#"{"name":"music","language":"en"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let engine: Engine = body_json(resp).await;
    assert_eq!(engine.name, "music");
    assert_eq!(engine.engine_type, "default");
    assert_eq!(engine.language.as_deref(), Some("en"));
}

#[tokio::test]
async fn create_engine_invalid_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/as/v1/engines", r#"{"name":"Not Valid"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors.len(), 1);
}

#[tokio::test]
async fn create_engine_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/as/v1/engines", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors.len(), 1);
}

#[tokio::test]
async fn create_engine_invalid_syntax_has_error_body() {
    let resp = app()
        .oneshot(json_request("POST", "/api/as/v1/engines", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors.len(), 1);
}

#[tokio::test]
async fn create_engine_without_content_type_has_error_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/as/v1/engines")
                .body(r#"{"name":"music"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: ErrorBody = body_json(resp).await;
    assert!(!body.errors.is_empty());
}

#[tokio::test]
async fn duplicate_engine_name_returns_400() {
    let mut app = service();
    let create = || json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#);
    let resp = send(&mut app, create()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, create()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors, vec!["Name is already taken"]);
}

#[tokio::test]
async fn get_engine_not_found_has_error_body() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/as/v1/engines/missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors, vec!["Could not find engine."]);
}

#[tokio::test]
async fn routes_outside_prefix_are_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/engines"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- curations ---

#[tokio::test]
async fn curation_on_missing_engine_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/as/v1/engines/missing/curations/cur-1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn curation_lifecycle() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;

    // create
    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/as/v1/engines/music/curations",
            r#"{"queries":["jazz"],"promoted":["doc-1"]}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: serde_json::Value = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("cur-"));
    let item = format!("/api/as/v1/engines/music/curations/{id}");

    // get
    let resp = send(&mut app, empty_request("GET", &item)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let curation: Curation = body_json(resp).await;
    assert_eq!(curation.queries, vec!["jazz"]);
    assert_eq!(curation.promoted, vec!["doc-1"]);
    assert!(curation.hidden.is_empty());

    // update
    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &item,
            r#"{"queries":["jazz","blues"],"hidden":["doc-2"]}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // list
    let resp = send(&mut app, empty_request("GET", "/api/as/v1/engines/music/curations")).await;
    let list: ListResponse<Curation> = body_json(resp).await;
    assert_eq!(list.results.len(), 1);
    assert_eq!(list.results[0].queries, vec!["jazz", "blues"]);
    assert_eq!(list.results[0].hidden, vec!["doc-2"]);
    assert!(list.results[0].promoted.is_empty());

    // delete
    let resp = send(&mut app, empty_request("DELETE", &item)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: serde_json::Value = body_json(resp).await;
    assert_eq!(deleted["deleted"], true);

    // get after delete
    let resp = send(&mut app, empty_request("GET", &item)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn curation_missing_queries_field_has_error_body() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/api/as/v1/engines/music/curations", r#"{"promoted":["doc-1"]}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.errors.len(), 1);
    assert!(body.errors[0].contains("queries"), "{:?}", body.errors);
}

#[tokio::test]
async fn curation_without_queries_returns_400() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/api/as/v1/engines/music/curations", r#"{"queries":[]}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- synonyms ---

#[tokio::test]
async fn synonym_set_lifecycle() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;

    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/api/as/v1/engines/music/synonyms",
            r#"{"synonyms":["song","track"]}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: SynonymSet = body_json(resp).await;
    assert!(created.id.starts_with("syn-"));
    let id = created.id.clone();
    let item = format!("/api/as/v1/engines/music/synonyms/{id}");

    let resp = send(
        &mut app,
        json_request(
            "PUT",
            &item,
            r#"{"synonyms":["song","track","tune"]}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: SynonymSet = body_json(resp).await;
    assert_eq!(updated.id, id);
    assert_eq!(updated.synonyms.len(), 3);

    let resp = send(&mut app, empty_request("GET", &item)).await;
    let fetched: SynonymSet = body_json(resp).await;
    assert_eq!(fetched, updated);

    let resp = send(&mut app, empty_request("DELETE", &item)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, empty_request("DELETE", &item)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn synonym_set_needs_two_synonyms() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/api/as/v1/engines/music/synonyms", r#"{"synonyms":["alone"]}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn synonym_sets_paginate() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;
    for i in 0..3 {
        let body = format!(r#"{{"synonyms":["a{i}","b{i}"]}}"#);
        send(&mut app, json_request("POST", "/api/as/v1/engines/music/synonyms", &body)).await;
    }

    let resp = send(
        &mut app,
        empty_request(
            "GET",
            "/api/as/v1/engines/music/synonyms?page%5Bcurrent%5D=2&page%5Bsize%5D=2",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: ListResponse<SynonymSet> = body_json(resp).await;
    assert_eq!(list.meta.page.current, 2);
    assert_eq!(list.meta.page.total_pages, 2);
    assert_eq!(list.meta.page.total_results, 3);
    assert_eq!(list.results.len(), 1);
    assert_eq!(list.results[0].synonyms, vec!["a2", "b2"]);
}

// --- engine deletion cascades ---

#[tokio::test]
async fn deleting_engine_removes_children() {
    let mut app = service();
    send(&mut app, json_request("POST", "/api/as/v1/engines", r#"{"name":"music"}"#)).await;
    send(
        &mut app,
        json_request(
            "POST",
            "/api/as/v1/engines/music/synonyms",
            r#"{"synonyms":["song","track"]}"#,
        ),
    )
    .await;

    let resp = send(&mut app, empty_request("DELETE", "/api/as/v1/engines/music")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"deleted":true}"#);

    let resp = send(&mut app, empty_request("GET", "/api/as/v1/engines/music/synonyms")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
