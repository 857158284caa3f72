use api::{AppConfig, AppState, router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use extract::FixedResponse;
use index::MemoryStore;
use ingest::Section;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const RESPONSE: &str = "Here are the triples:\n\
(WD-40, is a, Product)<|>\n\
(WD-40, includes, LVP Aliphatic Hydrocarbon)<|>\n";

fn document(sections: &[Section]) -> String {
    let mut text = String::new();
    for section in sections {
        text.push_str(&format!("Section {}: {}\n", section.number(), section.name()));
        match section {
            Section::Identification => text.push_str("Product Name: WD-40 Aerosol\n"),
            Section::Composition => text.push_str("LVP Aliphatic Hydrocarbon 64742-47-8 50\n"),
            _ => text.push_str("See label.\n"),
        }
    }
    text
}

fn state(dir: &TempDir, store: MemoryStore) -> AppState {
    let mut config = AppConfig::default();
    config.server.upload_dir = dir.path().join("uploads");
    config.server.static_dir = dir.path().join("static");
    config.layout.render_images = false;
    config.retry.max_retries = 0;
    AppState::new(config, Arc::new(FixedResponse::new(RESPONSE)), Arc::new(store))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, request).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
}

fn upload_request(filename: &str, content: &str) -> Request<Body> {
    let boundary = "msds-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn upload_and_extract(app: &Router) -> (String, String) {
    let (status, body) = send(app, upload_request("wd40.txt", &document(&Section::ALL))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let upload_id = body["upload_id"].as_str().unwrap().to_string();

    let (status, body) = send(app, post_empty(&format!("/api/extract/{upload_id}"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let extraction_id = body["extraction_id"].as_str().unwrap().to_string();
    (upload_id, extraction_id)
}

#[tokio::test]
async fn sections_lists_the_fixed_schema() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));

    let (status, body) = send(&app, get("/api/sections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sections"], 16);
    assert_eq!(body["required_sections"][0]["section_number"], 1);
    assert_eq!(body["required_sections"].as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn upload_reports_validation() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));

    let (status, body) = send(&app, upload_request("full.txt", &document(&Section::ALL))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["score"], 100.0);

    let (status, body) = send(&app, upload_request("partial.md", &document(&Section::ALL[..3]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["score"], 18.75);
    assert_eq!(body["missing_sections"].as_array().unwrap().len(), 13);
    assert_eq!(body["missing_sections"][0]["section_number"], 4);

    let upload_id = body["upload_id"].as_str().unwrap();
    let saved = dir.path().join("uploads").join(format!("{upload_id}_partial.md"));
    assert!(saved.exists());
}

#[tokio::test]
async fn upload_rejects_other_formats_and_missing_files() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));

    let (status, body) = send(&app, upload_request("sheet.pdf", "%PDF-1.4")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let boundary = "b";
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{boundary}--\r\n"
        )))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn extract_then_visualize() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    let (upload_id, _) = upload_and_extract(&app).await;

    // a second extraction of the same upload gets a fresh id
    let (status, body) = send(&app, post_empty(&format!("/api/extract/{upload_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triples_count"], 2);
    assert_eq!(body["triples"][0]["subject"], "WD-40");
    assert_eq!(body["quality_metrics"]["unique_subjects"], 1);
    assert_eq!(body["quality_metrics"]["unique_predicates"], 2);
    assert_eq!(body["quality_metrics"]["correct_format_percentage"], 100.0);
    let extraction_id = body["extraction_id"].as_str().unwrap();

    let (status, body) = send(&app, get(&format!("/api/visualize/{extraction_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total_nodes"], 5);
    assert_eq!(body["stats"]["total_edges"], 4);
    assert_eq!(body["stats"]["node_groups"]["predicates"], 2);
    assert!(body.get("visualization_url").is_none());
}

#[tokio::test]
async fn extraction_in_progress_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let state = state(&dir, MemoryStore::default());
    let app = router(state.clone());

    let (_, body) = send(&app, upload_request("wd40.txt", &document(&Section::ALL))).await;
    let upload_id = body["upload_id"].as_str().unwrap();

    let _running = state.in_flight.claim(upload_id).unwrap();
    let (status, body) = send(&app, post_empty(&format!("/api/extract/{upload_id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "Conflict");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));

    for request in [
        post_empty("/api/extract/missing"),
        get("/api/visualize/missing"),
        post_json("/api/approve/missing", json!({"approved": true})),
        get("/api/export/missing"),
        get("/api/graph/summary/missing"),
        get("/api/chat/suggestions/missing"),
    ] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "NotFoundError");
    }
}

#[tokio::test]
async fn approval_is_required_and_stores_the_graph() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    let (_, extraction_id) = upload_and_extract(&app).await;
    let approve_uri = format!("/api/approve/{extraction_id}");

    let (status, body) = send(&app, post_empty(&approve_uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Graph not approved for storage");

    let (status, _) = send(&app, post_json(&approve_uri, json!({"approved": false}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(&approve_uri, json!({"approved": true, "graph_name": "wd40"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["graph_iri"], "http://graph/wd40");
    assert_eq!(body["partial"], false);
    assert_eq!(body["triples_count"], 2);
    assert_eq!(body["failed_statements"], 0);
    assert!(body["instance_statements"].as_u64().unwrap() > 0);
    assert_eq!(
        body["stored_statements"].as_u64().unwrap(),
        2 + body["instance_statements"].as_u64().unwrap()
    );

    let (status, body) = send(&app, get("/api/graphs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_graphs"], 1);
    assert_eq!(body["graphs"][0]["graph_name"], "wd40");
    assert_eq!(body["graphs"][0]["validation_score"], 100.0);
}

#[tokio::test]
async fn default_graph_name_comes_from_the_extraction_id() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    let (_, extraction_id) = upload_and_extract(&app).await;

    let (status, body) = send(
        &app,
        post_json(&format!("/api/approve/{extraction_id}"), json!({"approved": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["graph_name"], format!("MSDS_Graph_{}", &extraction_id[..8]));
}

#[tokio::test]
async fn partial_store_failures_are_reported() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::new(1).with_failing_batch(0)));
    let (_, extraction_id) = upload_and_extract(&app).await;

    let (status, body) = send(
        &app,
        post_json(&format!("/api/approve/{extraction_id}"), json!({"approved": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partial"], true);
    assert_eq!(body["failed_statements"], 1);
}

#[tokio::test]
async fn chat_over_an_approved_graph() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    let (_, extraction_id) = upload_and_extract(&app).await;
    send(
        &app,
        post_json(
            &format!("/api/approve/{extraction_id}"),
            json!({"approved": true, "graph_name": "wd40"}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json("/api/chat", json!({"query": "What does WD-40 include?", "graph_name": "wd40"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["relevant_triples"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, post_json("/api/chat", json!({"query": "hazards"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Both 'query' and 'graph_name' are required");

    let (status, body) = send(&app, get("/api/graph/summary/wd40")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"]["total_triples"].as_u64().unwrap() >= 2);

    let (status, body) = send(&app, get("/api/chat/suggestions/wd40")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["suggestions"].as_array().unwrap().len() >= 10);
}

#[tokio::test]
async fn rdf_export_and_ontology() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    let (_, extraction_id) = upload_and_extract(&app).await;

    let (status, content_type, body) =
        send_raw(&app, get(&format!("/api/export/{extraction_id}?format=ntriples"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/n-triples");
    assert_eq!(body.lines().count(), 2);
    assert!(body.contains("<http://msds.com/resource/WD-40> <http://msds.com/property/is%20a> \"Product\" ."));

    let (status, content_type, body) =
        send_raw(&app, get(&format!("/api/export/{extraction_id}?format=xml"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/rdf+xml");
    assert!(body.contains("<rdf:Description rdf:about=\"http://msds.com/resource/WD-40\">"));
    assert!(body.contains(">Product</"));
    assert!(body.contains(">LVP Aliphatic Hydrocarbon</"));

    let (status, _) = send(&app, get(&format!("/api/export/{extraction_id}?format=yaml"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, content_type, body) = send_raw(&app, get("/api/ontology")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/turtle");
    assert!(body.contains("msds:MSDS_Document"));

    let (status, content_type, _) = send_raw(&app, get("/api/ontology?format=xml")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/rdf+xml");
}

#[tokio::test]
async fn health_and_metrics() {
    let dir = TempDir::new().unwrap();
    let app = router(state(&dir, MemoryStore::default()));
    upload_and_extract(&app).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/health/detailed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["generator_model"], "fixed");
    assert_eq!(body["uploads"], 1);
    assert_eq!(body["extractions"], 1);

    let (_, body) = send(&app, get("/api/metrics")).await;
    assert_eq!(body["uploads"], 1);
    assert_eq!(body["extractions"], 1);
    assert_eq!(body["total_triples_extracted"], 2);
    assert!(body["successful_requests"].as_u64().unwrap() >= 4);
}
