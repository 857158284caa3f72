use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, Request, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use extract::{EMPTY_YIELD_MESSAGE, QualityMetrics, Triple};
use index::{GraphInfo, StoreHealth, default_graph_name, graph_iri};
use ingest::{FileReader, Section, SectionRequirements, generate_doc_id, section_requirements, validate_bytes};
use layout::{GraphLayout, RenderOptions, render_png};
use ontology::{RdfFormat, document_statements, serialize, triple_statements};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path as FsPath;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{MetricsSnapshot, TimedOperation};
use crate::session::{ExtractionSession, UploadSession, sanitize_filename};
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(health_detailed))
        .route("/api/sections", get(sections))
        .route("/api/upload", post(upload))
        .route("/api/extract/:upload_id", post(extract_graph))
        .route("/api/visualize/:extraction_id", get(visualize))
        .route("/api/approve/:extraction_id", post(approve))
        .route("/api/export/:extraction_id", get(export))
        .route("/api/ontology", get(ontology_schema))
        .route("/api/graphs", get(list_graphs))
        .route("/api/chat", post(chat))
        .route("/api/chat/suggestions/:graph_name", get(chat_suggestions))
        .route("/api/graph/summary/:graph_name", get(graph_summary))
        .route("/api/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    state.metrics.record_request(response.status().is_success());
    response
}

fn io_error(context: &str, e: std::io::Error) -> ApiError {
    ApiError::Internal(format!("{context}: {e}"))
}

// ---- health ----

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Serialize)]
struct DetailedHealth {
    status: &'static str,
    timestamp: String,
    store: StoreHealth,
    generator_model: String,
    uploads: usize,
    extractions: usize,
    extractions_running: usize,
}

async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealth> {
    let store = state.store.health().await;
    Json(DetailedHealth {
        status: if store.reachable { "healthy" } else { "degraded" },
        timestamp: Utc::now().to_rfc3339(),
        store,
        generator_model: state.extractor.generator().model().to_string(),
        uploads: state.uploads.len(),
        extractions: state.extractions.len(),
        extractions_running: state.in_flight.len(),
    })
}

#[derive(Serialize)]
struct SectionsResponse {
    success: bool,
    #[serde(flatten)]
    requirements: SectionRequirements,
}

async fn sections() -> Json<SectionsResponse> {
    Json(SectionsResponse {
        success: true,
        requirements: section_requirements(),
    })
}

// ---- upload / extract ----

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    upload_id: String,
    filename: String,
    is_valid: bool,
    score: f64,
    missing_sections: Vec<Section>,
    found_sections: Vec<Section>,
    sections_found_count: usize,
    total_sections_required: usize,
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        file = Some((original, data));
        break;
    }

    let (original, data) = file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let filename = sanitize_filename(&original);
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }
    if !FileReader::is_supported(FsPath::new(&filename)) {
        return Err(ApiError::BadRequest(format!(
            "Only {} files are allowed",
            FileReader::TEXT_EXTENSIONS.join(", ")
        )));
    }

    let upload_id = Uuid::new_v4().to_string();
    let upload_dir = &state.config.server.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| io_error("Failed to create upload directory", e))?;
    let path = upload_dir.join(format!("{upload_id}_{filename}"));
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| io_error("Failed to save upload", e))?;

    let validation = validate_bytes(&data);
    info!(
        upload_id = %upload_id,
        path = %path.display(),
        score = validation.score,
        "File uploaded"
    );

    let session = state.uploads.put(
        upload_id.clone(),
        UploadSession {
            upload_id: upload_id.clone(),
            filename: filename.clone(),
            path,
            uploaded: Utc::now(),
            validation,
        },
    )?;
    state.metrics.record_upload();

    let validation = &session.validation;
    Ok(Json(UploadResponse {
        success: true,
        upload_id,
        filename,
        is_valid: validation.is_valid,
        score: validation.score,
        missing_sections: validation.missing.clone(),
        found_sections: validation.found.clone(),
        sections_found_count: validation.sections_found_count(),
        total_sections_required: validation.total_sections_required(),
    }))
}

#[derive(Serialize)]
struct ExtractResponse<'a> {
    success: bool,
    extraction_id: &'a str,
    upload_id: &'a str,
    triples: &'a [Triple],
    triples_count: usize,
    quality_metrics: &'a QualityMetrics,
    document_pages: usize,
    document_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

async fn extract_graph(State(state): State<AppState>, Path(upload_id): Path<String>) -> ApiResult<Response> {
    let upload = state.uploads.get(&upload_id)?;
    let _claim = state.in_flight.claim(&upload_id)?;

    if !upload.validation.is_valid {
        warn!(upload_id = %upload_id, score = upload.validation.score, "Extracting from invalid MSDS");
    }

    let document = FileReader::read_file(&upload.path).await?;
    let timer = TimedOperation::start();
    let prompt = state.extractor.build_prompt(&document);
    let generator = state.extractor.generator();
    let response = state
        .retry
        .retry("generate", || generator.generate(&prompt))
        .await?;
    let result = state.extractor.process_response(&response, &document);
    state.metrics.record_extract(timer.elapsed(), result.triples.len());

    let extraction_id = Uuid::new_v4().to_string();
    let session = state.extractions.put(
        extraction_id.clone(),
        ExtractionSession {
            extraction_id: extraction_id.clone(),
            upload_id: upload_id.clone(),
            extracted: Utc::now(),
            result,
        },
    )?;

    let result = &session.result;
    Ok(Json(ExtractResponse {
        success: true,
        extraction_id: &session.extraction_id,
        upload_id: &session.upload_id,
        triples: &result.triples,
        triples_count: result.triples.len(),
        quality_metrics: &result.quality,
        document_pages: result.document_pages,
        document_length: result.document_length,
        message: result.is_empty().then_some(EMPTY_YIELD_MESSAGE),
    })
    .into_response())
}

// ---- visualize ----

#[derive(Serialize)]
struct VisualizeResponse {
    success: bool,
    extraction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    visualization_url: Option<String>,
    #[serde(flatten)]
    graph: GraphLayout,
}

async fn visualize(
    State(state): State<AppState>,
    Path(extraction_id): Path<String>,
) -> ApiResult<Json<VisualizeResponse>> {
    let session = state.extractions.get(&extraction_id)?;
    let graph = layout::layout(&session.result.triples, &state.layout)?;

    let visualization_url = if state.config.layout.render_images {
        render_image(&state, &extraction_id, &graph).await
    } else {
        None
    };

    Ok(Json(VisualizeResponse {
        success: true,
        extraction_id,
        visualization_url,
        graph,
    }))
}

/// Write the PNG artifact. A failed render only loses the image.
async fn render_image(state: &AppState, extraction_id: &str, graph: &GraphLayout) -> Option<String> {
    let dir = state.config.graphs_dir();
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        warn!(error = %e, "Failed to create graph image directory");
        return None;
    }

    let filename = format!("graph_{extraction_id}.png");
    let path = dir.join(&filename);
    let graph = graph.clone();
    let rendered =
        tokio::task::spawn_blocking(move || render_png(&graph, &path, &RenderOptions::default())).await;

    match rendered {
        Ok(Ok(())) => Some(format!("/static/graphs/{filename}")),
        Ok(Err(e)) => {
            warn!(extraction_id, error = %e, "Graph image not rendered");
            None
        }
        Err(e) => {
            warn!(extraction_id, error = %e, "Graph render task failed");
            None
        }
    }
}

// ---- approve ----

#[derive(Debug, Default, Deserialize)]
struct ApproveRequest {
    #[serde(default)]
    approved: bool,
    graph_name: Option<String>,
}

#[derive(Serialize)]
struct ApproveResponse {
    success: bool,
    partial: bool,
    graph_name: String,
    graph_iri: String,
    triples_count: usize,
    instance_statements: usize,
    stored_statements: usize,
    failed_statements: usize,
    total_statements: usize,
}

async fn approve(
    State(state): State<AppState>,
    Path(extraction_id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<Json<ApproveResponse>> {
    let session = state.extractions.get(&extraction_id)?;
    let request = body.map(|Json(request)| request).unwrap_or_default();

    if !request.approved {
        return Err(ApiError::BadRequest("Graph not approved for storage".to_string()));
    }
    let result = &session.result;
    if result.triples.is_empty() {
        return Err(ApiError::BadRequest("No valid triples to store".to_string()));
    }

    let graph_name = request
        .graph_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_graph_name(&extraction_id));
    let graph = graph_iri(&graph_name);

    let mut statements = triple_statements(&result.triples);
    let mut validation_score = 100.0;
    let mut instance_statements = 0;

    match state.uploads.get(&session.upload_id) {
        Ok(upload) => {
            validation_score = upload.validation.score;
            match FileReader::read_file(&upload.path).await {
                Ok(document) => {
                    let title = FsPath::new(&upload.filename)
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or(&upload.filename);
                    let instance = document_statements(&generate_doc_id(&document.text), title, &document.text);
                    instance_statements = instance.len();
                    statements.extend(instance);
                }
                Err(e) => warn!(error = %e, "Uploaded document unreadable, storing raw triples only"),
            }
        }
        Err(e) => warn!(error = %e, "Upload session gone, storing raw triples only"),
    }

    let timer = TimedOperation::start();
    let report = state.store.insert(&graph, &statements).await?;
    if report.stored == 0 {
        return Err(ApiError::NothingStored(report.total));
    }
    state.metrics.record_store(timer.elapsed(), report.stored);

    state
        .store
        .record_graph(GraphInfo {
            graph_iri: graph.clone(),
            graph_name: graph_name.clone(),
            extraction_id: extraction_id.clone(),
            created: Utc::now(),
            triples_count: report.stored,
            document_pages: result.document_pages,
            document_length: result.document_length,
            validation_score,
        })
        .await?;

    if report.is_partial() {
        warn!(graph = %graph, stored = report.stored, failed = report.failed, "Graph partially stored");
    } else {
        info!(graph = %graph, stored = report.stored, "Graph stored");
    }

    Ok(Json(ApproveResponse {
        success: true,
        partial: report.is_partial(),
        graph_name,
        graph_iri: graph,
        triples_count: result.triples.len(),
        instance_statements,
        stored_statements: report.stored,
        failed_statements: report.failed,
        total_statements: report.total,
    }))
}

// ---- RDF ----

#[derive(Debug, Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

impl FormatQuery {
    fn format(&self) -> ApiResult<RdfFormat> {
        match &self.format {
            Some(name) => Ok(name.parse()?),
            None => Ok(RdfFormat::Turtle),
        }
    }
}

fn rdf_response(body: String, format: RdfFormat, stem: &str) -> Response {
    let disposition = format!("attachment; filename=\"{stem}.{}\"", format.extension());
    (
        [(CONTENT_TYPE, format.content_type().to_string()), (CONTENT_DISPOSITION, disposition)],
        body,
    )
        .into_response()
}

async fn export(
    State(state): State<AppState>,
    Path(extraction_id): Path<String>,
    Query(query): Query<FormatQuery>,
) -> ApiResult<Response> {
    let session = state.extractions.get(&extraction_id)?;
    let format = query.format()?;
    let body = serialize(&triple_statements(&session.result.triples), format)?;
    Ok(rdf_response(body, format, &format!("msds_{extraction_id}")))
}

async fn ontology_schema(State(state): State<AppState>, Query(query): Query<FormatQuery>) -> ApiResult<Response> {
    let format = query.format()?;
    let body = serialize(&state.schema.statements(), format)?;
    Ok(rdf_response(body, format, "msds_ontology"))
}

// ---- graphs and chat ----

async fn list_graphs(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let graphs = state.store.list_graphs().await?;
    Ok(Json(json!({
        "success": true,
        "total_graphs": graphs.len(),
        "graphs": graphs,
    })))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    query: Option<String>,
    graph_name: Option<String>,
}

async fn chat(State(state): State<AppState>, body: Option<Json<ChatRequest>>) -> ApiResult<Response> {
    let request = body.map(|Json(request)| request);
    let (query, graph_name) = match request {
        Some(ChatRequest {
            query: Some(query),
            graph_name: Some(graph_name),
        }) if !query.trim().is_empty() && !graph_name.trim().is_empty() => (query, graph_name),
        _ => {
            return Err(ApiError::BadRequest(
                "Both 'query' and 'graph_name' are required".to_string(),
            ));
        }
    };

    let timer = TimedOperation::start();
    let response = state.chat.chat(&query, &graph_name).await?;
    state.metrics.record_chat(timer.elapsed());
    Ok(Json(response).into_response())
}

async fn chat_suggestions(State(state): State<AppState>, Path(graph_name): Path<String>) -> ApiResult<Json<Value>> {
    let suggestions = state.chat.suggestions(&graph_name).await?;
    Ok(Json(json!({
        "success": true,
        "graph_name": graph_name,
        "suggestions": suggestions,
    })))
}

async fn graph_summary(State(state): State<AppState>, Path(graph_name): Path<String>) -> ApiResult<Json<Value>> {
    let summary = state.chat.summary(&graph_name).await?;
    Ok(Json(json!({
        "success": true,
        "graph_name": graph_name,
        "summary": summary.summary,
        "stats": summary.stats,
        "sample_predicates": summary.sample_predicates,
        "sample_subjects": summary.sample_subjects,
    })))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
