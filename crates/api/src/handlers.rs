use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::MultipartError,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use graph::{RenderMode, RenderOptions, Table};
use ingest::{DocumentFormat, IngestError, Window};
use pipeline::{Pipeline, PipelineError, PipelineOutput};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Largest accepted document upload
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub metrics: Arc<Metrics>,
    pub render: RenderOptions,
    pub model: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub char_limit: usize,
}

#[derive(Deserialize)]
pub struct GraphRequest {
    pub text: String,
    #[serde(default, deserialize_with = "type_list")]
    pub allowed_nodes: Vec<String>,
    #[serde(default, deserialize_with = "type_list")]
    pub allowed_relationships: Vec<String>,
    /// Overrides the server's render mode for this request
    #[serde(default)]
    pub render_mode: Option<RenderMode>,
}

/// A document received as `multipart/form-data`.
///
/// Fields: `file` (required; the format comes from its file name, or from
/// its content type when the name has no extension), `skip_start`,
/// `skip_end`, and comma-separated `allowed_nodes` / `allowed_relationships`.
#[derive(Debug)]
pub struct DocumentUpload {
    pub file_name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
    pub window: Window,
    pub allowed_nodes: Vec<String>,
    pub allowed_relationships: Vec<String>,
}

impl DocumentUpload {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, PipelineError> {
        let mut file = None;
        let mut skip_start = 0;
        let mut skip_end = 0;
        let mut allowed_nodes = Vec::new();
        let mut allowed_relationships = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                file = Some((file_name, content_type, bytes.to_vec()));
                continue;
            }

            let value = field.text().await.map_err(invalid_upload)?;
            match name.as_str() {
                "skip_start" => skip_start = parse_count(&name, &value)?,
                "skip_end" => skip_end = parse_count(&name, &value)?,
                "allowed_nodes" => allowed_nodes = split_type_list(&value),
                "allowed_relationships" => allowed_relationships = split_type_list(&value),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        let (file_name, content_type, bytes) = file.ok_or_else(|| {
            PipelineError::UnsupportedInput("upload has no `file` field".to_string())
        })?;
        let format = detect_format(&file_name, content_type.as_deref())?;

        Ok(Self {
            file_name,
            format,
            bytes,
            window: Window::new(skip_start, skip_end),
            allowed_nodes,
            allowed_relationships,
        })
    }
}

#[derive(Serialize, Deserialize)]
pub struct GraphResponse {
    pub run_id: String,
    pub vertices: usize,
    pub edges: usize,
    pub total_nodes: usize,
    pub total_relationships: usize,
    pub dropped_relationships: usize,
    pub text_length: usize,
    pub graph: serde_json::Value,
    pub html: String,
    pub nodes_csv: String,
    pub relationships_csv: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub stage: String,
}

pub enum ApiError {
    Pipeline(PipelineError),
    /// The run succeeded but its output could not be encoded
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Pipeline(e) => {
                let status = match &e {
                    PipelineError::UnsupportedInput(_) => StatusCode::BAD_REQUEST,
                    PipelineError::ExtractionFailure(_) => StatusCode::BAD_GATEWAY,
                };
                let body = ErrorResponse {
                    error: e.to_string(),
                    stage: e.stage().to_string(),
                };
                (status, body)
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    stage: "done".to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/graph", post(generate_graph))
        .route("/graph/html", post(generate_graph_html))
        .route("/graph/document", post(generate_graph_from_document))
        .route("/stats", get(get_stats))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model.clone(),
        char_limit: state.pipeline.config().char_limit,
    })
}

async fn generate_graph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GraphRequest>,
) -> Result<Json<GraphResponse>, ApiError> {
    let output = run_text(&state, &req).await?;
    Ok(Json(graph_response(&output, &state.render)?))
}

async fn generate_graph_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GraphRequest>,
) -> Result<Html<String>, ApiError> {
    let output = run_text(&state, &req).await?;
    Ok(Html(output.render_html(&state.render)))
}

async fn generate_graph_from_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GraphResponse>, ApiError> {
    let timer = TimedOperation::start();
    let result = match DocumentUpload::from_multipart(multipart).await {
        Ok(upload) => {
            info!(
                file = %upload.file_name,
                format = upload.format.name(),
                bytes = upload.bytes.len(),
                window = ?upload.window,
                "Graph requested for document"
            );
            state
                .pipeline
                .run_document(
                    &upload.bytes,
                    upload.format,
                    upload.window,
                    &upload.allowed_nodes,
                    &upload.allowed_relationships,
                )
                .await
        }
        Err(e) => Err(e),
    };
    let output = record(&state.metrics, result, &timer)?;

    Ok(Json(graph_response(&output, &state.render)?))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn run_text(state: &AppState, req: &GraphRequest) -> Result<PipelineOutput, ApiError> {
    let timer = TimedOperation::start();
    let result = state
        .pipeline
        .run_with_mode(
            &req.text,
            &req.allowed_nodes,
            &req.allowed_relationships,
            req.render_mode,
        )
        .await;
    record(&state.metrics, result, &timer)
}

fn record(
    metrics: &Metrics,
    result: Result<PipelineOutput, PipelineError>,
    timer: &TimedOperation,
) -> Result<PipelineOutput, ApiError> {
    match result {
        Ok(output) => {
            metrics.record_success(&output, timer.elapsed());
            Ok(output)
        }
        Err(e) => {
            metrics.record_failure(&e);
            if matches!(e, PipelineError::ExtractionFailure(_)) {
                error!(error = %e, "Graph generation failed");
            }
            Err(ApiError::Pipeline(e))
        }
    }
}

fn graph_response(
    output: &PipelineOutput,
    render: &RenderOptions,
) -> Result<GraphResponse, ApiError> {
    let graph = serde_json::to_value(&output.artifact).map_err(|e| {
        error!(run_id = %output.run_id, error = %e, "Failed to encode graph");
        ApiError::Internal(format!("failed to encode graph: {e}"))
    })?;

    Ok(GraphResponse {
        run_id: output.run_id.to_string(),
        vertices: output.artifact.vertex_count(),
        edges: output.artifact.edge_count(),
        total_nodes: output.extraction.nodes.len(),
        total_relationships: output.extraction.relationships.len(),
        dropped_relationships: output.dropped_relationships,
        text_length: output.text_length,
        graph,
        html: output.render_html(render),
        nodes_csv: output.node_table().to_csv(),
        relationships_csv: output.relationship_table().to_csv(),
    })
}

fn invalid_upload(e: MultipartError) -> PipelineError {
    PipelineError::UnsupportedInput(format!("invalid upload: {e}"))
}

fn parse_count(field: &str, raw: &str) -> Result<usize, PipelineError> {
    raw.trim().parse().map_err(|_| {
        PipelineError::UnsupportedInput(format!(
            "{field} must be a non-negative integer, got {raw:?}"
        ))
    })
}

/// The file name's extension wins; the content type is only consulted for
/// names without one.
fn detect_format(
    file_name: &str,
    content_type: Option<&str>,
) -> Result<DocumentFormat, IngestError> {
    let path = Path::new(file_name);
    match (path.extension(), content_type) {
        (None, Some(mime)) => DocumentFormat::from_mime(mime),
        _ => DocumentFormat::from_path(path),
    }
}

fn split_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept either a JSON array or a comma-separated string such as
/// `"Person, Organization"`; blank entries are dropped.
fn type_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Raw::Csv(csv) => split_type_list(&csv),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_list_forms() {
        let req: GraphRequest = serde_json::from_str(
            r#"{"text": "t", "allowed_nodes": "Person, Organization, ,", "allowed_relationships": [" WORKS_FOR ", ""]}"#,
        )
        .unwrap();
        assert_eq!(req.allowed_nodes, vec!["Person", "Organization"]);
        assert_eq!(req.allowed_relationships, vec!["WORKS_FOR"]);

        let req: GraphRequest = serde_json::from_str(r#"{"text": "t"}"#).unwrap();
        assert!(req.allowed_nodes.is_empty());
        assert!(req.allowed_relationships.is_empty());
    }

    #[test]
    fn test_render_mode_is_optional() {
        let req: GraphRequest = serde_json::from_str(r#"{"text": "t"}"#).unwrap();
        assert_eq!(req.render_mode, None);

        let req: GraphRequest =
            serde_json::from_str(r#"{"text": "t", "render_mode": "all_nodes"}"#).unwrap();
        assert_eq!(req.render_mode, Some(RenderMode::AllNodes));

        let bad = r#"{"text": "t", "render_mode": "most"}"#;
        assert!(serde_json::from_str::<GraphRequest>(bad).is_err());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("deck.PPTX", None).unwrap(), DocumentFormat::Pptx);
        assert_eq!(
            detect_format("notes.md", Some("application/pdf")).unwrap(),
            DocumentFormat::Text
        );
        assert_eq!(
            detect_format("upload", Some("application/pdf")).unwrap(),
            DocumentFormat::Pdf
        );
        assert!(matches!(
            detect_format("deck.key", Some("text/plain")),
            Err(IngestError::Unsupported(_))
        ));
        assert!(detect_format("upload", None).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("skip_start", " 3 ").unwrap(), 3);
        assert!(parse_count("skip_end", "-1").is_err());
    }

    #[test]
    fn test_internal_error_is_server_error() {
        let response = ApiError::Internal("failed to encode graph".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
