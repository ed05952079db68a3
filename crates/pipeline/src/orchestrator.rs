use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage};
use extract::{Extraction, ExtractionRequest, ExtractionResult};
use graph::{
    GraphArtifact, GraphBuilder, HtmlRenderer, NodeTable, RelationshipTable, RenderMode,
    RenderOptions,
};
use ingest::{DocumentFormat, DocumentReader, Window};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Wall-clock time spent in each stage of a run
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub extract: Duration,
    pub validate: Duration,
    pub build: Duration,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    pub artifact: GraphArtifact,
    /// The full extraction, isolated nodes and dangling relationships included
    pub extraction: ExtractionResult,
    pub dropped_relationships: usize,
    pub text_length: usize,
    pub timings: StageTimings,
}

impl PipelineOutput {
    pub fn node_table(&self) -> NodeTable {
        NodeTable::from_result(&self.extraction)
    }

    pub fn relationship_table(&self) -> RelationshipTable {
        RelationshipTable::from_result(&self.extraction)
    }

    pub fn render_html(&self, options: &RenderOptions) -> String {
        HtmlRenderer::render(&self.artifact, options)
    }
}

/// Runs text through extraction, validation and graph building.
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct Pipeline {
    extractor: Arc<dyn Extraction>,
    config: PipelineConfig,
    builder: GraphBuilder,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn Extraction>, config: &PipelineConfig) -> Self {
        Self {
            extractor,
            config: config.clone(),
            builder: config.graph_builder(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reject empty or oversized text. Returns the length in characters.
    pub fn check_input(&self, text: &str) -> Result<usize> {
        if text.trim().is_empty() {
            return Err(PipelineError::UnsupportedInput("input text is empty".to_string()));
        }

        let length = text.chars().count();
        if length > self.config.char_limit {
            return Err(PipelineError::UnsupportedInput(format!(
                "text has {} characters, exceeding the {} character limit",
                length, self.config.char_limit
            )));
        }
        Ok(length)
    }

    pub async fn run(
        &self,
        text: &str,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<PipelineOutput> {
        self.run_with_mode(text, allowed_nodes, allowed_relationships, None)
            .await
    }

    /// Like [`Pipeline::run`], but `render_mode` overrides the configured
    /// mode for this run only.
    pub async fn run_with_mode(
        &self,
        text: &str,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
        render_mode: Option<RenderMode>,
    ) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id);
        let builder = match render_mode {
            Some(mode) => self.builder.clone().with_mode(mode),
            None => self.builder.clone(),
        };

        async {
            let result = self
                .run_stages(run_id, &builder, text, allowed_nodes, allowed_relationships)
                .await;
            if let Err(e) = &result {
                warn!(stage = %Stage::Failed, failed_in = %e.stage(), error = %e, "Pipeline failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Extract text from an in-memory document, then run the pipeline on it.
    pub async fn run_document(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        window: Window,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<PipelineOutput> {
        let text = DocumentReader::read_bytes(bytes, format, window)?;
        self.run(&text, allowed_nodes, allowed_relationships).await
    }

    /// Read a document from disk, then run the pipeline on its text.
    pub async fn run_file(
        &self,
        path: &Path,
        window: Window,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<PipelineOutput> {
        let text = DocumentReader::read_file(path, window).await?;
        self.run(&text, allowed_nodes, allowed_relationships).await
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        builder: &GraphBuilder,
        text: &str,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<PipelineOutput> {
        info!(stage = %Stage::Start, "Pipeline started");
        let text_length = self.check_input(text)?;
        let mut timings = StageTimings::default();

        info!(
            stage = %Stage::Extracting,
            chars = text_length,
            allowed_nodes = allowed_nodes.len(),
            allowed_relationships = allowed_relationships.len(),
            "Extracting graph"
        );
        let started = Instant::now();
        let request = ExtractionRequest::new(text).with_allowed(allowed_nodes, allowed_relationships);
        let extraction = self
            .extractor
            .extract(&request)
            .await?
            .ok_or_else(|| {
                PipelineError::ExtractionFailure("extractor returned no result".to_string())
            })?;
        timings.extract = started.elapsed();

        info!(
            stage = %Stage::Validating,
            nodes = extraction.nodes.len(),
            relationships = extraction.relationships.len(),
            "Validating relationships"
        );
        let started = Instant::now();
        let validation = graph::validate(&extraction.nodes, &extraction.relationships);
        timings.validate = started.elapsed();
        if validation.dropped > 0 {
            info!(dropped = validation.dropped, "Dropped relationships with dangling endpoints");
        }

        info!(
            stage = %Stage::Building,
            valid_edges = validation.valid_edges.len(),
            mode = ?builder.mode(),
            "Building graph"
        );
        let started = Instant::now();
        let artifact = builder.build_validated(&extraction, &validation);
        timings.build = started.elapsed();

        info!(
            stage = %Stage::Done,
            vertices = artifact.vertex_count(),
            edges = artifact.edge_count(),
            extract_ms = timings.extract.as_millis() as u64,
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            run_id,
            artifact,
            extraction,
            dropped_relationships: validation.dropped,
            text_length,
            timings,
        })
    }
}
