mod config;
mod errors;
mod inference;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod storage;
mod submission;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::inference::{AnthropicInferenceClient, InferenceClient};
use crate::llm_client::LlmClient;
use crate::render::{DocumentRenderer, PdftoppmRenderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::redis_store::RedisRecordStore;
use crate::storage::s3_store::S3DocumentStore;
use crate::storage::{DocumentStore, RecordStore};
use crate::submission::pipeline::SubmissionPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumind API v{}", env!("CARGO_PKG_VERSION"));

    // Record store (Redis)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let records: Arc<dyn RecordStore> = Arc::new(RedisRecordStore::new(redis));
    info!("Redis record store initialized");

    // Document store (S3 / MinIO)
    let s3 = build_s3_client(&config).await;
    let documents: Arc<dyn DocumentStore> =
        Arc::new(S3DocumentStore::new(s3, config.s3_bucket.clone()));
    info!("S3 document store initialized (bucket: {})", config.s3_bucket);

    // Renderer
    let renderer: Arc<dyn DocumentRenderer> = Arc::new(PdftoppmRenderer::new(
        config.pdftoppm_bin.clone(),
        config.render_dpi,
    ));
    info!(
        "Renderer: {} at {} dpi",
        config.pdftoppm_bin, config.render_dpi
    );

    // Inference
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    let inference: Arc<dyn InferenceClient> =
        Arc::new(AnthropicInferenceClient::new(llm, documents.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let pipeline = SubmissionPipeline::new(
        documents.clone(),
        renderer,
        records.clone(),
        inference,
    )
    .with_key_prefix(config.record_key_prefix.clone());

    let state = AppState {
        pipeline,
        documents,
        records,
    };

    // TODO: restrict CORS origins once the web client has a fixed host
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resumind-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
