//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that wire up the
//! database, AI gateway, and MCP tool handler into a running server.

use crate::ai::{self, AiGateway};
use crate::config::RecallConfig;
use crate::db;
use crate::tools::RecallTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open DB, resolve the AI key, create the provider.
/// Returns (db, gateway, config) ready for sharing across sessions.
fn setup_shared_state(
    config: RecallConfig,
) -> Result<(Arc<Mutex<rusqlite::Connection>>, AiGateway, Arc<RecallConfig>)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let gateway = build_gateway(&config, &conn)?;
    let db = Arc::new(Mutex::new(conn));
    let config = Arc::new(config);

    Ok((db, gateway, config))
}

/// AI gateway from config, using the stored key when none is configured.
pub fn build_gateway(config: &RecallConfig, conn: &rusqlite::Connection) -> Result<AiGateway> {
    let api_key = ai::resolve_api_key(&config.ai, conn)?;
    if api_key.is_none() {
        tracing::warn!("no AI API key configured; AI features will return errors or fallbacks");
    }
    let provider = ai::create_provider(&config.ai, api_key)?;
    tracing::info!(
        provider = provider.name(),
        model = provider.model(),
        "AI provider ready"
    );
    Ok(AiGateway::new(Arc::from(provider), config.ai.context_limit))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: RecallConfig) -> Result<()> {
    tracing::info!("starting RecallRift MCP server on stdio");

    let (db, gateway, config) = setup_shared_state(config)?;

    let tools = RecallTools::new(db, gateway, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over streamable HTTP transport.
pub async fn serve_http(config: RecallConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting RecallRift MCP server on HTTP");

    let (db, gateway, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(RecallTools::new(db.clone(), gateway.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
