//! Serve command - web dashboard and JSON API.

use crate::analysis::Services;
use crate::cli::Output;
use crate::config::Settings;
use crate::server::{router, AppState};

/// Run the HTTP server until interrupted.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let spinner = Output::spinner("Connecting to workspace...");
    let services = Services::initialize(&settings).await;
    spinner.finish_and_clear();

    let status = services.status().clone();
    let app = router(AppState::new(services, settings));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Claimscope Server");
    println!();
    if status.is_connected() {
        Output::success(&format!("Workspace: {}", status.detail()));
    } else {
        Output::warning(&format!("Workspace unavailable: {}", status.detail()));
    }
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Home", "GET  /");
    Output::kv("Claim Analysis", "GET  /analysis, POST /analysis");
    Output::kv("Analyze (JSON)", "POST /api/analyze");
    Output::kv("Samples", "GET  /api/samples");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
