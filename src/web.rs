#![cfg(not(tarpaulin_include))]

use std::sync::Arc;

use worldcup_dashboard::app;
use worldcup_dashboard::google::GoogleConnector;

/// Main entry point for the dashboard web application
///
/// Starts the HTTP server on 127.0.0.1:3000. Every page view authenticates
/// with the service-account credential from `secrets.toml`, fetches the
/// `WorldCups` spreadsheet afresh and renders the dashboard from it.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Start the web application against the remote spreadsheet
    app::run(Arc::new(GoogleConnector::default())).await
}
