//! Development server for the admin UI
//!
//! Serves the mock admin backend with a seeded dataset so that the grids can
//! be exercised in the browser without the real backend.
//!
//! Usage: cargo run -p dev-server

use anyhow::{Context, Result};
use test_helpers::mock::{ADMIN_EMAIL, ADMIN_PASSWORD, Dataset, MockBackend};
use test_helpers::telemetry::{get_subscriber, init_subscriber, log_error};
use tracing::info;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_subscriber(get_subscriber("info"))?;

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };

    let dataset = Dataset::seeded();
    let summary = (
        dataset.bookings.len(),
        dataset.users.len(),
        dataset.revenue.len(),
        dataset.notifications.len(),
    );
    let (server, port) =
        test_helpers::build("127.0.0.1", port, MockBackend::new(dataset))
            .context("Failed to bind the mock backend")?;
    let server = tokio::spawn(server);

    info!("Mock admin API running on http://127.0.0.1:{port}/api");
    info!("UI: cd ui && BACKEND_URL=http://127.0.0.1:{port} trunk serve");
    info!(
        "Seeded {} bookings, {} users, {} revenue months, {} notifications",
        summary.0, summary.1, summary.2, summary.3
    );
    info!("Log in as {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    info!("Press Ctrl+C to shutdown");

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        result = server => {
            if let Err(e) = result? {
                log_error(e);
            }
        }
    }
    info!("Shutting down development server");
    Ok(())
}
