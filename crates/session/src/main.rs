//! `sway-session` -- headless balance assessment.
//!
//! Uploads two pre-recorded clips to the pose-estimation backend,
//! fetches both trajectory documents, and logs a sway diagnosis per
//! clip.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default                 | Description                     |
//! |-----------------------------|----------|-------------------------|---------------------------------|
//! | `SWAY_BACKEND_URL`          | no       | `http://localhost:8000` | Backend origin                  |
//! | `SWAY_REQUEST_TIMEOUT_SECS` | no       | `300`                   | Per-request HTTP timeout        |
//! | `SWAY_VIDEO_1`              | yes      | --                      | Eyes-open clip                  |
//! | `SWAY_VIDEO_2`              | yes      | --                      | Eyes-closed clip                |
//! | `SWAY_REPORT_PATH`          | no       | --                      | Write both reports here as JSON |

use std::sync::Arc;

use anyhow::Context;
use sway_capture::media::ImportedFile;
use sway_client::api::BackendClient;
use sway_session::config::SessionConfig;
use sway_session::run_session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sway_session=info,sway_capture=info,sway_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env()?;
    let (video_1, video_2) = config.video_paths()?;

    tracing::info!(
        backend_url = %config.backend_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting sway-session",
    );

    let client = BackendClient::with_timeout(&config.backend_url, config.request_timeout)?;
    match client.health().await {
        Ok(health) => tracing::info!(status = %health.status, "Backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Backend health check failed, continuing"),
    }

    let pair = run_session(
        Arc::new(client),
        ImportedFile::new(video_1),
        ImportedFile::new(video_2),
    )
    .await?;

    if let Some(path) = &config.report_path {
        let json = serde_json::to_vec_pretty(&pair)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
    }

    Ok(())
}
