//! `zync-status` -- print the state of a Zync site.
//!
//! Connects with the configured script credentials, logs the job
//! controller status, and prints the most recent jobs as JSON on stdout.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default          | Description                    |
//! |------------------------------|----------|------------------|--------------------------------|
//! | `ZYNC_URL`                   | yes      | --               | Site URL, e.g. `https://studio.zync.io` |
//! | `ZYNC_SCRIPT_NAME`           | yes      | --               | API script name                |
//! | `ZYNC_TOKEN`                 | yes      | --               | API script token               |
//! | `ZYNC_TIMEOUT_SECS`          | no       | `10`             | Per-request timeout            |
//! | `ZYNC_STATUS_MAX_JOBS`       | no       | `20`             | Number of jobs to print        |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zync_client::{ClientConfig, ZyncApi};

/// Default number of jobs printed.
const DEFAULT_MAX_JOBS: u32 = 20;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let max_jobs: u32 = std::env::var("ZYNC_STATUS_MAX_JOBS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_JOBS);

    tracing::info!(url = %config.base_url, max_jobs, "Starting zync-status");

    let api = ZyncApi::connect(config).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Could not connect to Zync");
        std::process::exit(1);
    });

    match api.get_controller_status().await {
        Ok(status) => tracing::info!(%status, "Job controller status"),
        Err(e) => tracing::warn!(error = %e, "Could not read job controller status"),
    }

    match api.get_jobs(Some(max_jobs)).await {
        Ok(jobs) => match serde_json::to_string_pretty(&jobs) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                tracing::error!(error = %e, "Could not render job list");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Could not list jobs");
            std::process::exit(1);
        }
    }
}
