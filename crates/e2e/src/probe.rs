//! Readiness probe for the application under test
//!
//! A scenario's first step is a page load, so an application that is not
//! running would otherwise surface as a navigation timeout half a minute
//! later. Probing the base URL first fails the whole run fast instead.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `base_url` until it answers with anything but a server error
pub async fn wait_until_ready(base_url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("Application is up at {} ({})", base_url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Readiness probe returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for application at {}...", base_url);
                }
                // Connection refused is expected while the app is starting
                if !e.is_connect() {
                    warn!("Readiness probe error: {}", e);
                }
            }
        }

        sleep(PROBE_INTERVAL).await;
    }

    Err(E2eError::AppUnreachable {
        url: base_url.to_string(),
        attempts,
    })
}
