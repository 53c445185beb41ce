use std::time::Duration;

use reqwest::Url;

use crate::prelude::*;

/// Dead man's switch: POSTs to a monitoring URL after each successful pass,
/// so the absence of heartbeats pages someone. Failures are logged and
/// swallowed, monitoring never takes the aggregation loop down.
pub struct Client {
    url: Option<Url>,
}

impl Client {
    pub const fn new(url: Option<Url>) -> Self {
        Self { url }
    }

    pub const fn disabled() -> Self {
        Self { url: None }
    }

    pub async fn send(&self) {
        if let Some(url) = &self.url
            && let Err(error) = Self::send_fallible(url.clone()).await
        {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }

    #[instrument(skip_all)]
    async fn send_fallible(url: Url) -> Result {
        debug!(%url, "sending a heartbeat…");
        reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()?
            .post(url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
