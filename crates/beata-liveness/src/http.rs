//! HTTP liveness probe using `reqwest`.

use std::time::Duration;

use crate::{LivenessError, LivenessProbe, ProbeConfig};

/// Pings the backend with `GET <base_url>/`. Any 2xx is alive.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Builds the probe and its HTTP client.
    pub fn new(config: &ProbeConfig) -> Result<Self, LivenessError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let url = format!("{}/", config.base_url.trim_end_matches('/'));
        tracing::debug!(%url, "http liveness probe ready");
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LivenessProbe for HttpProbe {
    async fn ping(&self) -> Result<(), LivenessError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::trace!(%status, "liveness ping ok");
            Ok(())
        } else {
            Err(LivenessError::Status(status.as_u16()))
        }
    }
}
