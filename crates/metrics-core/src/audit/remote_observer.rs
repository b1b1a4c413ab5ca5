use super::{AuditEvent, AuditObserver, AuditObserverError};
use async_trait::async_trait;
use std::time::Duration;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts each event to a remote collector. A non-2xx response is treated
/// as a delivery failure.
pub struct RemoteAuditObserver {
    client: reqwest::Client,
    url: String,
}

impl RemoteAuditObserver {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .expect("reqwest client configuration is valid");

        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl AuditObserver for RemoteAuditObserver {
    async fn notify(&self, event: &AuditEvent) -> Result<(), AuditObserverError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(AuditObserverError::Remote)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuditObserverError::RemoteStatus {
                status: response.status().as_u16(),
            })
        }
    }
}

#[cfg(test)]
#[path = "remote_observer_tests.rs"]
mod tests;
