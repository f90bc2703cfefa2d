//! HTTP client for the execution platform's symphony endpoint.
//!
//! One POST per submission, no retries: the platform may have partially
//! applied a timed-out request, so retry policy belongs to a human looking
//! at the batch outcome, not to this client. Error bodies are passed back
//! verbatim — the platform's schema errors carry no field-level detail and
//! reinterpreting them adds nothing.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{DeployError, DeployMeta, DeployTarget};
use crate::domain::SymphonyId;

/// Successful creation response.
#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// Deployment client for the remote execution platform.
pub struct PlatformClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl PlatformClient {
    /// Default request timeout. Cancellation beyond this is the caller's.
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn symphonies_url(&self) -> String {
        format!("{}/api/v1/symphonies", self.base_url)
    }
}

impl DeployTarget for PlatformClient {
    fn name(&self) -> &str {
        "platform"
    }

    fn submit(&self, document: &Value, meta: &DeployMeta) -> Result<SymphonyId, DeployError> {
        let body = json!({
            "symphony": document,
            "color": meta.color,
            "tag": meta.tag,
        });

        let resp = self
            .client
            .post(self.symphonies_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| DeployError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| DeployError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(DeployError::Rejected {
                status: status.as_u16(),
                raw: text,
            });
        }

        let created: CreateResponse = serde_json::from_str(&text)
            .map_err(|e| DeployError::MalformedResponse(format!("{e}; body: {text}")))?;

        Ok(SymphonyId(created.id))
    }
}
