// crates/runner/src/http.rs
// HTTP client for the container runner API.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::{resource_name, JobLauncher, LaunchError};

/// Launcher backed by the runner's REST API.
///
/// Executions live under `{base_url}/v1/executions`; authentication is an
/// optional bearer token.
pub struct HttpJobLauncher {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct StartExecutionRequest<'a> {
    name: &'a str,
    job_id: &'a str,
    job_type: &'a str,
}

impl HttpJobLauncher {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn reject(response: reqwest::Response) -> LaunchError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        LaunchError::Rejected { status, body }
    }
}

#[async_trait]
impl JobLauncher for HttpJobLauncher {
    async fn start(&self, job_id: &str, job_type: &str) -> Result<String, LaunchError> {
        let name = resource_name(job_id);
        let url = format!("{}/v1/executions", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&StartExecutionRequest {
                name: &name,
                job_id,
                job_type,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        debug!(job_id, resource = %name, "execution started");
        Ok(name)
    }

    async fn delete(&self, resource: &str) -> Result<(), LaunchError> {
        let url = format!("{}/v1/executions/{resource}", self.base_url);
        let response = self.authorize(self.client.delete(&url)).send().await?;

        // 404 means the resource is already gone, which is what we wanted.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(Self::reject(response).await);
        }
        debug!(resource, "execution deleted");
        Ok(())
    }
}
