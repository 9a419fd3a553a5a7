//! AppVeyor REST API client.
//!
//! Thin reqwest wrapper: every call is a single bearer-authenticated GET whose
//! JSON body is decoded into the domain models. Non-success statuses are
//! surfaced as errors, never retried here.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::BuildSource;
use crate::config::Config;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::{
    Build, BuildDetailsResponse, HistoryResponse, Job, JobTestResults, Project,
};

/// HTTP connect timeout cap for API calls.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// AppVeyor API client.
#[derive(Clone)]
pub struct AppVeyorClient {
    endpoint: String,
    api_key: SecretString,
    page_size: u32,
    http_client: reqwest::Client,
}

impl AppVeyorClient {
    /// Create a client for the given API base URL.
    pub fn new(
        endpoint: &str,
        api_key: SecretString,
        page_size: u32,
        request_timeout: Duration,
    ) -> AnalyzerResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(request_timeout.min(MAX_CONNECT_TIMEOUT))
            .timeout(request_timeout)
            .build()
            .map_err(|e| AnalyzerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            page_size,
            http_client,
        })
    }

    /// Create a client from application configuration.
    pub fn from_config(config: &Config) -> AnalyzerResult<Self> {
        Self::new(
            &config.endpoint,
            config.api_key.clone(),
            config.page_size,
            config.request_timeout,
        )
    }

    /// Issue an authenticated GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AnalyzerResult<T> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("AppVeyor: request to {} failed: {}", url, e);
                AnalyzerError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("AppVeyor: {} returned {}", url, status);
            return Err(AnalyzerError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            warn!("AppVeyor: failed to read body from {}: {}", url, e);
            AnalyzerError::from(e)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!("AppVeyor: failed to parse response from {}: {}", url, e);
            AnalyzerError::MalformedPayload(format!("{}: {}", url, e))
        })
    }

    fn project_path(project: &Project) -> String {
        format!(
            "/projects/{}/{}",
            urlencoding::encode(&project.account_name),
            urlencoding::encode(&project.slug)
        )
    }
}

#[async_trait]
impl BuildSource for AppVeyorClient {
    async fn list_projects(&self) -> AnalyzerResult<Vec<Project>> {
        self.get_json("/projects").await
    }

    async fn build_history_page(
        &self,
        project: &Project,
        branch: &str,
        before: Option<u64>,
    ) -> AnalyzerResult<Vec<Build>> {
        let mut path = format!(
            "{}/history?recordsNumber={}&branch={}",
            Self::project_path(project),
            self.page_size,
            urlencoding::encode(branch)
        );
        if let Some(id) = before {
            path.push_str(&format!("&startBuildId={}", id));
        }

        let history: HistoryResponse = self.get_json(&path).await?;
        Ok(history.builds)
    }

    async fn list_jobs(&self, project: &Project, build_version: &str) -> AnalyzerResult<Vec<Job>> {
        let path = format!(
            "{}/build/{}",
            Self::project_path(project),
            urlencoding::encode(build_version)
        );

        let details: BuildDetailsResponse = self.get_json(&path).await?;
        Ok(details.build.jobs)
    }

    async fn test_results(&self, job: &Job) -> AnalyzerResult<JobTestResults> {
        let path = format!("/buildjobs/{}/tests", urlencoding::encode(&job.job_id));
        self.get_json(&path).await
    }
}
