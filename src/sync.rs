//! On-demand market data sync via an external CI workflow.
//!
//! Price and prediction rows are written by a scheduled ingestion job that
//! lives outside this repository. The admin sync endpoint triggers an
//! off-schedule run by dispatching that job's workflow.

use reqwest::header;

use crate::{config::DataSyncConfig, errors::Error};

pub struct WorkflowDispatcher {
    http: reqwest::Client,
    config: DataSyncConfig,
}

impl WorkflowDispatcher {
    pub fn new(config: DataSyncConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Fire a `workflow_dispatch` for the configured ingestion workflow.
    #[tracing::instrument(skip(self), fields(repository = %self.config.repository, workflow = %self.config.workflow))]
    pub async fn dispatch(&self) -> Result<(), Error> {
        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.config.api_base, self.config.repository, self.config.workflow
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .header(header::USER_AGENT, "tickerdeck")
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&serde_json::json!({ "ref": self.config.git_ref }))
            .send()
            .await
            .map_err(|e| Error::Upstream {
                service: "workflow dispatch".to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                service: "workflow dispatch".to_string(),
                message: format!("{status}: {body}"),
            });
        }

        tracing::info!("Dispatched market data sync workflow");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSyncConfig;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_base: String) -> DataSyncConfig {
        DataSyncConfig {
            repository: "tickerdeck/market-data".to_string(),
            workflow: "sync.yml".to_string(),
            git_ref: "main".to_string(),
            token: "test-token".to_string(),
            api_base,
        }
    }

    #[tokio::test]
    async fn dispatch_posts_to_the_workflow_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/tickerdeck/market-data/actions/workflows/sync.yml/dispatches"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({ "ref": "main" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = WorkflowDispatcher::new(test_config(server.uri()));
        dispatcher.dispatch().await.expect("dispatch should succeed");
    }

    #[tokio::test]
    async fn failed_dispatch_surfaces_as_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("workflow not found"))
            .mount(&server)
            .await;

        let dispatcher = WorkflowDispatcher::new(test_config(server.uri()));
        let err = dispatcher.dispatch().await.expect_err("dispatch should fail");
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
