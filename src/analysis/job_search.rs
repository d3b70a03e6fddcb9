// src/analysis/job_search.rs
//! Proxy to the Jooble job aggregator; results are passed through unmodified

use crate::core::config_manager::ServiceConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearchRequest {
    pub keywords: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

pub struct JobSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl JobSearchClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = config
            .jooble_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("JOOBLE_API_KEY environment variable not set"))?;

        Self::new(&config.jooble_api_url, api_key, config.timeout_seconds)
    }

    pub fn new(base_url: &str, api_key: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Returns the aggregator's `jobs` array as-is.
    /// The key is part of the URL, so errors never carry the URL.
    pub async fn search(&self, request: &JobSearchRequest) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, self.api_key);
        info!(
            "Searching jobs: keywords='{}' location='{}' page={}",
            request.keywords, request.location, request.page
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to reach job search service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Job search error {}: {}", status, error_text);
            anyhow::bail!("Job search returned error {}: {}", status, error_text);
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse job search response")?;

        Ok(body
            .get_mut("jobs")
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_forwards_request_and_returns_jobs_unmodified() {
        let mock_server = MockServer::start().await;
        let jobs = json!([{ "title": "Delivery Partner", "location": "Indore", "salary": "" }]);

        Mock::given(method("POST"))
            .and(path("/secret-key"))
            .and(body_json(json!({ "keywords": "delivery", "location": "Indore", "page": 2 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "totalCount": 1, "jobs": jobs })),
            )
            .mount(&mock_server)
            .await;

        let client = JobSearchClient::new(&mock_server.uri(), "secret-key".to_string(), 5).unwrap();
        let result = client
            .search(&JobSearchRequest {
                keywords: "delivery".to_string(),
                location: "Indore".to_string(),
                page: 2,
            })
            .await
            .unwrap();

        assert_eq!(result, jobs);
    }

    #[tokio::test]
    async fn missing_jobs_field_is_empty_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalCount": 0 })))
            .mount(&mock_server)
            .await;

        let client = JobSearchClient::new(&mock_server.uri(), "k".to_string(), 5).unwrap();
        let result = client
            .search(&JobSearchRequest {
                keywords: "x".to_string(),
                location: String::new(),
                page: 1,
            })
            .await
            .unwrap();

        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = JobSearchClient::new(&mock_server.uri(), "k".to_string(), 5).unwrap();
        let request: JobSearchRequest =
            serde_json::from_value(json!({ "keywords": "cook" })).unwrap();
        assert_eq!(request.page, 1);
        assert!(client.search(&request).await.is_err());
    }

    #[tokio::test]
    async fn errors_do_not_expose_api_key() {
        let client =
            JobSearchClient::new("http://127.0.0.1:9", "SUPERSECRETKEY".to_string(), 2).unwrap();
        let request: JobSearchRequest =
            serde_json::from_value(json!({ "keywords": "cook" })).unwrap();

        let err = client.search(&request).await.unwrap_err();
        let text = format!("{:#} {:?}", err, err);
        assert!(!text.contains("SUPERSECRETKEY"), "key leaked: {}", text);

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client =
            JobSearchClient::new(&mock_server.uri(), "SUPERSECRETKEY".to_string(), 2).unwrap();
        let err = client.search(&request).await.unwrap_err();
        assert!(!format!("{:#}", err).contains("SUPERSECRETKEY"));
    }
}
