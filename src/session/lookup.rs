// src/session/lookup.rs
use crate::models::{ApplicationProfile, ApplicationUser};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const LOOKUP_ENDPOINT: &str = "/api/users/lookup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found {
        user: ApplicationUser,
        profile: Option<ApplicationProfile>,
    },
    NotFound,
}

/// Resolves an email to the application's own user and profile records.
///
/// A missing user is `Ok(LookupOutcome::NotFound)`. `Err` is reserved for
/// transport and server failures.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn lookup_by_email(&self, email: &str) -> Result<LookupOutcome>;
}

/// Wire shape of `GET /api/users/lookup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLookupResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ApplicationUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ApplicationProfile>,
}

impl UserLookupResponse {
    pub fn not_found() -> Self {
        Self {
            found: false,
            user: None,
            profile: None,
        }
    }

    pub fn found(user: ApplicationUser, profile: Option<ApplicationProfile>) -> Self {
        Self {
            found: true,
            user: Some(user),
            profile,
        }
    }

    fn into_outcome(self) -> Result<LookupOutcome> {
        match (self.found, self.user) {
            (false, _) => Ok(LookupOutcome::NotFound),
            (true, Some(user)) => Ok(LookupOutcome::Found {
                user,
                profile: self.profile,
            }),
            (true, None) => anyhow::bail!("Lookup response marked found but carried no user"),
        }
    }
}

pub struct HttpUserLookup {
    client: Client,
    base_url: String,
}

impl HttpUserLookup {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UserLookup for HttpUserLookup {
    async fn lookup_by_email(&self, email: &str) -> Result<LookupOutcome> {
        let url = format!("{}{}", self.base_url, LOOKUP_ENDPOINT);
        info!("Looking up application user by email at {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await
            .context("Failed to reach user lookup service")?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("User lookup returned error {}: {}", status, error_text);
        }

        let body: UserLookupResponse = response
            .json()
            .await
            .context("Failed to parse user lookup response")?;

        body.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn found_record_is_returned() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .and(query_param("email", "sam@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "found": true,
                "user": { "id": "u1", "email": "sam@example.com", "type": "jobseeker" },
                "profile": { "owner_id": "u1", "skills": ["react"], "desired_role": "Frontend" }
            })))
            .mount(&mock_server)
            .await;

        let lookup = HttpUserLookup::new(mock_server.uri(), 5).unwrap();
        let outcome = lookup.lookup_by_email("sam@example.com").await.unwrap();

        match outcome {
            LookupOutcome::Found { user, profile } => {
                assert_eq!(user.id, "u1");
                assert_eq!(user.user_type, UserType::Jobseeker);
                let profile = profile.expect("profile present");
                assert!(profile.skills.contains("react"));
            }
            LookupOutcome::NotFound => panic!("expected a found record"),
        }
    }

    #[tokio::test]
    async fn found_false_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "found": false })))
            .mount(&mock_server)
            .await;

        let lookup = HttpUserLookup::new(mock_server.uri(), 5).unwrap();
        let outcome = lookup.lookup_by_email("nobody@example.com").await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn http_404_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let lookup = HttpUserLookup::new(mock_server.uri(), 5).unwrap();
        let outcome = lookup.lookup_by_email("nobody@example.com").await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn server_error_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let lookup = HttpUserLookup::new(mock_server.uri(), 5).unwrap();
        assert!(lookup.lookup_by_email("sam@example.com").await.is_err());
    }

    #[tokio::test]
    async fn found_without_user_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "found": true })))
            .mount(&mock_server)
            .await;

        let lookup = HttpUserLookup::new(mock_server.uri(), 5).unwrap();
        assert!(lookup.lookup_by_email("sam@example.com").await.is_err());
    }
}
