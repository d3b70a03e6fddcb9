// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::analysis::{JobSearchClient, LlmClient, SkillAnalyzer};
use crate::analysis::{JobSearchRequest, SkillGapReport, SkillGapRequest};
use crate::auth::{AuthConfig, AuthenticatedIdentity, OptionalIdentity};
use crate::core::{ConfigManager, Database};
use crate::models::{
    ApplicationProfile, ApplicationUser, Business, BusinessInput, Job, JobInput, JobSeeker,
    JobSeekerInput, ProfileUpdate,
};
use crate::session::UserLookupResponse;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::{Json, Value};
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use tracing::{error, info, warn};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Users

#[post("/users/register", data = "<request>")]
pub async fn register_user(request: Json<RegisterRequest>, db: &State<Database>) -> ApiResult<ApplicationUser> {
    handlers::register_handler(request, db).await
}

#[post("/users/login", data = "<request>")]
pub async fn login_user(request: Json<LoginRequest>, db: &State<Database>) -> ApiResult<LoginData> {
    handlers::login_handler(request, db).await
}

#[get("/users/lookup?<email>")]
pub async fn lookup_user(
    email: Option<&str>,
    db: &State<Database>,
) -> Result<Json<UserLookupResponse>, ApiError> {
    handlers::lookup_handler(email.unwrap_or_default(), db).await
}

#[get("/users/<id>/profile")]
pub async fn get_user_profile(id: &str, db: &State<Database>) -> ApiResult<ApplicationProfile> {
    handlers::get_user_profile_handler(id, db).await
}

#[put("/users/<id>/profile", data = "<update>")]
pub async fn save_user_profile(
    id: &str,
    update: Json<ProfileUpdate>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    handlers::save_user_profile_handler(id, update, auth, db).await
}

// Identity-owned profile

#[get("/profile")]
pub async fn get_identity_profile(
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    handlers::get_identity_profile_handler(auth, db).await
}

#[put("/profile", data = "<update>")]
pub async fn save_identity_profile(
    update: Json<ProfileUpdate>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    handlers::save_identity_profile_handler(update, auth, db).await
}

// Jobs

#[post("/jobs", data = "<input>")]
pub async fn create_job(input: Json<JobInput>, auth: AuthenticatedIdentity, db: &State<Database>) -> ApiResult<Job> {
    handlers::create_job_handler(input, auth, db).await
}

#[get("/jobs?<location>&<keyword>")]
pub async fn list_jobs(location: Option<&str>, keyword: Option<&str>, db: &State<Database>) -> ApiResult<Vec<Job>> {
    handlers::list_jobs_handler(location, keyword, db).await
}

#[get("/jobs/<id>")]
pub async fn get_job(id: &str, db: &State<Database>) -> ApiResult<Job> {
    handlers::get_job_handler(id, db).await
}

#[put("/jobs/<id>", data = "<input>")]
pub async fn update_job(
    id: &str,
    input: Json<JobInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Job> {
    handlers::update_job_handler(id, input, auth, db).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(id: &str, auth: AuthenticatedIdentity, db: &State<Database>) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_job_handler(id, auth, db).await
}

#[post("/jobs/search", data = "<request>")]
pub async fn search_jobs(request: Json<JobSearchRequest>, services: &State<ServiceState>) -> ApiResult<Value> {
    handlers::job_search_handler(request, services).await
}

// Businesses

#[post("/businesses", data = "<input>")]
pub async fn create_business(
    input: Json<BusinessInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Business> {
    handlers::create_business_handler(input, auth, db).await
}

#[get("/businesses")]
pub async fn list_businesses(db: &State<Database>) -> ApiResult<Vec<Business>> {
    handlers::list_businesses_handler(db).await
}

#[get("/businesses/<id>")]
pub async fn get_business(id: &str, db: &State<Database>) -> ApiResult<Business> {
    handlers::get_business_handler(id, db).await
}

#[put("/businesses/<id>", data = "<input>")]
pub async fn update_business(
    id: &str,
    input: Json<BusinessInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Business> {
    handlers::update_business_handler(id, input, auth, db).await
}

#[delete("/businesses/<id>")]
pub async fn delete_business(
    id: &str,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_business_handler(id, auth, db).await
}

// Job seekers

#[post("/jobseekers", data = "<input>")]
pub async fn create_job_seeker(
    input: Json<JobSeekerInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<JobSeeker> {
    handlers::create_job_seeker_handler(input, auth, db).await
}

#[get("/jobseekers")]
pub async fn list_job_seekers(db: &State<Database>) -> ApiResult<Vec<JobSeeker>> {
    handlers::list_job_seekers_handler(db).await
}

#[get("/jobseekers/<id>")]
pub async fn get_job_seeker(id: &str, db: &State<Database>) -> ApiResult<JobSeeker> {
    handlers::get_job_seeker_handler(id, db).await
}

#[put("/jobseekers/<id>", data = "<input>")]
pub async fn update_job_seeker(
    id: &str,
    input: Json<JobSeekerInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<JobSeeker> {
    handlers::update_job_seeker_handler(id, input, auth, db).await
}

#[delete("/jobseekers/<id>")]
pub async fn delete_job_seeker(
    id: &str,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_job_seeker_handler(id, auth, db).await
}

// Analysis

#[post("/analysis/skill-gap", data = "<request>")]
pub async fn analyze_skill_gap(
    request: Json<SkillGapRequest>,
    services: &State<ServiceState>,
) -> ApiResult<SkillGapReport> {
    handlers::skill_gap_handler(request, services).await
}

// System

#[get("/me")]
pub async fn current_identity(auth: AuthenticatedIdentity, db: &State<Database>) -> ApiResult<CurrentIdentity> {
    handlers::current_identity_handler(auth, db).await
}

#[get("/health")]
pub async fn health(auth: OptionalIdentity, db: &State<Database>) -> Result<Json<&'static str>, Status> {
    handlers::health_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format",
        "BAD_REQUEST",
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required",
        "UNAUTHORIZED",
        vec!["Sign in and send the session token as a Bearer header".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found_catcher() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found",
        "NOT_FOUND",
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be understood",
        "UNPROCESSABLE_ENTITY",
        vec!["Verify field names and types".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error",
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the application without launching it
pub fn build_rocket(
    rocket: Rocket<Build>,
    db: Database,
    auth_config: AuthConfig,
    services: ServiceState,
) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(db)
        .manage(auth_config)
        .manage(services)
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found_catcher, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                register_user,
                login_user,
                lookup_user,
                get_user_profile,
                save_user_profile,
                get_identity_profile,
                save_identity_profile,
                create_job,
                list_jobs,
                get_job,
                update_job,
                delete_job,
                search_jobs,
                create_business,
                list_businesses,
                get_business,
                update_business,
                delete_business,
                create_job_seeker,
                list_job_seekers,
                get_job_seeker,
                update_job_seeker,
                delete_job_seeker,
                analyze_skill_gap,
                current_identity,
                health,
                options,
            ],
        )
}

fn optional_service<T>(name: &str, built: Result<T>) -> Option<T> {
    match built {
        Ok(service) => Some(service),
        Err(e) => {
            warn!("{} disabled: {}", name, e);
            None
        }
    }
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let db = Database::new(&config.environment.database_path).await?;

    let mut auth_config = AuthConfig::new(&config.identity);
    if let Err(e) = auth_config.update_keys().await {
        error!("Failed to fetch identity provider keys: {}", e);
        return Err(e);
    }

    let services = ServiceState {
        analyzer: optional_service(
            "Skill analysis",
            LlmClient::from_config(&config.service).map(SkillAnalyzer::new),
        ),
        job_search: optional_service("Job search", JobSearchClient::from_config(&config.service)),
    };

    info!("Starting job matcher API server");
    info!("Database: {}", config.environment.database_path.display());
    info!("Server: http://0.0.0.0:{}", config.environment.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.environment.port));

    build_rocket(rocket::custom(figment), db, auth_config, services)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::IdentityConfig;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use crate::core::config_manager::LlmProvider;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client() -> (tempfile::TempDir, Client) {
        client_with(ServiceState {
            analyzer: None,
            job_search: None,
        })
        .await
    }

    async fn client_with(services: ServiceState) -> (tempfile::TempDir, Client) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("api.db")).await.unwrap();
        let auth_config = AuthConfig::new(&IdentityConfig {
            issuer: "https://issuer.example.com".to_string(),
            audience: None,
            keys_url: "http://127.0.0.1:9/keys".to_string(),
        });
        let rocket = build_rocket(rocket::build(), db, auth_config, services);
        let client = Client::tracked(rocket).await.unwrap();
        (dir, client)
    }

    async fn register(client: &Client, email: &str) -> Status {
        client
            .post("/api/users/register")
            .header(ContentType::JSON)
            .body(
                json!({ "email": email, "password": "hunter2hunter2", "type": "jobseeker" })
                    .to_string(),
            )
            .dispatch()
            .await
            .status()
    }

    #[rocket::async_test]
    async fn registered_user_is_found_by_lookup() {
        let (_dir, client) = client().await;
        assert_eq!(register(&client, "Sam@Example.com").await, Status::Ok);

        let response = client
            .get("/api/users/lookup?email=sam@example.com")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: UserLookupResponse = response.into_json().await.unwrap();
        assert!(body.found);
        assert_eq!(body.user.unwrap().email, "sam@example.com");
        assert!(body.profile.is_none());
    }

    #[rocket::async_test]
    async fn unknown_email_is_found_false_not_an_error() {
        let (_dir, client) = client().await;

        let response = client
            .get("/api/users/lookup?email=nobody@example.com")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: UserLookupResponse = response.into_json().await.unwrap();
        assert!(!body.found);
        assert!(body.user.is_none());
    }

    #[rocket::async_test]
    async fn lookup_rejects_invalid_email() {
        let (_dir, client) = client().await;

        let response = client.get("/api/users/lookup").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn duplicate_registration_conflicts() {
        let (_dir, client) = client().await;
        assert_eq!(register(&client, "sam@example.com").await, Status::Ok);
        assert_eq!(register(&client, "SAM@example.com").await, Status::Conflict);
    }

    #[rocket::async_test]
    async fn login_checks_password() {
        let (_dir, client) = client().await;
        register(&client, "sam@example.com").await;

        let bad = client
            .post("/api/users/login")
            .header(ContentType::JSON)
            .body(json!({ "email": "sam@example.com", "password": "wrong-password" }).to_string())
            .dispatch()
            .await;
        assert_eq!(bad.status(), Status::Unauthorized);

        let good = client
            .post("/api/users/login")
            .header(ContentType::JSON)
            .body(json!({ "email": "sam@example.com", "password": "hunter2hunter2" }).to_string())
            .dispatch()
            .await;
        assert_eq!(good.status(), Status::Ok);

        let body: serde_json::Value = good.into_json().await.unwrap();
        assert_eq!(body["data"]["user"]["type"], "jobseeker");
        assert!(body["data"]["user"].get("password_hash").is_none());
    }

    #[rocket::async_test]
    async fn writes_require_identity_token() {
        let (_dir, client) = client().await;

        let response = client
            .post("/api/jobs")
            .header(ContentType::JSON)
            .body(
                json!({ "title": "Cook", "description": "Lunch shift", "location": "Pune" })
                    .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "UNAUTHORIZED");
    }

    #[rocket::async_test]
    async fn job_listing_and_missing_job() {
        let (_dir, client) = client().await;

        let list = client.get("/api/jobs?location=pune").dispatch().await;
        assert_eq!(list.status(), Status::Ok);
        let body: serde_json::Value = list.into_json().await.unwrap();
        assert_eq!(body["data"], json!([]));

        let missing = client.get("/api/jobs/does-not-exist").dispatch().await;
        assert_eq!(missing.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn analysis_without_provider_is_unavailable() {
        let (_dir, client) = client().await;

        let response = client
            .post("/api/analysis/skill-gap")
            .header(ContentType::JSON)
            .body(json!({ "userSkills": ["react"], "jobRole": "Frontend Developer" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::ServiceUnavailable);
    }

    async fn skill_gap_error_code(services: ServiceState) -> String {
        let (_dir, client) = client_with(services).await;

        let response = client
            .post("/api/analysis/skill-gap")
            .header(ContentType::JSON)
            .body(json!({ "userSkills": ["tally"], "jobRole": "Accountant" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadGateway);

        let body: serde_json::Value = response.into_json().await.unwrap();
        body["error_code"].as_str().unwrap_or_default().to_string()
    }

    fn groq_analyzer(base_url: &str) -> ServiceState {
        let llm = LlmClient::new(LlmProvider::Groq, "key".to_string(), 2)
            .unwrap()
            .with_base_url(base_url);
        ServiceState {
            analyzer: Some(SkillAnalyzer::new(llm)),
            job_search: None,
        }
    }

    #[rocket::async_test]
    async fn analysis_failures_report_their_cause() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "no idea" } }]
            })))
            .mount(&mock_server)
            .await;

        assert_eq!(
            skill_gap_error_code(groq_analyzer(&mock_server.uri())).await,
            "ANALYSIS_PARSE_ERROR"
        );

        let failing_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&failing_server)
            .await;

        assert_eq!(
            skill_gap_error_code(groq_analyzer(&failing_server.uri())).await,
            "ANALYSIS_UPSTREAM_ERROR"
        );
    }

    #[rocket::async_test]
    async fn health_reports_ok() {
        let (_dir, client) = client().await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "\"OK\"");
    }
}
