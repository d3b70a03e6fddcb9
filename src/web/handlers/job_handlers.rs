// src/web/handlers/job_handlers.rs
use crate::auth::AuthenticatedIdentity;
use crate::core::database::{JobFilter, JobRepository};
use crate::core::Database;
use crate::models::{Job, JobInput};
use super::ownership::{business_owner, ensure_caller_owns};
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

fn validate_job(input: &JobInput) -> Result<(), ApiError> {
    let missing: Vec<&str> = [
        ("title", input.title.as_str()),
        ("description", input.description.as_str()),
        ("location", input.location.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(api_error(
        Status::BadRequest,
        format!("Missing required fields: {}", missing.join(", ")),
        "INVALID_JOB",
        &["Every job needs a title, description and location"],
    ))
}

pub async fn create_job_handler(
    input: Json<JobInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Job> {
    validate_job(&input)?;
    let owner = business_owner(input.business_id.as_deref(), db.pool()).await?;
    ensure_caller_owns(auth.identity(), db.pool(), "job", &[owner.as_deref()]).await?;

    let job = JobRepository::new(db.pool())
        .create(&input)
        .await
        .map_err(database_error)?;

    info!("Identity {} posted job {}", auth.id(), job.id);
    Ok(Json(DataResponse::success("Job posted", job)))
}

pub async fn list_jobs_handler(
    location: Option<&str>,
    keyword: Option<&str>,
    db: &State<Database>,
) -> ApiResult<Vec<Job>> {
    let filter = JobFilter {
        location: location.map(str::to_string),
        keyword: keyword.map(str::to_string),
    };

    let jobs = JobRepository::new(db.pool())
        .list(&filter)
        .await
        .map_err(database_error)?;

    Ok(Json(DataResponse::success(
        format!("{} jobs found", jobs.len()),
        jobs,
    )))
}

pub async fn get_job_handler(id: &str, db: &State<Database>) -> ApiResult<Job> {
    let job = JobRepository::new(db.pool())
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job", id))?;

    Ok(Json(DataResponse::success("Job loaded", job)))
}

pub async fn update_job_handler(
    id: &str,
    input: Json<JobInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Job> {
    validate_job(&input)?;

    let repo = JobRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job", id))?;
    let current_owner = business_owner(existing.business_id.as_deref(), db.pool()).await?;
    let new_owner = business_owner(input.business_id.as_deref(), db.pool()).await?;
    ensure_caller_owns(
        auth.identity(),
        db.pool(),
        "job",
        &[current_owner.as_deref(), new_owner.as_deref()],
    )
    .await?;

    let job = repo
        .update(id, &input)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job", id))?;

    info!("Identity {} updated job {}", auth.id(), id);
    Ok(Json(DataResponse::success("Job updated", job)))
}

pub async fn delete_job_handler(
    id: &str,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = JobRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job", id))?;
    let owner = business_owner(existing.business_id.as_deref(), db.pool()).await?;
    ensure_caller_owns(auth.identity(), db.pool(), "job", &[owner.as_deref()]).await?;

    let deleted = repo
        .delete(id)
        .await
        .map_err(database_error)?;

    if !deleted {
        return Err(not_found("Job", id));
    }

    info!("Identity {} deleted job {}", auth.id(), id);
    Ok(Json(ActionResponse::success(
        format!("Job '{}' deleted", id),
        "deleted",
    )))
}
