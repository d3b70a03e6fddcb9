// src/web/handlers/jobseeker_handlers.rs
use crate::auth::AuthenticatedIdentity;
use crate::core::database::JobSeekerRepository;
use crate::core::Database;
use crate::models::{JobSeeker, JobSeekerInput};
use super::ownership::ensure_caller_owns;
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

fn validate_job_seeker(input: &JobSeekerInput) -> Result<(), ApiError> {
    if input.full_name.trim().is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "Full name cannot be empty",
            "INVALID_JOB_SEEKER",
            &["Provide the job seeker's name"],
        ));
    }
    if input.experience_years.is_some_and(|years| years < 0) {
        return Err(api_error(
            Status::BadRequest,
            "Experience cannot be negative",
            "INVALID_JOB_SEEKER",
            &["Use 0 for no prior experience"],
        ));
    }
    Ok(())
}

pub async fn create_job_seeker_handler(
    input: Json<JobSeekerInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<JobSeeker> {
    validate_job_seeker(&input)?;
    ensure_caller_owns(auth.identity(), db.pool(), "job seeker", &[input.user_id.as_deref()]).await?;

    let seeker = JobSeekerRepository::new(db.pool())
        .create(&input)
        .await
        .map_err(database_error)?;

    info!("Identity {} created job seeker {}", auth.id(), seeker.id);
    Ok(Json(DataResponse::success("Job seeker created", seeker)))
}

pub async fn list_job_seekers_handler(db: &State<Database>) -> ApiResult<Vec<JobSeeker>> {
    let seekers = JobSeekerRepository::new(db.pool())
        .list()
        .await
        .map_err(database_error)?;

    Ok(Json(DataResponse::success(
        format!("{} job seekers found", seekers.len()),
        seekers,
    )))
}

pub async fn get_job_seeker_handler(id: &str, db: &State<Database>) -> ApiResult<JobSeeker> {
    let seeker = JobSeekerRepository::new(db.pool())
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job seeker", id))?;

    Ok(Json(DataResponse::success("Job seeker loaded", seeker)))
}

pub async fn update_job_seeker_handler(
    id: &str,
    input: Json<JobSeekerInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<JobSeeker> {
    validate_job_seeker(&input)?;

    let repo = JobSeekerRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job seeker", id))?;
    ensure_caller_owns(
        auth.identity(),
        db.pool(),
        "job seeker",
        &[existing.user_id.as_deref(), input.user_id.as_deref()],
    )
    .await?;

    let seeker = repo
        .update(id, &input)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job seeker", id))?;

    info!("Identity {} updated job seeker {}", auth.id(), id);
    Ok(Json(DataResponse::success("Job seeker updated", seeker)))
}

pub async fn delete_job_seeker_handler(
    id: &str,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = JobSeekerRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Job seeker", id))?;
    ensure_caller_owns(auth.identity(), db.pool(), "job seeker", &[existing.user_id.as_deref()]).await?;

    let deleted = repo
        .delete(id)
        .await
        .map_err(database_error)?;

    if !deleted {
        return Err(not_found("Job seeker", id));
    }

    info!("Identity {} deleted job seeker {}", auth.id(), id);
    Ok(Json(ActionResponse::success(
        format!("Job seeker '{}' deleted", id),
        "deleted",
    )))
}
