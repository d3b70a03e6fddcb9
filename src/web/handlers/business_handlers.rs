// src/web/handlers/business_handlers.rs
use crate::auth::AuthenticatedIdentity;
use crate::core::database::BusinessRepository;
use crate::core::Database;
use crate::models::{Business, BusinessInput};
use super::ownership::ensure_caller_owns;
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

fn validate_business(input: &BusinessInput) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "Business name cannot be empty",
            "INVALID_BUSINESS",
            &["Provide the business name"],
        ));
    }
    Ok(())
}

pub async fn create_business_handler(
    input: Json<BusinessInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Business> {
    validate_business(&input)?;
    ensure_caller_owns(auth.identity(), db.pool(), "business", &[input.user_id.as_deref()]).await?;

    let business = BusinessRepository::new(db.pool())
        .create(&input)
        .await
        .map_err(database_error)?;

    info!("Identity {} registered business {}", auth.id(), business.id);
    Ok(Json(DataResponse::success("Business created", business)))
}

pub async fn list_businesses_handler(db: &State<Database>) -> ApiResult<Vec<Business>> {
    let businesses = BusinessRepository::new(db.pool())
        .list()
        .await
        .map_err(database_error)?;

    Ok(Json(DataResponse::success(
        format!("{} businesses found", businesses.len()),
        businesses,
    )))
}

pub async fn get_business_handler(id: &str, db: &State<Database>) -> ApiResult<Business> {
    let business = BusinessRepository::new(db.pool())
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Business", id))?;

    Ok(Json(DataResponse::success("Business loaded", business)))
}

pub async fn update_business_handler(
    id: &str,
    input: Json<BusinessInput>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<Business> {
    validate_business(&input)?;

    let repo = BusinessRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Business", id))?;
    ensure_caller_owns(
        auth.identity(),
        db.pool(),
        "business",
        &[existing.user_id.as_deref(), input.user_id.as_deref()],
    )
    .await?;

    let business = repo
        .update(id, &input)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Business", id))?;

    info!("Identity {} updated business {}", auth.id(), id);
    Ok(Json(DataResponse::success("Business updated", business)))
}

pub async fn delete_business_handler(
    id: &str,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = BusinessRepository::new(db.pool());
    let existing = repo
        .get(id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Business", id))?;
    ensure_caller_owns(auth.identity(), db.pool(), "business", &[existing.user_id.as_deref()]).await?;

    let deleted = repo
        .delete(id)
        .await
        .map_err(database_error)?;

    if !deleted {
        return Err(not_found("Business", id));
    }

    info!("Identity {} deleted business {}", auth.id(), id);
    Ok(Json(ActionResponse::success(
        format!("Business '{}' deleted", id),
        "deleted",
    )))
}
