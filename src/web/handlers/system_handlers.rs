// src/web/handlers/system_handlers.rs
use crate::auth::{AuthenticatedIdentity, OptionalIdentity};
use crate::core::database::UserRepository;
use crate::core::Database;
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn current_identity_handler(
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<CurrentIdentity> {
    let identity = auth.identity;
    let user = match identity.email() {
        Some(email) => UserRepository::new(db.pool())
            .find_by_email(&email)
            .await
            .map_err(database_error)?
            .map(|u| u.public()),
        None => None,
    };

    Ok(Json(DataResponse::success(
        "Identity authenticated",
        CurrentIdentity { identity, user },
    )))
}

pub async fn health_handler(
    auth: OptionalIdentity,
    db: &State<Database>,
) -> Result<Json<&'static str>, Status> {
    match auth.identity {
        Some(auth) => info!("Health check by identity: {}", auth.id()),
        None => info!("Health check by anonymous user"),
    }

    if let Err(e) = db.health_check().await {
        error!("Health check failed: {:#}", e);
        return Err(Status::ServiceUnavailable);
    }

    Ok(Json("OK"))
}
