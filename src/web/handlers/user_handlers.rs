// src/web/handlers/user_handlers.rs
use crate::auth::{hash_password, verify_password, AuthenticatedIdentity};
use crate::core::database::{is_unique_violation, ProfileRepository, UserRepository};
use crate::core::Database;
use crate::models::{ApplicationProfile, ApplicationUser, ProfileUpdate};
use crate::session::UserLookupResponse;
use crate::utils::{normalize_email, validate_email};
use crate::web::types::*;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_handler(
    request: Json<RegisterRequest>,
    db: &State<Database>,
) -> ApiResult<ApplicationUser> {
    let request = request.into_inner();

    if validate_email(&request.email).is_err() {
        return Err(api_error(
            Status::BadRequest,
            "Invalid email address",
            "INVALID_EMAIL",
            &["Provide an address like name@example.com"],
        ));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(api_error(
            Status::BadRequest,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            "WEAK_PASSWORD",
            &["Choose a longer password"],
        ));
    }

    let email = normalize_email(&request.email);
    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        api_error(
            Status::InternalServerError,
            "Failed to register user",
            "REGISTRATION_ERROR",
            &["Try again in a few moments"],
        )
    })?;

    let repo = UserRepository::new(db.pool());
    match repo.create(&email, &password_hash, request.user_type).await {
        Ok(user) => {
            info!("Registered {} account for {}", user.user_type, user.email);
            Ok(Json(DataResponse::success(
                "User registered successfully",
                user.public(),
            )))
        }
        Err(e) if is_unique_violation(&e) => Err(api_error(
            Status::Conflict,
            format!("An account for '{}' already exists", email),
            "USER_EXISTS",
            &["Log in instead", "Use a different email address"],
        )),
        Err(e) => Err(database_error(e)),
    }
}

pub async fn login_handler(request: Json<LoginRequest>, db: &State<Database>) -> ApiResult<LoginData> {
    let email = normalize_email(&request.email);
    let invalid = || {
        api_error(
            Status::Unauthorized,
            "Invalid email or password",
            "INVALID_CREDENTIALS",
            &["Check your email and password"],
        )
    };

    let user = UserRepository::new(db.pool())
        .find_by_email(&email)
        .await
        .map_err(database_error)?
        .ok_or_else(invalid)?;

    match verify_password(&request.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!("Failed login for {}", email);
            return Err(invalid());
        }
        Err(e) => {
            tracing::error!("Stored credential for {} is unreadable: {}", email, e);
            return Err(invalid());
        }
    }

    let profile = ProfileRepository::new(db.pool())
        .find_by_owner(&user.id)
        .await
        .map_err(database_error)?;

    info!("User {} logged in", email);
    Ok(Json(DataResponse::success(
        "Login successful",
        LoginData {
            user: user.public(),
            profile,
        },
    )))
}

/// Not-found is an ordinary answer here, never an HTTP error
pub async fn lookup_handler(
    email: &str,
    db: &State<Database>,
) -> Result<Json<UserLookupResponse>, ApiError> {
    if validate_email(email).is_err() {
        return Err(api_error(
            Status::BadRequest,
            "Invalid email address",
            "INVALID_EMAIL",
            &["Provide the signed-in user's primary email"],
        ));
    }

    let email = normalize_email(email);
    let Some(user) = UserRepository::new(db.pool())
        .find_by_email(&email)
        .await
        .map_err(database_error)?
    else {
        info!("Lookup for {}: no application user", email);
        return Ok(Json(UserLookupResponse::not_found()));
    };

    let profile = ProfileRepository::new(db.pool())
        .find_by_owner(&user.id)
        .await
        .map_err(database_error)?;

    info!("Lookup for {}: found user {}", email, user.id);
    Ok(Json(UserLookupResponse::found(user.public(), profile)))
}

pub async fn get_user_profile_handler(
    user_id: &str,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    let profile = ProfileRepository::new(db.pool())
        .find_by_owner(user_id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Profile", user_id))?;

    Ok(Json(DataResponse::success("Profile loaded", profile)))
}

pub async fn save_user_profile_handler(
    user_id: &str,
    update: Json<ProfileUpdate>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    let user = UserRepository::new(db.pool())
        .find_by_id(user_id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("User", user_id))?;

    if auth.identity().email().as_deref() != Some(user.email.as_str()) {
        warn!(
            "Identity {} tried to edit profile of user {}",
            auth.id(),
            user.id
        );
        return Err(api_error(
            Status::Forbidden,
            "You can only edit your own profile",
            "FORBIDDEN",
            &["Sign in with the account that owns this profile"],
        ));
    }

    let profile = ProfileRepository::new(db.pool())
        .upsert(&update.into_inner().into_profile(&user.id))
        .await
        .map_err(database_error)?;

    Ok(Json(DataResponse::success("Profile saved", profile)))
}
