// src/web/handlers/profile_handlers.rs
//! Generic profile flow: profiles owned directly by an identity-provider id

use crate::auth::AuthenticatedIdentity;
use crate::core::database::ProfileRepository;
use crate::core::Database;
use crate::models::{ApplicationProfile, ProfileUpdate};
use crate::web::types::*;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn get_identity_profile_handler(
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    let profile = ProfileRepository::new(db.pool())
        .find_by_owner(auth.id())
        .await
        .map_err(database_error)?
        .ok_or_else(|| not_found("Profile", auth.id()))?;

    Ok(Json(DataResponse::success("Profile loaded", profile)))
}

pub async fn save_identity_profile_handler(
    update: Json<ProfileUpdate>,
    auth: AuthenticatedIdentity,
    db: &State<Database>,
) -> ApiResult<ApplicationProfile> {
    let identity = auth.identity();
    let mut profile = update.into_inner().into_profile(&identity.id);

    // Contact fields default to what the identity provider knows
    if profile.email.is_none() {
        profile.email = identity.email();
    }
    if profile.full_name.is_none() {
        profile.full_name = identity.full_name.clone();
    }
    if profile.image_url.is_none() {
        profile.image_url = identity.image_url.clone();
    }

    let saved = ProfileRepository::new(db.pool())
        .upsert(&profile)
        .await
        .map_err(database_error)?;

    info!("Identity {} saved their profile", identity.id);
    Ok(Json(DataResponse::success("Profile saved", saved)))
}
