// src/web/handlers/ownership.rs
//! Write access for businesses, job seekers and jobs.
//!
//! A record with an owning user can only be changed by the identity whose email
//! belongs to that user. Records without an owner are open to any signed-in
//! identity.

use crate::core::database::{BusinessRepository, UserRepository};
use crate::session::SessionIdentity;
use crate::web::types::*;
use rocket::http::Status;
use sqlx::SqlitePool;
use tracing::warn;

/// Application user behind the caller's identity, matched on email
pub(crate) async fn caller_user_id(
    identity: &SessionIdentity,
    pool: &SqlitePool,
) -> Result<Option<String>, ApiError> {
    let Some(email) = identity.email() else {
        return Ok(None);
    };

    let user = UserRepository::new(pool)
        .find_by_email(&email)
        .await
        .map_err(database_error)?;
    Ok(user.map(|u| u.id))
}

/// A job belongs to whoever owns its business
pub(crate) async fn business_owner(
    business_id: Option<&str>,
    pool: &SqlitePool,
) -> Result<Option<String>, ApiError> {
    let Some(business_id) = business_id else {
        return Ok(None);
    };

    let business = BusinessRepository::new(pool)
        .get(business_id)
        .await
        .map_err(database_error)?;
    Ok(business.and_then(|b| b.user_id))
}

fn check_owner(owner: &str, caller: Option<&str>, what: &str) -> Result<(), ApiError> {
    if caller == Some(owner) {
        return Ok(());
    }

    warn!(
        "Rejected write to {} owned by {} (caller user: {:?})",
        what, owner, caller
    );
    Err(api_error(
        Status::Forbidden,
        format!("You can only change a {} you own", what),
        "FORBIDDEN",
        &["Sign in with the account that owns this record"],
    ))
}

/// Every `Some` owner must be the caller's application user
pub(crate) async fn ensure_caller_owns(
    identity: &SessionIdentity,
    pool: &SqlitePool,
    what: &str,
    owners: &[Option<&str>],
) -> Result<(), ApiError> {
    if owners.iter().all(Option::is_none) {
        return Ok(());
    }

    let caller = caller_user_id(identity, pool).await?;
    for owner in owners.iter().flatten() {
        check_owner(owner, caller.as_deref(), what)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::{BusinessInput, UserType};

    async fn setup() -> (tempfile::TempDir, Database, String, String) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("owners.db")).await.unwrap();

        let owner = UserRepository::new(db.pool())
            .create("owner@shop.in", "hash", UserType::Business)
            .await
            .unwrap();
        let business = BusinessRepository::new(db.pool())
            .create(&BusinessInput {
                user_id: Some(owner.id.clone()),
                name: "Corner Bakery".to_string(),
                industry: None,
                location: Some("Pune".to_string()),
                contact_email: None,
                description: None,
            })
            .await
            .unwrap();

        (dir, db, owner.id, business.id)
    }

    #[tokio::test]
    async fn owner_is_resolved_through_identity_email() {
        let (_dir, db, owner_id, business_id) = setup().await;

        let identity = SessionIdentity::new("idp_owner").with_email("Owner@Shop.in");
        assert_eq!(
            caller_user_id(&identity, db.pool()).await.unwrap(),
            Some(owner_id.clone())
        );
        assert_eq!(
            business_owner(Some(business_id.as_str()), db.pool()).await.unwrap(),
            Some(owner_id)
        );
        assert_eq!(business_owner(None, db.pool()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn only_the_owner_may_write() {
        let (_dir, db, owner_id, _) = setup().await;

        let owner = SessionIdentity::new("idp_owner").with_email("owner@shop.in");
        let stranger = SessionIdentity::new("idp_other").with_email("other@shop.in");
        let no_email = SessionIdentity::new("idp_anon");

        ensure_caller_owns(&owner, db.pool(), "business", &[Some(owner_id.as_str())])
            .await
            .unwrap();

        let (status, body) = ensure_caller_owns(&stranger, db.pool(), "business", &[Some(owner_id.as_str())])
            .await
            .unwrap_err();
        assert_eq!(status, Status::Forbidden);
        assert_eq!(body.error_code, "FORBIDDEN");

        assert!(ensure_caller_owns(&no_email, db.pool(), "business", &[Some(owner_id.as_str())])
            .await
            .is_err());

        // Unowned records stay open
        ensure_caller_owns(&stranger, db.pool(), "job", &[None, None])
            .await
            .unwrap();
    }
}
