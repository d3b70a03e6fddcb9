// src/session/store.rs
//! Client-side application state: the `auth` and `profile` slices

use crate::models::{ApplicationProfile, ApplicationUser};
use crate::session::identity::SessionIdentity;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedStore = Arc<RwLock<AppStore>>;

/// `is_logged_in` is derived from `login_details`, so the two cannot disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    login_details: Option<ApplicationUser>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.login_details.is_some()
    }

    pub fn login_details(&self) -> Option<&ApplicationUser> {
        self.login_details.as_ref()
    }

    pub fn login(&mut self, user: ApplicationUser) {
        self.login_details = Some(user);
    }

    pub fn logout(&mut self) {
        self.login_details = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: BTreeSet<String>,
    pub desired_role: Option<String>,
    pub education: Option<String>,
    pub bio: Option<String>,
}

impl ProfileData {
    fn seed_from_identity(&mut self, identity: &SessionIdentity) {
        fill_if_empty(&mut self.full_name, identity.full_name.as_deref());
        fill_if_empty(&mut self.email, identity.email().as_deref());
        fill_if_empty(&mut self.image_url, identity.image_url.as_deref());
    }

    fn merge_profile(&mut self, profile: &ApplicationProfile) {
        overwrite(&mut self.full_name, profile.full_name.as_deref());
        overwrite(&mut self.email, profile.email.as_deref());
        overwrite(&mut self.image_url, profile.image_url.as_deref());
        overwrite(&mut self.phone, profile.phone.as_deref());
        overwrite(&mut self.location, profile.location.as_deref());
        overwrite(&mut self.desired_role, profile.desired_role.as_deref());
        overwrite(&mut self.education, profile.education.as_deref());
        overwrite(&mut self.bio, profile.bio.as_deref());
        if !profile.skills.is_empty() {
            self.skills = profile.skills.clone();
        }
    }
}

fn fill_if_empty(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = crate::utils::non_empty(value);
    }
}

fn overwrite(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = crate::utils::non_empty(value) {
        *slot = Some(value);
    }
}

/// Clearing `session_identity` always resets `profile_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSyncState {
    session_identity: Option<SessionIdentity>,
    profile_data: ProfileData,
}

impl ProfileSyncState {
    pub fn session_identity(&self) -> Option<&SessionIdentity> {
        self.session_identity.as_ref()
    }

    pub fn profile_data(&self) -> &ProfileData {
        &self.profile_data
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppStore {
    pub auth: AuthState,
    pub profile: ProfileSyncState,
}

impl AppStore {
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn set_identity(&mut self, identity: SessionIdentity) {
        // A different identity replaces whatever the previous one left behind
        if self
            .profile
            .session_identity
            .as_ref()
            .is_some_and(|current| current.id != identity.id)
        {
            self.clear_identity();
        }

        self.profile.profile_data.seed_from_identity(&identity);
        self.profile.session_identity = Some(identity);
    }

    /// Last write wins; applying the same merge twice is a no-op.
    pub fn merge_user_and_profile(
        &mut self,
        user: ApplicationUser,
        profile: Option<&ApplicationProfile>,
    ) {
        self.auth.login(user);
        if let Some(profile) = profile {
            self.profile.profile_data.merge_profile(profile);
        }
    }

    pub fn clear_identity(&mut self) {
        self.auth = AuthState::default();
        self.profile = ProfileSyncState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;

    fn user() -> ApplicationUser {
        ApplicationUser {
            id: "u1".to_string(),
            email: "sam@example.com".to_string(),
            user_type: UserType::Jobseeker,
        }
    }

    fn profile() -> ApplicationProfile {
        ApplicationProfile {
            owner_id: "u1".to_string(),
            full_name: Some("Sam Stored".to_string()),
            location: Some("Pune".to_string()),
            skills: ["react".to_string(), "sql".to_string()].into_iter().collect(),
            desired_role: Some("Frontend Developer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn set_identity_seeds_empty_contact_fields() {
        let mut store = AppStore::default();
        store.set_identity(
            SessionIdentity::new("idp_1")
                .with_email("Sam@Example.com")
                .with_name("Sam")
                .with_image_url("https://img/sam.png"),
        );

        let data = store.profile.profile_data();
        assert_eq!(data.full_name.as_deref(), Some("Sam"));
        assert_eq!(data.email.as_deref(), Some("sam@example.com"));
        assert_eq!(data.image_url.as_deref(), Some("https://img/sam.png"));
        assert!(!store.auth.is_logged_in());
    }

    #[test]
    fn merge_overrides_identity_seed_and_logs_in() {
        let mut store = AppStore::default();
        store.set_identity(SessionIdentity::new("idp_1").with_name("Sam"));
        store.merge_user_and_profile(user(), Some(&profile()));

        assert!(store.auth.is_logged_in());
        assert_eq!(store.auth.login_details(), Some(&user()));
        let data = store.profile.profile_data();
        assert_eq!(data.full_name.as_deref(), Some("Sam Stored"));
        assert_eq!(data.skills.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut once = AppStore::default();
        once.set_identity(SessionIdentity::new("idp_1"));
        once.merge_user_and_profile(user(), Some(&profile()));

        let mut twice = once.clone();
        twice.merge_user_and_profile(user(), Some(&profile()));

        assert_eq!(once, twice);
    }

    #[test]
    fn clear_identity_resets_both_slices() {
        let mut store = AppStore::default();
        store.set_identity(SessionIdentity::new("idp_1").with_name("Sam"));
        store.merge_user_and_profile(user(), Some(&profile()));

        store.clear_identity();

        assert_eq!(store, AppStore::default());
        assert!(!store.auth.is_logged_in());
        assert_eq!(store.profile.profile_data(), &ProfileData::default());
    }

    #[test]
    fn switching_identity_drops_previous_state() {
        let mut store = AppStore::default();
        store.set_identity(SessionIdentity::new("idp_1").with_name("Sam"));
        store.merge_user_and_profile(user(), Some(&profile()));

        store.set_identity(SessionIdentity::new("idp_2").with_name("Alex"));

        assert!(!store.auth.is_logged_in());
        assert_eq!(store.profile.profile_data().full_name.as_deref(), Some("Alex"));
        assert!(store.profile.profile_data().skills.is_empty());
    }
}
