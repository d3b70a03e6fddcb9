// src/session/identity.rs
use serde::{Deserialize, Serialize};

/// Lifecycle of the identity provider's session as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStatus {
    NotLoaded,
    LoadedSignedOut,
    LoadedSignedIn,
}

/// Signed-in user as reported by the identity provider. Read-only for us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: String,
    pub primary_email: Option<String>,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
}

impl SessionIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_email: None,
            full_name: None,
            image_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.primary_email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Normalized primary email, `None` when missing or blank
    pub fn email(&self) -> Option<String> {
        crate::utils::non_empty(self.primary_email.as_deref())
            .map(|e| crate::utils::normalize_email(&e))
    }
}

/// Push-style lifecycle notification from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderNotification {
    pub is_loaded: bool,
    pub is_signed_in: bool,
    pub user: Option<SessionIdentity>,
}

impl ProviderNotification {
    pub fn not_loaded() -> Self {
        Self {
            is_loaded: false,
            is_signed_in: false,
            user: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            is_loaded: true,
            is_signed_in: false,
            user: None,
        }
    }

    pub fn signed_in(user: SessionIdentity) -> Self {
        Self {
            is_loaded: true,
            is_signed_in: true,
            user: Some(user),
        }
    }

    pub fn status(&self) -> IdentityStatus {
        match (self.is_loaded, self.is_signed_in, &self.user) {
            (false, _, _) => IdentityStatus::NotLoaded,
            (true, true, Some(_)) => IdentityStatus::LoadedSignedIn,
            _ => IdentityStatus::LoadedSignedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_derived_from_flags() {
        assert_eq!(ProviderNotification::not_loaded().status(), IdentityStatus::NotLoaded);
        assert_eq!(ProviderNotification::signed_out().status(), IdentityStatus::LoadedSignedOut);
        assert_eq!(
            ProviderNotification::signed_in(SessionIdentity::new("id_1")).status(),
            IdentityStatus::LoadedSignedIn
        );

        // Signed in without a user object is not usable
        let odd = ProviderNotification {
            is_loaded: true,
            is_signed_in: true,
            user: None,
        };
        assert_eq!(odd.status(), IdentityStatus::LoadedSignedOut);
    }

    #[test]
    fn email_is_normalized_and_blank_is_absent() {
        let identity = SessionIdentity::new("id_1").with_email(" Sam@Example.com ");
        assert_eq!(identity.email().as_deref(), Some("sam@example.com"));

        let blank = SessionIdentity::new("id_2").with_email("   ");
        assert_eq!(blank.email(), None);
    }

    #[test]
    fn notification_uses_camel_case_wire_names() {
        let json = serde_json::json!({
            "isLoaded": true,
            "isSignedIn": true,
            "user": { "id": "user_9", "primaryEmail": "x@y.io", "fullName": null, "imageUrl": null }
        });
        let notification: ProviderNotification = serde_json::from_value(json).unwrap();
        assert_eq!(notification.status(), IdentityStatus::LoadedSignedIn);
        assert_eq!(notification.user.unwrap().primary_email.as_deref(), Some("x@y.io"));
    }
}
