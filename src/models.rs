// src/models.rs
//! Domain records shared by the backend and the client-side session store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Jobseeker,
    Business,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Jobseeker => "jobseeker",
            UserType::Business => "business",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jobseeker" | "job_seeker" | "job-seeker" => Ok(UserType::Jobseeker),
            "business" => Ok(UserType::Business),
            other => anyhow::bail!("Unknown user type: {}. Use jobseeker or business", other),
        }
    }
}

/// Application account as exposed to clients (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

/// Application account as persisted
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn public(&self) -> ApplicationUser {
        ApplicationUser {
            id: self.id.clone(),
            email: self.email.clone(),
            user_type: self.user_type,
        }
    }
}

/// Domain profile owned either by an application user or, for the generic
/// profile flow, by an identity-provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationProfile {
    pub owner_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: BTreeSet<String>,
    pub desired_role: Option<String>,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile fields a client may write
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub desired_role: Option<String>,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl ProfileUpdate {
    pub fn into_profile(self, owner_id: &str) -> ApplicationProfile {
        ApplicationProfile {
            owner_id: owner_id.to_string(),
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            skills: crate::utils::normalize_skills(&self.skills),
            desired_role: self.desired_role,
            education: self.education,
            bio: self.bio,
            image_url: self.image_url,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub business_id: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Option<String>,
    pub skills: Vec<String>,
    pub job_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    pub business_id: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessInput {
    pub user_id: Option<String>,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeeker {
    pub id: String,
    pub user_id: Option<String>,
    pub full_name: String,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<i64>,
    pub desired_role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSeekerInput {
    pub user_id: Option<String>,
    pub full_name: String,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<i64>,
    pub desired_role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_round_trips_through_text() {
        assert_eq!("jobseeker".parse::<UserType>().unwrap(), UserType::Jobseeker);
        assert_eq!("Business".parse::<UserType>().unwrap(), UserType::Business);
        assert!("admin".parse::<UserType>().is_err());
        assert_eq!(UserType::Business.to_string(), "business");
    }

    #[test]
    fn application_user_serializes_type_field() {
        let user = ApplicationUser {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            user_type: UserType::Jobseeker,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "jobseeker");
    }

    #[test]
    fn profile_update_dedupes_skills() {
        let update = ProfileUpdate {
            skills: vec!["Rust".into(), " rust ".into(), "SQL".into()],
            ..Default::default()
        };
        let profile = update.into_profile("owner");
        assert_eq!(profile.owner_id, "owner");
        assert_eq!(profile.skills.len(), 2);
        assert!(profile.updated_at.is_some());
    }
}
