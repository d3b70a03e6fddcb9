// src/core/database.rs
//! SQLite persistence for users, profiles, jobs, businesses and job seekers

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    ApplicationProfile, Business, BusinessInput, Job, JobInput, JobSeeker, JobSeekerInput,
    StoredUser, UserType,
};

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                user_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                owner_id TEXT PRIMARY KEY,
                full_name TEXT,
                email TEXT,
                phone TEXT,
                location TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                desired_role TEXT,
                education TEXT,
                bio TEXT,
                image_url TEXT,
                updated_at TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                business_id TEXT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                location TEXT NOT NULL,
                salary TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                job_type TEXT,
                created_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS businesses (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                name TEXT NOT NULL,
                industry TEXT,
                location TEXT,
                contact_email TEXT,
                description TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS job_seekers (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                full_name TEXT NOT NULL,
                location TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                experience_years INTEGER,
                desired_role TEXT
            );
            "#,
            "CREATE INDEX IF NOT EXISTS idx_jobs_location ON jobs(location);",
            "CREATE INDEX IF NOT EXISTS idx_jobs_business ON jobs(business_id);",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

/// True when the error comes from a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn skills_to_json<S: serde::Serialize>(skills: &S) -> Result<String> {
    serde_json::to_string(skills).context("Failed to encode skills")
}

fn skills_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ===== Users =====

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    user_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for StoredUser {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            user_type: row.user_type.parse::<UserType>()?,
            created_at: row.created_at,
        })
    }
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Email must already be normalized
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        user_type: UserType,
    ) -> Result<StoredUser> {
        let user = StoredUser {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            user_type,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, user_type, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(user.created_at)
        .execute(self.pool)
        .await?;

        info!("Created {} user: {}", user.user_type, user.email);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, user_type, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(StoredUser::try_from).transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, user_type, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(StoredUser::try_from).transpose()
    }

    pub async fn list(&self) -> Result<Vec<StoredUser>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, user_type, created_at FROM users ORDER BY email ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoredUser::try_from).collect()
    }

    /// Removes the user and the profile they own
    pub async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(id) = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM profiles WHERE owner_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.context("Failed to commit user deletion")?;
        info!("Deleted user {} ({})", email, id);
        Ok(true)
    }
}

// ===== Profiles =====

#[derive(sqlx::FromRow)]
struct ProfileRow {
    owner_id: String,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    skills: String,
    desired_role: Option<String>,
    education: Option<String>,
    bio: Option<String>,
    image_url: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for ApplicationProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            owner_id: row.owner_id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            skills: skills_from_json(&row.skills).into_iter().collect::<BTreeSet<_>>(),
            desired_role: row.desired_role,
            education: row.education,
            bio: row.bio,
            image_url: row.image_url,
            updated_at: row.updated_at,
        }
    }
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<ApplicationProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT owner_id, full_name, email, phone, location, skills, desired_role,
                   education, bio, image_url, updated_at
            FROM profiles WHERE owner_id = ?
            "#,
        )
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ApplicationProfile::from))
    }

    /// Create or replace the profile keyed by `owner_id`
    pub async fn upsert(&self, profile: &ApplicationProfile) -> Result<ApplicationProfile> {
        let updated_at = profile.updated_at.unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO profiles (owner_id, full_name, email, phone, location, skills,
                                  desired_role, education, bio, image_url, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                phone = excluded.phone,
                location = excluded.location,
                skills = excluded.skills,
                desired_role = excluded.desired_role,
                education = excluded.education,
                bio = excluded.bio,
                image_url = excluded.image_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.owner_id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(skills_to_json(&profile.skills)?)
        .bind(&profile.desired_role)
        .bind(&profile.education)
        .bind(&profile.bio)
        .bind(&profile.image_url)
        .bind(updated_at)
        .execute(self.pool)
        .await?;

        info!("Saved profile for owner: {}", profile.owner_id);

        Ok(ApplicationProfile {
            updated_at: Some(updated_at),
            ..profile.clone()
        })
    }
}

// ===== Jobs =====

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    business_id: Option<String>,
    title: String,
    description: String,
    location: String,
    salary: Option<String>,
    skills: String,
    job_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            business_id: row.business_id,
            title: row.title,
            description: row.description,
            location: row.location,
            salary: row.salary,
            skills: skills_from_json(&row.skills),
            job_type: row.job_type,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub location: Option<String>,
    pub keyword: Option<String>,
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &JobInput) -> Result<Job> {
        let job = Job {
            id: new_id(),
            business_id: input.business_id.clone(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            location: input.location.trim().to_string(),
            salary: input.salary.clone(),
            skills: crate::utils::normalize_skills(&input.skills).into_iter().collect(),
            job_type: input.job_type.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO jobs (id, business_id, title, description, location, salary, skills,
                              job_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.business_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(skills_to_json(&job.skills)?)
        .bind(&job.job_type)
        .bind(job.created_at)
        .execute(self.pool)
        .await?;

        info!("Created job {} ({})", job.title, job.id);
        Ok(job)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, business_id, title, description, location, salary, skills, job_type,
                   created_at
            FROM jobs WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Job::from))
    }

    /// Newest first; filters are case-insensitive substring matches
    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let location = filter
            .location
            .as_deref()
            .and_then(|l| crate::utils::non_empty(Some(l)))
            .map(|l| format!("%{}%", l.to_lowercase()));
        let keyword = filter
            .keyword
            .as_deref()
            .and_then(|k| crate::utils::non_empty(Some(k)))
            .map(|k| format!("%{}%", k.to_lowercase()));

        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, business_id, title, description, location, salary, skills, job_type,
                   created_at
            FROM jobs
            WHERE (?1 IS NULL OR lower(location) LIKE ?1)
              AND (?2 IS NULL OR lower(title) LIKE ?2 OR lower(description) LIKE ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(location)
        .bind(keyword)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Job::from).collect())
    }

    pub async fn update(&self, id: &str, input: &JobInput) -> Result<Option<Job>> {
        let skills: Vec<String> = crate::utils::normalize_skills(&input.skills)
            .into_iter()
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET business_id = ?, title = ?, description = ?, location = ?, salary = ?,
                skills = ?, job_type = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.business_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.location.trim())
        .bind(&input.salary)
        .bind(skills_to_json(&skills)?)
        .bind(&input.job_type)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ===== Businesses =====

#[derive(sqlx::FromRow)]
struct BusinessRow {
    id: String,
    user_id: Option<String>,
    name: String,
    industry: Option<String>,
    location: Option<String>,
    contact_email: Option<String>,
    description: Option<String>,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            industry: row.industry,
            location: row.location,
            contact_email: row.contact_email,
            description: row.description,
        }
    }
}

pub struct BusinessRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BusinessRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &BusinessInput) -> Result<Business> {
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO businesses (id, user_id, name, industry, location, contact_email,
                                    description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.user_id)
        .bind(input.name.trim())
        .bind(&input.industry)
        .bind(&input.location)
        .bind(&input.contact_email)
        .bind(&input.description)
        .execute(self.pool)
        .await?;

        info!("Created business {} ({})", input.name, id);
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Business {} vanished after insert", id))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Business>> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, user_id, name, industry, location, contact_email, description
            FROM businesses WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    pub async fn list(&self) -> Result<Vec<Business>> {
        let rows = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, user_id, name, industry, location, contact_email, description
            FROM businesses ORDER BY name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Business::from).collect())
    }

    pub async fn update(&self, id: &str, input: &BusinessInput) -> Result<Option<Business>> {
        let result = sqlx::query(
            r#"
            UPDATE businesses
            SET user_id = ?, name = ?, industry = ?, location = ?, contact_email = ?,
                description = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.user_id)
        .bind(input.name.trim())
        .bind(&input.industry)
        .bind(&input.location)
        .bind(&input.contact_email)
        .bind(&input.description)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ===== Job seekers =====

#[derive(sqlx::FromRow)]
struct JobSeekerRow {
    id: String,
    user_id: Option<String>,
    full_name: String,
    location: Option<String>,
    skills: String,
    experience_years: Option<i64>,
    desired_role: Option<String>,
}

impl From<JobSeekerRow> for JobSeeker {
    fn from(row: JobSeekerRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            location: row.location,
            skills: skills_from_json(&row.skills),
            experience_years: row.experience_years,
            desired_role: row.desired_role,
        }
    }
}

pub struct JobSeekerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobSeekerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &JobSeekerInput) -> Result<JobSeeker> {
        let id = new_id();
        let skills: Vec<String> = crate::utils::normalize_skills(&input.skills)
            .into_iter()
            .collect();

        sqlx::query(
            r#"
            INSERT INTO job_seekers (id, user_id, full_name, location, skills, experience_years,
                                     desired_role)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.user_id)
        .bind(input.full_name.trim())
        .bind(&input.location)
        .bind(skills_to_json(&skills)?)
        .bind(input.experience_years)
        .bind(&input.desired_role)
        .execute(self.pool)
        .await?;

        info!("Created job seeker {} ({})", input.full_name, id);
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Job seeker {} vanished after insert", id))
    }

    pub async fn get(&self, id: &str) -> Result<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>(
            r#"
            SELECT id, user_id, full_name, location, skills, experience_years, desired_role
            FROM job_seekers WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(JobSeeker::from))
    }

    pub async fn list(&self) -> Result<Vec<JobSeeker>> {
        let rows = sqlx::query_as::<_, JobSeekerRow>(
            r#"
            SELECT id, user_id, full_name, location, skills, experience_years, desired_role
            FROM job_seekers ORDER BY full_name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(JobSeeker::from).collect())
    }

    pub async fn update(&self, id: &str, input: &JobSeekerInput) -> Result<Option<JobSeeker>> {
        let skills: Vec<String> = crate::utils::normalize_skills(&input.skills)
            .into_iter()
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE job_seekers
            SET user_id = ?, full_name = ?, location = ?, skills = ?, experience_years = ?,
                desired_role = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.user_id)
        .bind(input.full_name.trim())
        .bind(&input.location)
        .bind(skills_to_json(&skills)?)
        .bind(input.experience_years)
        .bind(&input.desired_role)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_seekers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
