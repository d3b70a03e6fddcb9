// src/user_cli.rs
use crate::auth::hash_password;
use crate::core::database::{is_unique_violation, ProfileRepository, UserRepository};
use crate::core::Database;
use crate::models::UserType;
use crate::utils::{normalize_email, validate_email};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "user-admin")]
#[command(about = "Manage application users for the job matcher")]
pub struct UserCli {
    #[command(subcommand)]
    pub command: UserCommand,

    #[arg(long, default_value = "data/job_matcher.db")]
    pub database_path: PathBuf,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user with a password
    Add {
        email: String,
        password: String,
        #[arg(value_parser = parse_user_type, default_value = "jobseeker")]
        user_type: UserType,
    },
    /// Delete a user by email
    Remove { email: String },
    /// List all users
    List,
    /// Look a user up by email the way the session reconciler does
    Check { email: String },
    /// Initialize the database
    Init,
}

fn parse_user_type(value: &str) -> Result<UserType, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub async fn handle_user_command(cli: UserCli) -> Result<()> {
    let db = Database::new(&cli.database_path).await?;
    let users = UserRepository::new(db.pool());

    match cli.command {
        UserCommand::Add {
            email,
            password,
            user_type,
        } => {
            validate_email(&email)?;
            let email = normalize_email(&email);
            let password_hash = hash_password(&password)?;

            match users.create(&email, &password_hash, user_type).await {
                Ok(user) => {
                    info!("User created successfully:");
                    info!("   Email: {}", user.email);
                    info!("   Type: {}", user.user_type);
                    info!("   ID: {}", user.id);
                }
                Err(e) if is_unique_violation(&e) => {
                    error!("Email '{}' already exists", email);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to create user: {}", e);
                    return Err(e);
                }
            }
        }

        UserCommand::Remove { email } => {
            let email = normalize_email(&email);
            if users.delete_by_email(&email).await? {
                info!("User removed: {}", email);
            } else {
                info!("No user found for email: {}", email);
            }
        }

        UserCommand::List => {
            let all = users.list().await?;
            if all.is_empty() {
                info!("No users found.");
            } else {
                info!("{:<38} {:<30} {:<10} {:<20}", "ID", "Email", "Type", "Created");
                info!("{}", "-".repeat(100));
                for user in all {
                    info!(
                        "{:<38} {:<30} {:<10} {:<20}",
                        user.id,
                        user.email,
                        user.user_type,
                        user.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        UserCommand::Check { email } => {
            let email = normalize_email(&email);
            match users.find_by_email(&email).await? {
                Some(user) => {
                    let profile = ProfileRepository::new(db.pool())
                        .find_by_owner(&user.id)
                        .await?;
                    info!("Email '{}' belongs to {} user {}", email, user.user_type, user.id);
                    match profile {
                        Some(profile) => info!(
                            "   Profile: {} ({} skills)",
                            profile.full_name.as_deref().unwrap_or("unnamed"),
                            profile.skills.len()
                        ),
                        None => info!("   No profile saved yet"),
                    }
                }
                None => info!("Email '{}' has no application user", email),
            }
        }

        UserCommand::Init => {
            info!("Database initialized at: {}", cli.database_path.display());
            info!("   Tables: users, profiles, jobs, businesses, job_seekers");
        }
    }

    Ok(())
}
