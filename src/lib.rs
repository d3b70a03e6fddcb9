//! Hyperlocal job matching backend.
//!
//! The `session` module reconciles the identity provider's signed-in user with the
//! application's own user record; the rest of the crate is the REST backend that
//! serves that lookup along with jobs, businesses, job seekers and skill analysis.

pub mod analysis;
pub mod auth;
pub mod core;
pub mod models;
pub mod session;
pub mod user_cli;
pub mod utils;
pub mod web;

pub use web::start_web_server;
