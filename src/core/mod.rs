// src/core/mod.rs
//! Configuration and persistence shared by the server and the admin CLI

pub mod config_manager;
pub mod database;

pub use config_manager::ConfigManager;
pub use database::Database;
