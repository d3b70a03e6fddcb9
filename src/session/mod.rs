// src/session/mod.rs
pub mod identity;
pub mod lookup;
pub mod navigator;
pub mod reconciler;
pub mod store;

pub use identity::{IdentityStatus, ProviderNotification, SessionIdentity};
pub use lookup::{HttpUserLookup, LookupOutcome, UserLookup, UserLookupResponse};
pub use navigator::{is_entry_path, NavigateOptions, Navigator, DEFAULT_LANDING_PATH};
pub use reconciler::{ReconcilerState, SessionReconciler};
pub use store::{AppStore, AuthState, ProfileData, ProfileSyncState, SharedStore};
