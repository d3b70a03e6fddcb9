// src/session/reconciler.rs
//! Keeps the client store consistent with the identity provider's session.
//!
//! One reconciler lives per mounted session. It reacts to provider lifecycle
//! notifications and path changes, looks the signed-in email up against the
//! backend exactly once per sign-in, and moves the user off an entry page at
//! most once per signed-in session.

use crate::session::identity::{IdentityStatus, ProviderNotification, SessionIdentity};
use crate::session::lookup::{LookupOutcome, UserLookup};
use crate::session::navigator::{is_entry_path, NavigateOptions, Navigator, DEFAULT_LANDING_PATH};
use crate::session::store::SharedStore;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcilerState {
    Uninitialized,
    SignedOut,
    Syncing,
    Synced,
}

#[derive(Debug)]
struct Inner {
    state: ReconcilerState,
    identity_id: Option<String>,
    current_path: String,
    has_redirected_this_session: bool,
    initial_load_handled: bool,
    // Bumped on every sign-in and sign-out; a lookup only applies if it still matches
    generation: u64,
}

impl Inner {
    fn reset_session_flags(&mut self) {
        self.has_redirected_this_session = false;
        self.initial_load_handled = false;
    }
}

pub struct SessionReconciler<L, N> {
    lookup: L,
    navigator: N,
    store: SharedStore,
    inner: Mutex<Inner>,
}

impl<L, N> SessionReconciler<L, N>
where
    L: UserLookup,
    N: Navigator,
{
    pub fn new(lookup: L, navigator: N, store: SharedStore, initial_path: impl Into<String>) -> Self {
        Self {
            lookup,
            navigator,
            store,
            inner: Mutex::new(Inner {
                state: ReconcilerState::Uninitialized,
                identity_id: None,
                current_path: initial_path.into(),
                has_redirected_this_session: false,
                initial_load_handled: false,
                generation: 0,
            }),
        }
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn state(&self) -> ReconcilerState {
        self.inner.lock().await.state
    }

    pub async fn has_redirected_this_session(&self) -> bool {
        self.inner.lock().await.has_redirected_this_session
    }

    pub async fn initial_load_handled(&self) -> bool {
        self.inner.lock().await.initial_load_handled
    }

    /// Entry point for identity provider lifecycle changes
    pub async fn handle_notification(&self, notification: ProviderNotification) {
        match (notification.status(), notification.user) {
            (IdentityStatus::NotLoaded, _) => {
                debug!("Identity provider not loaded yet, nothing to reconcile");
            }
            (IdentityStatus::LoadedSignedIn, Some(identity)) => self.sign_in(identity).await,
            (IdentityStatus::LoadedSignedIn, None) | (IdentityStatus::LoadedSignedOut, _) => {
                self.sign_out().await
            }
        }
    }

    /// Records the current route. Only redirect eligibility depends on it.
    pub async fn handle_path_change(&self, path: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.current_path = path.into();

        if inner.state == ReconcilerState::Synced {
            self.evaluate_redirect(&mut inner);
        }
    }

    async fn sign_out(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.identity_id = None;
        inner.reset_session_flags();
        inner.state = ReconcilerState::SignedOut;

        self.store.write().await.clear_identity();
        info!("Identity signed out, session state cleared");
    }

    async fn sign_in(&self, identity: SessionIdentity) {
        let (generation, email) = {
            let mut inner = self.inner.lock().await;
            let same_identity = inner.identity_id.as_deref() == Some(identity.id.as_str());

            match inner.state {
                ReconcilerState::Synced if same_identity => {
                    self.evaluate_redirect(&mut inner);
                    return;
                }
                ReconcilerState::Syncing if same_identity => {
                    debug!("Reconciliation already in flight for {}", identity.id);
                    return;
                }
                _ => {}
            }

            if inner.identity_id.is_some() && !same_identity {
                info!("Identity switched without sign-out, starting a fresh session");
            }

            inner.generation += 1;
            inner.reset_session_flags();
            inner.identity_id = Some(identity.id.clone());
            inner.state = ReconcilerState::Syncing;

            let email = identity.email();
            self.store.write().await.set_identity(identity);
            (inner.generation, email)
        };

        let outcome = match email.as_deref() {
            Some(email) => Some(self.lookup.lookup_by_email(email).await),
            None => None,
        };

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            info!("Discarding lookup result for a session that has since changed");
            return;
        }

        match outcome {
            Some(Ok(LookupOutcome::Found { user, profile })) => {
                info!("Application user {} found, merging into session", user.id);
                self.store
                    .write()
                    .await
                    .merge_user_and_profile(user, profile.as_ref());
            }
            Some(Ok(LookupOutcome::NotFound)) => {
                info!("No application user for signed-in identity yet");
            }
            Some(Err(e)) => {
                // Fail open: the redirect decision below still runs
                warn!("User lookup failed, continuing with identity only: {:#}", e);
            }
            None => {
                info!("Signed-in identity has no email, skipping user lookup");
            }
        }

        inner.state = ReconcilerState::Synced;
        self.evaluate_redirect(&mut inner);
    }

    fn evaluate_redirect(&self, inner: &mut Inner) {
        if inner.initial_load_handled {
            return;
        }

        if is_entry_path(&inner.current_path) && !inner.has_redirected_this_session {
            info!(
                "Redirecting fresh sign-in from {} to {}",
                inner.current_path, DEFAULT_LANDING_PATH
            );
            self.navigator
                .navigate(DEFAULT_LANDING_PATH, NavigateOptions { replace: true });
            inner.has_redirected_this_session = true;
        }

        inner.initial_load_handled = true;
    }
}
