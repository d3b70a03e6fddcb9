// src/session/navigator.rs

/// Where a fresh sign-in lands when it started on an entry page
pub const DEFAULT_LANDING_PATH: &str = "/jobs";

const ENTRY_PATHS: [&str; 3] = ["/", "/login", "/signup"];
const ENTRY_MARKERS: [&str; 2] = ["sign-in", "sign-up"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    pub replace: bool,
}

/// Client-side router
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: NavigateOptions);
}

/// True for pages a signed-in user should be moved away from
pub fn is_entry_path(path: &str) -> bool {
    let bare = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = bare.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { "/" } else { trimmed };

    ENTRY_PATHS.contains(&normalized) || ENTRY_MARKERS.iter().any(|m| bare.contains(m))
}
