//! Route-protection settings consumed by the route guard.

use crate::error::AppError;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Path prefixes that require a session
    pub protected_prefixes: Vec<String>,
    /// Where unauthenticated callers are sent
    pub login_path: String,
    /// Where authenticated callers on the login page are sent
    pub dashboard_path: String,
}

impl GuardConfig {
    /// Validate and build.
    ///
    /// Rejects paths not starting with `/`, an empty prefix list, a login
    /// page that is itself protected (guaranteed redirect loop), and a
    /// dashboard outside every protected prefix.
    pub fn new(
        protected_prefixes: Vec<String>,
        login_path: impl Into<String>,
        dashboard_path: impl Into<String>,
    ) -> Result<Self, AppError> {
        let login_path = normalize(login_path.into());
        let dashboard_path = normalize(dashboard_path.into());
        let protected_prefixes: Vec<String> =
            protected_prefixes.into_iter().map(normalize).collect();

        if protected_prefixes.is_empty() {
            return Err(AppError::config("PROTECTED_PREFIXES must not be empty"));
        }
        for path in protected_prefixes
            .iter()
            .chain([&login_path, &dashboard_path])
        {
            if !path.starts_with('/') {
                return Err(AppError::config(format!(
                    "route path `{path}` must start with `/`"
                )));
            }
        }

        let config = Self {
            protected_prefixes,
            login_path,
            dashboard_path,
        };
        if config.is_protected(&config.login_path) {
            return Err(AppError::config(
                "LOGIN_PATH must not be under a protected prefix",
            ));
        }
        if !config.is_protected(&config.dashboard_path) {
            return Err(AppError::config(
                "DASHBOARD_PATH must be under a protected prefix",
            ));
        }
        Ok(config)
    }

    /// Segment-aware prefix match: `/dashboard` covers `/dashboard` and
    /// `/dashboard/x`, not `/dashboards`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path_under(path, prefix))
    }

    pub fn is_login_page(&self, path: &str) -> bool {
        normalize_ref(path) == self.login_path
    }
}

fn path_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Drop a trailing slash (except for the root path).
fn normalize(path: String) -> String {
    normalize_ref(&path).to_string()
}

fn normalize_ref(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
