use reqwest::StatusCode;
use thiserror::Error;

/// Why the login sequence could not produce a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("the login page has no CSRF token")]
    MissingCsrfToken,

    #[error("the login form was rejected with {0}")]
    Rejected(StatusCode),

    #[error("the login response did not set the `{0}` cookie")]
    MissingSessionCookie(&'static str),

    #[error("the `{0}` cookie has neither `Max-Age` nor `Expires`")]
    MissingLifetime(&'static str),
}

/// Classified failure of a single upstream request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The gating request of a cycle failed, which the cloud only ever does for a dead session.
    #[error("`{path}` responded with {status}, considering the session expired")]
    SessionExpired { path: &'static str, status: StatusCode },

    #[error("`{path}` responded with {status}")]
    Status { path: &'static str, status: StatusCode },
}
