use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use http::{HeaderMap, HeaderValue, header};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    api::tigo::{Endpoint, FetchError, LoginForm},
    prelude::*,
};

/// HTTP surface of the cloud.
///
/// All the calls share a single cookie jar, which is the actual session carrier.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the login page HTML.
    async fn get_login_page(&self) -> Result<String>;

    /// Submit the login form, replaying the cookies from the login page.
    async fn submit_login(&self, form: &LoginForm<'_>) -> Result<LoginReply>;

    /// Authenticated `GET`.
    ///
    /// Non-success statuses are returned as is: it is up to the caller to decide what they mean.
    async fn get(&self, endpoint: &Endpoint, auth: &AuthHeader) -> Result<Reply>;
}

/// Outcome of the login form submission.
#[must_use]
#[derive(Clone, Debug)]
pub struct LoginReply {
    pub status: StatusCode,
    pub session_cookie: Option<SessionCookie>,
}

#[must_use]
#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub value: String,
    pub max_age: Option<TimeDelta>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCookie {
    /// Declared lifetime: `Max-Age` takes precedence over `Expires`.
    pub fn lifetime(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.max_age.or_else(|| self.expires_at.map(|expires_at| expires_at - now))
    }
}

/// Raw reply of an authenticated call.
#[must_use]
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Check the status and deserialize the body.
    pub fn json<R: DeserializeOwned>(&self, path: &'static str) -> Result<R> {
        if !self.status.is_success() {
            return Err(FetchError::Status { path, status: self.status }.into());
        }
        serde_json::from_str(&self.body)
            .with_context(|| format!("failed to deserialize `{path}` response JSON"))
    }
}

/// Bearer token, sent along with the cookies on every authenticated call.
#[must_use]
#[derive(Clone, Eq, PartialEq)]
pub struct AuthHeader(String);

impl AuthHeader {
    pub fn bearer(token: &str) -> Self {
        Self(format!("Bearer {token}"))
    }

    pub fn to_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&self.0)?);
        Ok(headers)
    }
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthHeader(…)")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::api::tigo::LastValue;

    #[test]
    fn test_auth_headers() -> Result {
        let headers = AuthHeader::bearer("token").to_headers()?;
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer token");
        Ok(())
    }

    #[test]
    fn test_lifetime_prefers_max_age() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let cookie = SessionCookie {
            value: "jwt".to_owned(),
            max_age: Some(TimeDelta::seconds(3600)),
            expires_at: Some(now + TimeDelta::days(1)),
        };
        assert_eq!(cookie.lifetime(now), Some(TimeDelta::seconds(3600)));
    }

    #[test]
    fn test_lifetime_falls_back_to_expires() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let cookie = SessionCookie {
            value: "jwt".to_owned(),
            max_age: None,
            expires_at: Some(now + TimeDelta::hours(12)),
        };
        assert_eq!(cookie.lifetime(now), Some(TimeDelta::hours(12)));
    }

    #[test]
    fn test_reply_status_is_checked() {
        let reply = Reply { status: StatusCode::BAD_GATEWAY, body: "{}".to_owned() };
        let error = reply.json::<LastValue>("/api").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<FetchError>(),
            Some(FetchError::Status { status, .. }) if *status == StatusCode::BAD_GATEWAY
        ));
    }
}
