//! Authenticated session with expiry-driven renewal.

use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    api::tigo::{
        AuthError,
        AuthHeader,
        Endpoint,
        LoginForm,
        SESSION_COOKIE_NAME,
        SiteDescriptor,
        Transport,
        extract_csrf_token,
    },
    prelude::*,
};

/// The session is renewed this long before the cookie's declared expiry.
pub const EXPIRY_SAFETY_MARGIN: TimeDelta = TimeDelta::hours(1);

#[must_use]
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
    pub system_id: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        system_id: impl Into<String>,
    ) -> Self {
        Self { username: username.into(), password: password.into(), system_id: system_id.into() }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("system_id", &self.system_id)
            .finish_non_exhaustive()
    }
}

struct Session {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Owns the credentials, the current session and the site descriptor.
///
/// The HTTP transport is passed into every call, so that the cache itself holds no connections.
pub struct SessionCache {
    credentials: Credentials,
    session: Option<Session>,
    site: Option<SiteDescriptor>,
}

impl SessionCache {
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials, session: None, site: None }
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Session expiry, or the distant past when there is no session.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.session.as_ref().map_or(DateTime::<Utc>::MIN_UTC, |session| session.expires_at)
    }

    /// Get the header for the current session, logging in only if the session has expired.
    pub async fn auth_header<T: Transport>(
        &mut self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<AuthHeader> {
        if let Some(session) = &self.session
            && now < session.expires_at
        {
            return Ok(AuthHeader::bearer(&session.token));
        }
        let session = self.login(transport, now).await?;
        let auth_header = AuthHeader::bearer(&session.token);
        self.session = Some(session);
        Ok(auth_header)
    }

    /// Force the next [`SessionCache::auth_header`] call to log in again.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            info!("session is reset");
        }
    }

    pub const fn site_descriptor(&self) -> Option<&SiteDescriptor> {
        self.site.as_ref()
    }

    /// Get the site descriptor, logging in if it has not been fetched yet.
    pub async fn site_descriptor_async<T: Transport>(
        &mut self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<&SiteDescriptor> {
        if self.site.is_none() {
            let session = self.login(transport, now).await?;
            self.session = Some(session);
        }
        self.site.as_ref().context("the site descriptor is not available")
    }

    #[instrument(skip_all, fields(username = %self.credentials.username))]
    async fn login<T: Transport>(&mut self, transport: &T, now: DateTime<Utc>) -> Result<Session> {
        info!("logging in…");

        let login_page = transport.get_login_page().await?;
        let csrf_token = extract_csrf_token(&login_page).ok_or(AuthError::MissingCsrfToken)?;

        let reply = transport.submit_login(&LoginForm::new(csrf_token, &self.credentials)).await?;
        ensure!(
            reply.status.is_success() || reply.status.is_redirection(),
            AuthError::Rejected(reply.status),
        );
        let cookie =
            reply.session_cookie.ok_or(AuthError::MissingSessionCookie(SESSION_COOKIE_NAME))?;
        let lifetime =
            cookie.lifetime(now).ok_or(AuthError::MissingLifetime(SESSION_COOKIE_NAME))?;
        let session =
            Session { token: cookie.value, expires_at: now + lifetime - EXPIRY_SAFETY_MARGIN };

        if self.site.is_none() {
            self.site = fetch_site_descriptor(
                transport,
                &AuthHeader::bearer(&session.token),
                &self.credentials.system_id,
            )
            .await
            .inspect_err(|error| warn!("failed to fetch the site descriptor: {error:#}"))
            .ok();
        }

        info!(expires_at = %session.expires_at, "logged in");
        Ok(session)
    }
}

#[instrument(skip_all, fields(system_id = system_id))]
async fn fetch_site_descriptor<T: Transport>(
    transport: &T,
    auth_header: &AuthHeader,
    system_id: &str,
) -> Result<SiteDescriptor> {
    let endpoint = Endpoint::system_config(system_id);
    let descriptor: SiteDescriptor = transport.get(&endpoint, auth_header).await?.json(endpoint.path)?;
    info!(n_objects = descriptor.system.objects.len(), "fetched the site descriptor");
    Ok(descriptor)
}
