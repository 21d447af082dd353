use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, Response, Url, cookie::Jar, header, redirect::Policy};

use crate::{
    api::{
        client,
        tigo::{
            AuthHeader,
            Endpoint,
            LoginForm,
            LoginReply,
            Reply,
            SESSION_COOKIE_NAME,
            SessionCookie,
            Transport,
        },
    },
    prelude::*,
};

const MAX_LOGIN_REDIRECTS: usize = 10;

/// Production [`Transport`] over `reqwest`.
pub struct Portal {
    client: Client,

    /// Same cookie jar, but redirects are followed manually.
    login_client: Client,

    base_url: Url,
}

impl Portal {
    #[instrument(skip_all, fields(base_url = %base_url))]
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = client::builder(timeout).cookie_provider(Arc::clone(&jar)).build()?;
        let login_client =
            client::builder(timeout).cookie_provider(jar).redirect(Policy::none()).build()?;
        Ok(Self { client, login_client, base_url })
    }
}

#[async_trait]
impl Transport for Portal {
    #[instrument(skip_all, level = Level::DEBUG)]
    async fn get_login_page(&self) -> Result<String> {
        self.client
            .get(self.base_url.clone())
            .send()
            .await
            .context("failed to request the login page")?
            .error_for_status()
            .context("the login page request failed")?
            .text()
            .await
            .context("failed to read the login page")
    }

    /// Submit the form and follow the redirects, looking for the session cookie on every hop.
    ///
    /// The jar does not expose `Max-Age`, so the hops are followed here and not by the client.
    #[instrument(skip_all, level = Level::DEBUG)]
    async fn submit_login(&self, form: &LoginForm<'_>) -> Result<LoginReply> {
        let mut response = self
            .login_client
            .post(self.base_url.clone())
            .form(form)
            .send()
            .await
            .context("failed to submit the login form")?;
        let mut session_cookie = None;
        let mut n_redirects = 0;
        loop {
            if let Some(cookie) = find_session_cookie(&response) {
                session_cookie = Some(cookie);
            }
            let Some(location) = response
                .headers()
                .get(header::LOCATION)
                .filter(|_| response.status().is_redirection())
            else {
                break;
            };
            ensure!(n_redirects < MAX_LOGIN_REDIRECTS, "too many login redirects");
            n_redirects += 1;
            let url = response
                .url()
                .join(location.to_str().context("non-ASCII redirect location")?)
                .context("invalid redirect location")?;
            debug!(%url, "following the login redirect");
            response = self
                .login_client
                .get(url)
                .send()
                .await
                .context("failed to follow the login redirect")?;
        }
        debug!(
            status = %response.status(),
            n_redirects,
            has_session_cookie = session_cookie.is_some(),
            "login form submitted",
        );
        Ok(LoginReply { status: response.status(), session_cookie })
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(path = endpoint.path))]
    async fn get(&self, endpoint: &Endpoint, auth: &AuthHeader) -> Result<Reply> {
        let url = self
            .base_url
            .join(endpoint.path)
            .with_context(|| format!("invalid path `{}`", endpoint.path))?;
        let response = self
            .client
            .get(url)
            .headers(auth.to_headers()?)
            .query(&endpoint.query)
            .send()
            .await
            .with_context(|| format!("failed to call `{}`", endpoint.path))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read `{}` response", endpoint.path))?;
        debug!(%status, n_bytes = body.len(), "call completed");
        Ok(Reply { status, body })
    }
}

fn find_session_cookie(response: &Response) -> Option<SessionCookie> {
    response.cookies().find(|cookie| cookie.name() == SESSION_COOKIE_NAME).map(|cookie| SessionCookie {
        value: cookie.value().to_owned(),
        max_age: cookie.max_age().and_then(|max_age| TimeDelta::from_std(max_age).ok()),
        expires_at: cookie.expires().map(DateTime::<Utc>::from),
    })
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::TcpListener,
        sync::{Arc, Mutex},
        thread,
    };

    use approx::assert_abs_diff_eq;
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        api::tigo::{Lifetime, fake::LOGIN_PAGE},
        session::{Credentials, SessionCache},
    };

    type Requests = Arc<Mutex<Vec<String>>>;

    /// Serve one request per connection with `route(method, path)`, recording the lowercase heads.
    fn serve(route: fn(&str, &str) -> String) -> Result<(Portal, Requests)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
        let requests = Requests::default();
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = String::new();
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':')
                        && name.eq_ignore_ascii_case("content-length")
                    {
                        content_length = value.trim().parse().unwrap();
                    }
                    head.push_str(&line);
                }
                let mut body = vec![0; content_length];
                reader.read_exact(&mut body).unwrap();
                let mut request_line = head.split_whitespace();
                let method = request_line.next().unwrap_or_default().to_owned();
                let path = request_line.next().unwrap_or_default().to_owned();
                log.lock().unwrap().push(head.to_lowercase());
                stream.write_all(route(&method, &path).as_bytes()).unwrap();
            }
        });
        Ok((Portal::new(base_url, Duration::from_secs(5))?, requests))
    }

    fn respond(status: &str, headers: &[&str], body: &str) -> String {
        let headers: String = headers.iter().map(|header| format!("{header}\r\n")).collect();
        format!(
            "HTTP/1.1 {status}\r\n{headers}content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len(),
        )
    }

    /// The session cookie is only set by the page the login form redirects to.
    fn redirecting_portal(method: &str, path: &str) -> String {
        match (method, path) {
            ("GET", "/") => respond("200 OK", &["set-cookie: PHPSESSID=s1; Path=/"], LOGIN_PAGE),
            ("POST", "/") => respond("302 Found", &["location: /dashboard"], ""),
            ("GET", "/dashboard") => respond(
                "200 OK",
                &["set-cookie: wssJwt=jwt-1; Max-Age=86400; Path=/"],
                "<html></html>",
            ),
            ("GET", path) if path.starts_with("/fleet/system/overview/data-lifetime") => {
                // language=json
                respond("200 OK", &["content-type: application/json"], r#"{"energy": 1234.5}"#)
            }
            _ => respond("404 Not Found", &[], ""),
        }
    }

    /// The session cookie comes with the redirect itself.
    fn cookie_on_redirect(method: &str, path: &str) -> String {
        match (method, path) {
            ("POST", "/") => respond(
                "303 See Other",
                &["set-cookie: wssJwt=jwt-2; Max-Age=3600; Path=/", "location: /dashboard"],
                "",
            ),
            ("GET", "/dashboard") => respond("200 OK", &[], "<html></html>"),
            _ => respond("404 Not Found", &[], ""),
        }
    }

    fn endless_redirects(_method: &str, _path: &str) -> String {
        respond("302 Found", &["location: /again"], "")
    }

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", "hunter2", "42")
    }

    #[tokio::test]
    async fn test_session_cookie_on_redirect_target() -> Result {
        let (portal, requests) = serve(redirecting_portal)?;
        let credentials = credentials();
        let reply = portal.submit_login(&LoginForm::new("abc123", &credentials)).await?;
        assert_eq!(reply.status, StatusCode::OK);
        let cookie = reply.session_cookie.context("no session cookie")?;
        assert_eq!(cookie.value, "jwt-1");
        assert_eq!(cookie.max_age, Some(TimeDelta::days(1)));

        let requests = requests.lock().unwrap();
        assert!(requests[0].starts_with("post / "));
        assert!(requests[1].starts_with("get /dashboard "));
        Ok(())
    }

    #[tokio::test]
    async fn test_session_cookie_on_redirect_response() -> Result {
        let (portal, _) = serve(cookie_on_redirect)?;
        let credentials = credentials();
        let reply = portal.submit_login(&LoginForm::new("abc123", &credentials)).await?;
        let cookie = reply.session_cookie.context("no session cookie")?;
        assert_eq!(cookie.value, "jwt-2");
        assert_eq!(cookie.max_age, Some(TimeDelta::hours(1)));
        Ok(())
    }

    #[tokio::test]
    async fn test_endless_redirects_fail() -> Result {
        let (portal, _) = serve(endless_redirects)?;
        let credentials = credentials();
        assert!(portal.submit_login(&LoginForm::new("abc123", &credentials)).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_session_over_http() -> Result {
        let (portal, requests) = serve(redirecting_portal)?;
        let mut cache = SessionCache::new(credentials());
        let now = Utc::now();
        let auth_header = cache.auth_header(&portal, now).await?;
        assert_eq!(auth_header, AuthHeader::bearer("jwt-1"));
        assert_eq!(cache.expires_at(), now + TimeDelta::hours(23));

        let endpoint = Endpoint::lifetime("42");
        let lifetime: Lifetime = portal.get(&endpoint, &auth_header).await?.json(endpoint.path)?;
        assert_abs_diff_eq!(lifetime.energy, 1234.5);

        let requests = requests.lock().unwrap();
        let lifetime_request = requests
            .iter()
            .find(|request| request.starts_with("get /fleet/system/overview/data-lifetime?"))
            .context("the lifetime was not requested")?;
        assert!(lifetime_request.contains("sysid=42&range=lifetime"));
        assert!(lifetime_request.contains("authorization: bearer jwt-1"));
        assert!(lifetime_request.contains("accept: application/json"));
        Ok(())
    }
}
