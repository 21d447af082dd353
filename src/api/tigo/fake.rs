//! In-memory [`Transport`] recording every call.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::TimeDelta;
use reqwest::StatusCode;

use crate::{
    api::tigo::{AuthHeader, Endpoint, LoginForm, LoginReply, Reply, SessionCookie, Transport},
    prelude::*,
};

pub const LOGIN_PAGE: &str = "<html>\n<input type=\"hidden\" name=\"TIGO_CSRF_TOKEN\" value=\"abc123\">\n</html>";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    LoginPage,
    SubmitLogin { csrf_token: String },
    Get(Endpoint),
}

enum Route {
    Reply(StatusCode, String),
    Unreachable,
}

pub struct FakeTransport {
    pub login_page: String,
    pub login_reply: LoginReply,
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            login_page: LOGIN_PAGE.to_owned(),
            login_reply: LoginReply {
                status: StatusCode::FOUND,
                session_cookie: Some(SessionCookie {
                    value: "jwt-1".to_owned(),
                    max_age: Some(TimeDelta::days(1)),
                    expires_at: None,
                }),
            },
            routes: Mutex::default(),
            calls: Mutex::default(),
        }
    }
}

impl FakeTransport {
    /// Respond to the exact endpoint with the status and body.
    pub fn respond(&self, endpoint: &Endpoint, status: StatusCode, body: &str) {
        self.routes.lock().unwrap().insert(endpoint.to_string(), Route::Reply(status, body.to_owned()));
    }

    /// Fail the endpoint at the transport level, as a timeout would.
    pub fn fail(&self, endpoint: &Endpoint) {
        self.routes.lock().unwrap().insert(endpoint.to_string(), Route::Unreachable);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn n_logins(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::SubmitLogin { .. })).count()
    }

    pub fn n_gets(&self, endpoint: &Endpoint) -> usize {
        self.calls().iter().filter(|call| **call == Call::Get(endpoint.clone())).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_login_page(&self) -> Result<String> {
        self.calls.lock().unwrap().push(Call::LoginPage);
        Ok(self.login_page.clone())
    }

    async fn submit_login(&self, form: &LoginForm<'_>) -> Result<LoginReply> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::SubmitLogin { csrf_token: form.csrf_token.to_owned() });
        Ok(self.login_reply.clone())
    }

    async fn get(&self, endpoint: &Endpoint, _auth: &AuthHeader) -> Result<Reply> {
        self.calls.lock().unwrap().push(Call::Get(endpoint.clone()));
        match self.routes.lock().unwrap().get(&endpoint.to_string()) {
            Some(Route::Reply(status, body)) => Ok(Reply { status: *status, body: body.clone() }),
            Some(Route::Unreachable) => bail!("`{}` timed out", endpoint.path),
            None => Ok(Reply { status: StatusCode::NOT_FOUND, body: String::new() }),
        }
    }
}
