use serde::Serialize;

use crate::session::Credentials;

/// Marker of the anti-forgery token embedded in the login page.
pub const CSRF_MARKER: &str = "TIGO_CSRF_TOKEN";

/// Session cookie set by a successful login.
pub const SESSION_COOKIE_NAME: &str = "wssJwt";

/// Extract the quoted value following the CSRF marker.
///
/// The marker may be quoted itself (`name="TIGO_CSRF_TOKEN" value="…"`)
/// or be a script variable (`TIGO_CSRF_TOKEN = "…"`).
pub fn extract_csrf_token(page: &str) -> Option<&str> {
    page.lines().find_map(|line| {
        let (_, tail) = line.split_once(CSRF_MARKER)?;
        let tail = tail.strip_prefix('"').unwrap_or(tail);
        let (_, tail) = tail.split_once('"')?;
        let (token, _) = tail.split_once('"')?;
        Some(token).filter(|token| !token.is_empty())
    })
}

#[must_use]
#[derive(Serialize)]
pub struct LoginForm<'a> {
    #[serde(rename = "_csrf")]
    pub csrf_token: &'a str,

    #[serde(rename = "LoginFormModel[login]")]
    pub login: &'a str,

    #[serde(rename = "LoginFormModel[password]")]
    pub password: &'a str,

    #[serde(rename = "LoginFormModel[remember_me]")]
    pub remember_me: &'static str,
}

impl<'a> LoginForm<'a> {
    pub fn new(csrf_token: &'a str, credentials: &'a Credentials) -> Self {
        Self {
            csrf_token,
            login: &credentials.username,
            password: credentials.password(),
            remember_me: "0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quoted_marker() {
        let page = "<html>\n<input name=\"TIGO_CSRF_TOKEN\" value=\"abc123\">\n</html>";
        assert_eq!(extract_csrf_token(page), Some("abc123"));
    }

    #[test]
    fn test_extract_bare_fragment() {
        assert_eq!(extract_csrf_token(r#"TIGO_CSRF_TOKEN" value="abc123""#), Some("abc123"));
    }

    #[test]
    fn test_extract_script_variable() {
        let page = "<script>\n    var TIGO_CSRF_TOKEN = \"Zm9vYmFy==\";\n</script>";
        assert_eq!(extract_csrf_token(page), Some("Zm9vYmFy=="));
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(extract_csrf_token("<html><body>maintenance</body></html>"), None);
    }

    #[test]
    fn test_marker_without_value() {
        assert_eq!(extract_csrf_token("var TIGO_CSRF_TOKEN;"), None);
    }

    #[test]
    fn test_form_field_names() -> crate::prelude::Result {
        let credentials = Credentials::new("user@example.com", "hunter2", "42");
        let form = serde_json::to_value(LoginForm::new("abc123", &credentials))?;
        assert_eq!(
            form,
            serde_json::json!({
                "_csrf": "abc123",
                "LoginFormModel[login]": "user@example.com",
                "LoginFormModel[password]": "hunter2",
                "LoginFormModel[remember_me]": "0",
            })
        );
        Ok(())
    }
}
