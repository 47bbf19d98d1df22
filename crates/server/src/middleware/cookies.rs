//! Cookie parsing and building helpers.
//!
//! The server sets two cookies: `auth_token` (httpOnly, carries the session
//! token) and `csrf_token` (readable by scripts, for double-submit checks).

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

/// Name of the httpOnly session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Name of the script-readable CSRF cookie.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Session cookie lifetime: seven days, matching token expiry.
pub const AUTH_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// CSRF cookie lifetime: 24 hours.
pub const CSRF_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Extract a cookie value from request headers.
///
/// Handles multiple `Cookie` headers and `; `-separated pairs within each.
#[must_use]
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .next()
}

/// Build a `Set-Cookie` value for the session cookie.
#[must_use]
pub fn auth_cookie(token: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{AUTH_COOKIE}={token}; Path=/; Max-Age={AUTH_COOKIE_MAX_AGE_SECS}; \
         HttpOnly; SameSite=Lax{secure}"
    )
}

/// Build a `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_auth_cookie(secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{AUTH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{secure}")
}

/// Build a `Set-Cookie` value for the CSRF cookie.
///
/// Deliberately not httpOnly: the client echoes this value back in the
/// `x-csrf-token` header.
#[must_use]
pub fn csrf_cookie(token: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{CSRF_COOKIE}={token}; Path=/; Max-Age={CSRF_COOKIE_MAX_AGE_SECS}; \
         SameSite=Lax{secure}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_single_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token=abc123"));
        assert_eq!(get_cookie(&headers, "auth_token").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("csrf_token=xyz; auth_token=abc123; theme=dark"),
        );
        assert_eq!(get_cookie(&headers, "auth_token").as_deref(), Some("abc123"));
        assert_eq!(get_cookie(&headers, "csrf_token").as_deref(), Some("xyz"));
    }

    #[test]
    fn test_get_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(get_cookie(&headers, "auth_token"), None);
    }

    #[test]
    fn test_get_cookie_no_prefix_match() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token_old=stale"));
        assert_eq!(get_cookie(&headers, "auth_token"), None);
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("tok", true);
        assert!(cookie.starts_with("auth_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));

        let insecure = auth_cookie("tok", false);
        assert!(!insecure.contains("Secure"));
    }

    #[test]
    fn test_csrf_cookie_is_script_readable() {
        let cookie = csrf_cookie("tok", false);
        assert!(!cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_clear_auth_cookie_expires_immediately() {
        assert!(clear_auth_cookie(false).contains("Max-Age=0"));
    }
}
