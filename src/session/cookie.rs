//! Session cookie codec.
//!
//! Reads the session credential out of `Cookie` request headers and renders
//! the `Set-Cookie` values that issue or clear it. Every cookie the gateway
//! writes is `Path=/; HttpOnly; SameSite=Lax`, plus `Secure` when configured.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    #[error("'{0}' is not a valid cookie name")]
    InvalidName(String),
    #[error("token contains characters not allowed in a cookie value")]
    InvalidValue,
}

/// Cookie attributes for the session credential.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    max_age_secs: u64,
    secure: bool,
    clear_header: HeaderValue,
}

impl SessionCookies {
    pub fn new(name: impl Into<String>, max_age_secs: u64, secure: bool) -> Result<Self, CookieError> {
        let name = name.into();
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(CookieError::InvalidName(name));
        }

        let clear = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax{}",
            name,
            if secure { "; Secure" } else { "" }
        );
        let clear_header =
            HeaderValue::from_str(&clear).map_err(|_| CookieError::InvalidName(name.clone()))?;

        Ok(Self {
            name,
            max_age_secs,
            secure,
            clear_header,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, CookieError> {
        Self::new(
            config.session.cookie_name.clone(),
            config.session.max_age_secs,
            config.secure_cookies(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Find the session credential among the request's cookies.
    ///
    /// An empty value counts as absent. When the cookie appears more than
    /// once the first non-empty occurrence wins.
    pub fn read<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| name.trim() == self.name)
            .map(|(_, value)| strip_quotes(value.trim()))
            .find(|value| !value.is_empty())
    }

    /// Whether `token` can be stored as a cookie value verbatim.
    pub fn accepts(token: &str) -> bool {
        !token.is_empty() && token.bytes().all(is_cookie_octet)
    }

    /// `Set-Cookie` value that stores `token` for the configured lifetime.
    pub fn issue(&self, token: &str) -> Result<HeaderValue, CookieError> {
        if !Self::accepts(token) {
            return Err(CookieError::InvalidValue);
        }

        let value = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}",
            self.name,
            token,
            self.max_age_secs,
            if self.secure { "; Secure" } else { "" }
        );
        HeaderValue::from_str(&value).map_err(|_| CookieError::InvalidValue)
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    pub fn clear(&self) -> HeaderValue {
        self.clear_header.clone()
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
