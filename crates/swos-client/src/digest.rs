//! HTTP Digest authentication
//!
//! SwOS answers unauthenticated requests with `401` and a
//! `WWW-Authenticate: Digest ...` challenge. The answer is computed with the
//! `digest_auth` crate; this module only selects the challenge and keeps
//! per-transport state.

use parking_lot::Mutex;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use url::{Position, Url};

use digest_auth::{AuthContext, WwwAuthenticateHeader};

use crate::error::{Result, SwosClientError};

/// Username/password pair used to answer digest challenges
#[derive(Clone)]
pub struct DigestCredentials {
    username: String,
    password: String,
}

impl DigestCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compute an `Authorization` header value for `url` from a parsed
    /// challenge. Advances the challenge's nonce count.
    pub fn answer(&self, challenge: &mut WwwAuthenticateHeader, url: &Url) -> Result<String> {
        let context = AuthContext::new(
            self.username.as_str(),
            self.password.as_str(),
            request_uri(url),
        );
        challenge
            .respond(&context)
            .map(|header| header.to_header_string())
            .map_err(|e| SwosClientError::DigestAuth(e.to_string()))
    }
}

/// Request-target as it appears on the request line (path and query)
pub fn request_uri(url: &Url) -> &str {
    &url[Position::BeforePath..Position::AfterQuery]
}

/// Pick and parse the digest challenge from a 401 response's headers
pub fn parse_challenge(headers: &HeaderMap) -> Result<WwwAuthenticateHeader> {
    let value = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| {
            v.trim_start()
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
        .ok_or_else(|| SwosClientError::DigestAuth("no Digest challenge in 401 response".into()))?;

    digest_auth::parse(value).map_err(|e| SwosClientError::DigestAuth(e.to_string()))
}

/// Digest state kept across requests on a connection-reusing transport.
///
/// After the first challenge, later requests are answered pre-emptively so
/// they do not pay for an extra 401 round trip.
pub struct DigestSession {
    credentials: DigestCredentials,
    challenge: Mutex<Option<WwwAuthenticateHeader>>,
}

impl DigestSession {
    pub fn new(credentials: DigestCredentials) -> Self {
        Self {
            credentials,
            challenge: Mutex::new(None),
        }
    }

    /// Authorization for `url` from the cached challenge, if any
    pub fn cached_authorization(&self, url: &Url) -> Option<String> {
        let mut guard = self.challenge.lock();
        let challenge = guard.as_mut()?;
        self.credentials.answer(challenge, url).ok()
    }

    /// Answer a fresh challenge and cache it for later requests
    pub fn negotiate(&self, headers: &HeaderMap, url: &Url) -> Result<String> {
        let mut challenge = parse_challenge(headers)?;
        let answer = self.credentials.answer(&mut challenge, url)?;
        *self.challenge.lock() = Some(challenge);
        Ok(answer)
    }

    /// Drop the cached challenge (e.g. after the device rejected it)
    pub fn reset(&self) {
        *self.challenge.lock() = None;
    }

    pub fn has_challenge(&self) -> bool {
        self.challenge.lock().is_some()
    }
}
