//! HTTP Digest credential handling
//!
//! Parses `Authorization: Digest ...` headers and checks them with a
//! pluggable [`CredentialVerifier`]. The default verifier ([`ShapeOnly`])
//! only checks that the required fields are present, so any client that can
//! produce a syntactically valid Digest attempt gets through. [`FullDigest`]
//! performs real RFC 2617 validation against configured credentials.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies. The axum middleware in the service crate
//! feeds the raw header, method and URI in and maps the outcome to a response.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::Error;

/// Authentication scheme expected in the `Authorization` header
pub const DIGEST_SCHEME: &str = "Digest";

/// Fields a credential attempt must carry to be considered well-formed
pub const REQUIRED_FIELDS: [&str; 3] = ["username", "response", "nonce"];

// ========================================
// Error Types
// ========================================

/// Reasons a credential attempt is turned away
///
/// Every variant results in a 401 with a freshly rotated challenge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header at all
    #[error("missing Authorization header")]
    MissingHeader,

    /// Header present but not using the Digest scheme
    #[error("unsupported authentication scheme")]
    UnsupportedScheme,

    /// Digest header without one of the required fields
    #[error("missing '{0}' parameter")]
    MissingField(&'static str),

    /// Username does not match the configured account
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    /// Echoed nonce is not the one currently advertised
    #[error("stale nonce")]
    StaleNonce,

    /// Signed `uri` is not the request target
    #[error("digest uri '{0}' does not match request")]
    UriMismatch(String),

    /// Response digest does not match the expected value
    #[error("digest response mismatch")]
    DigestMismatch,
}

// ========================================
// Credential Parsing
// ========================================

/// Named parameters of a Digest `Authorization` header
///
/// Parameter names are stored lowercase. Values are unquoted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestCredentials {
    params: HashMap<String, String>,
}

impl DigestCredentials {
    /// Parse a full header value such as `Digest username="admin", ...`
    ///
    /// Fails only when the scheme is not Digest. Malformed parameters are
    /// skipped.
    pub fn parse(header: &str) -> Result<Self, AuthRejection> {
        let rest = strip_digest_scheme(header).ok_or(AuthRejection::UnsupportedScheme)?;
        Ok(Self::from_params(rest))
    }

    /// Parse the parameter list that follows the scheme token
    pub fn from_params(params: &str) -> Self {
        let params = split_params(params)
            .into_iter()
            .filter_map(parse_param)
            .collect();
        Self { params }
    }

    /// Get a parameter value, treating empty values as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.get("username")
    }

    pub fn response(&self) -> Option<&str> {
        self.get("response")
    }

    pub fn nonce(&self) -> Option<&str> {
        self.get("nonce")
    }

    /// Check that every field in [`REQUIRED_FIELDS`] is present and non-empty
    pub fn require_fields(&self) -> Result<(), AuthRejection> {
        for field in REQUIRED_FIELDS {
            if self.get(field).is_none() {
                return Err(AuthRejection::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Return the parameter list if the header uses the Digest scheme
fn strip_digest_scheme(header: &str) -> Option<&str> {
    let trimmed = header.trim_start();
    let (scheme, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    scheme.eq_ignore_ascii_case(DIGEST_SCHEME).then_some(rest)
}

/// Split on commas that are not inside a quoted value
fn split_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_param(token: &str) -> Option<(String, String)> {
    let (name, value) = token.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
        .unwrap_or(value);

    Some((name.to_ascii_lowercase(), value.to_string()))
}

// ========================================
// Digest Computation
// ========================================

/// Lowercase hex MD5 of the parts joined with `:`
pub fn hex_md5(parts: &[&str]) -> String {
    let mut ctx = md5::Context::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            ctx.consume(b":");
        }
        ctx.consume(part.as_bytes());
    }
    format!("{:x}", ctx.compute())
}

/// Quality-of-protection parameters echoed by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QopParams<'a> {
    pub qop: &'a str,
    pub nc: &'a str,
    pub cnonce: &'a str,
}

/// Compute the RFC 2617 `response` value
///
/// With qop the response covers `nc`, `cnonce` and `qop`; without it the
/// legacy RFC 2069 form is used. `auth-int` is hashed like `auth`.
pub fn compute_response(
    username: &str,
    realm: &str,
    password: &str,
    method: &str,
    uri: &str,
    nonce: &str,
    qop: Option<QopParams<'_>>,
) -> String {
    let ha1 = hex_md5(&[username, realm, password]);
    let ha2 = hex_md5(&[method, uri]);

    match qop {
        Some(q) => hex_md5(&[&ha1, nonce, q.nc, q.cnonce, q.qop, &ha2]),
        None => hex_md5(&[&ha1, nonce, &ha2]),
    }
}

// ========================================
// Verification Strategies
// ========================================

/// Request facts a verifier may need besides the credentials
#[derive(Debug, Clone, Copy)]
pub struct DigestContext<'a> {
    /// HTTP method, e.g. `GET`
    pub method: &'a str,
    /// Request path and query, used when the client omits `uri`
    pub uri: &'a str,
    /// Nonce currently advertised by the server
    pub current_nonce: &'a str,
}

/// Decides whether a parsed credential attempt is acceptable
pub trait CredentialVerifier: Send + Sync {
    fn verify(
        &self,
        credentials: &DigestCredentials,
        ctx: &DigestContext<'_>,
    ) -> Result<(), AuthRejection>;
}

/// Accept any attempt carrying `username`, `response` and `nonce`
///
/// Values are never checked, including the nonce. Test clients that compute
/// digests against stale or guessed challenges still get through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeOnly;

impl CredentialVerifier for ShapeOnly {
    fn verify(
        &self,
        credentials: &DigestCredentials,
        _ctx: &DigestContext<'_>,
    ) -> Result<(), AuthRejection> {
        credentials.require_fields()
    }
}

/// Full challenge-response validation against one configured account
#[derive(Debug, Clone)]
pub struct FullDigest {
    pub username: String,
    pub password: String,
    pub realm: String,
}

impl FullDigest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
        }
    }
}

impl CredentialVerifier for FullDigest {
    fn verify(
        &self,
        credentials: &DigestCredentials,
        ctx: &DigestContext<'_>,
    ) -> Result<(), AuthRejection> {
        credentials.require_fields()?;

        // require_fields guarantees these are present
        let username = credentials.username().unwrap_or_default();
        let nonce = credentials.nonce().unwrap_or_default();
        let provided = credentials.response().unwrap_or_default();

        if username != self.username {
            return Err(AuthRejection::UnknownUser(username.to_string()));
        }
        if nonce != ctx.current_nonce {
            return Err(AuthRejection::StaleNonce);
        }

        let uri = match credentials.get("uri") {
            Some(uri) if uri != ctx.uri => {
                return Err(AuthRejection::UriMismatch(uri.to_string()));
            }
            Some(uri) => uri,
            None => ctx.uri,
        };
        let qop = credentials.get("qop").map(|qop| QopParams {
            qop,
            nc: credentials.get("nc").unwrap_or_default(),
            cnonce: credentials.get("cnonce").unwrap_or_default(),
        });

        let expected = compute_response(
            &self.username,
            &self.realm,
            &self.password,
            ctx.method,
            uri,
            nonce,
            qop,
        );

        if expected.eq_ignore_ascii_case(provided) {
            Ok(())
        } else {
            Err(AuthRejection::DigestMismatch)
        }
    }
}

/// Selects the verification strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Field presence only
    #[default]
    ShapeOnly,
    /// Real digest validation
    FullDigest,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::ShapeOnly => "shape-only",
            AuthMode::FullDigest => "full-digest",
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shape-only" | "shape_only" | "shape" => Ok(AuthMode::ShapeOnly),
            "full-digest" | "full_digest" | "digest" => Ok(AuthMode::FullDigest),
            other => Err(Error::InvalidInput(format!(
                "unknown auth mode '{}' (expected shape-only or full-digest)",
                other
            ))),
        }
    }
}

/// Run the whole gate decision for one request
///
/// Returns the parsed credentials on success so callers can log the user.
pub fn authenticate(
    header: Option<&str>,
    verifier: &dyn CredentialVerifier,
    ctx: &DigestContext<'_>,
) -> Result<DigestCredentials, AuthRejection> {
    let header = header.ok_or(AuthRejection::MissingHeader)?;
    let credentials = DigestCredentials::parse(header)?;
    verifier.verify(&credentials, ctx)?;
    Ok(credentials)
}
