//! Password-based Keystone authentication against the VK Cloud identity endpoint.
use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::SolverError;
use crate::secrets::Credential;

/// Response header carrying the issued token.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Bearer token presented as `X-Auth-Token` on DNS API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Serialize)]
struct AuthBody<'a> {
    identity: Identity<'a>,
    scope: Scope<'a>,
}

#[derive(Serialize)]
struct Identity<'a> {
    methods: [&'static str; 1],
    password: PasswordMethod<'a>,
}

#[derive(Serialize)]
struct PasswordMethod<'a> {
    user: User<'a>,
}

#[derive(Serialize)]
struct User<'a> {
    name: &'a str,
    password: &'a str,
    domain: IdRef<'a>,
}

#[derive(Serialize)]
struct Scope<'a> {
    project: IdRef<'a>,
}

#[derive(Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

impl<'a> AuthRequest<'a> {
    fn from_credential(cred: &'a Credential) -> Self {
        Self {
            auth: AuthBody {
                identity: Identity {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: User {
                            name: &cred.username,
                            password: &cred.password,
                            domain: IdRef {
                                id: &cred.domain_name,
                            },
                        },
                    },
                },
                scope: Scope {
                    project: IdRef {
                        id: &cred.project_id,
                    },
                },
            },
        }
    }
}

/// Exchanges a [`Credential`] for a fresh [`AuthToken`]. One attempt per call.
#[derive(Clone)]
pub struct Authenticator {
    http: Client,
    timeout: Duration,
}

impl Authenticator {
    pub fn new(http: Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub async fn authenticate(&self, cred: &Credential) -> Result<AuthToken, SolverError> {
        debug!(auth_url = %cred.auth_url, user = %cred.username, "requesting VK Cloud token");

        let res = self
            .http
            .post(&cred.auth_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&AuthRequest::from_credential(cred))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SolverError::AuthenticationFailed {
                reason: "identity request failed".into(),
                source: Some(e),
            })?;

        let token = res
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SolverError::auth_failed(format!(
                    "no auth token received from VK Cloud (status {})",
                    res.status()
                ))
            })?;

        Ok(AuthToken::new(token))
    }
}
