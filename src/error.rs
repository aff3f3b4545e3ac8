// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::secrets::SecretStoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponseBody {
    pub error: String,
}

/// Failure kinds raised by the individual pipeline stages.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    #[error("failed to fetch secret {name:?} in namespace {namespace:?}: {source}")]
    CredentialNotFound {
        namespace: String,
        name: String,
        #[source]
        source: SecretStoreError,
    },

    #[error("authentication failed: {reason}")]
    AuthenticationFailed {
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("zone not found for domain {zone}")]
    ZoneNotFound { zone: String },

    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("create failed with status {status}: {body}")]
    RecordCreateFailed { status: StatusCode, body: String },

    #[error("delete failed with status {status}: {body}")]
    RecordDeleteFailed { status: StatusCode, body: String },
}

impl SolverError {
    pub fn transport(context: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| SolverError::Transport { context, source }
    }

    pub fn auth_failed(reason: impl Into<String>) -> Self {
        SolverError::AuthenticationFailed {
            reason: reason.into(),
            source: None,
        }
    }

    /// Short machine-readable kind, used as the `reason` reported to the host.
    pub fn kind(&self) -> &'static str {
        match self {
            SolverError::ConfigDecode(_) => "ConfigDecodeError",
            SolverError::CredentialNotFound { .. } => "CredentialNotFound",
            SolverError::AuthenticationFailed { .. } => "AuthenticationFailed",
            SolverError::ZoneNotFound { .. } => "ZoneNotFound",
            SolverError::Transport { .. } => "TransportError",
            SolverError::RecordCreateFailed { .. } => "RecordCreateFailed",
            SolverError::RecordDeleteFailed { .. } => "RecordDeleteFailed",
        }
    }
}

/// Errors produced by the webhook HTTP surface itself, as opposed to solver
/// failures which are reported in-band.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".into()),
        };

        let body = Json(ErrorResponseBody { error: msg });
        (status, body).into_response()
    }
}
