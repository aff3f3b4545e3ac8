use serde::{Deserialize, Serialize};

use crate::solver::{ChallengeError, ChallengeRequest};

pub const API_VERSION: &str = "v1alpha1";
pub const KIND: &str = "ChallengePayload";

/// Envelope carrying either a challenge request or the solver's answer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default)]
    pub api_version: String, // "webhook.acme.cert-manager.io/v1alpha1"
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    pub fn reply(api_version: String, response: ChallengeResponse) -> Self {
        Self {
            api_version,
            kind: KIND.into(),
            request: None,
            response: Some(response),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub status: String,
    pub message: String,
    pub reason: String,
}

impl ChallengeResponse {
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    pub fn failure(uid: &str, err: &ChallengeError) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(ResponseStatus {
                status: "Failure".into(),
                message: err.to_string(),
                reason: err.source.kind().into(),
            }),
        }
    }
}
