use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Public DNS endpoint of VK Cloud.
pub const DEFAULT_API_BASE_URL: &str = "https://mcs.mail.ru/public-dns/v2/dns/";

pub const DEFAULT_SOLVER_NAME: &str = "cert-manager-webhook-vkcloud";

/// Per-call timeouts for the outbound provider requests.
#[derive(Clone, Debug)]
pub struct Timeouts {
    pub auth: Duration,
    pub zone_list: Duration,
    pub record_create: Duration,
    pub record_list: Duration,
    pub record_delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            auth: Duration::from_secs(30),
            zone_list: Duration::from_secs(30),
            record_create: Duration::from_secs(30),
            record_list: Duration::from_secs(10),
            record_delete: Duration::from_secs(10),
        }
    }
}

/// Process-level settings, fixed at startup and handed to the solver.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// API group the solver is registered under (e.g. acme.example.com).
    pub group_name: String,
    pub solver_name: String,
    pub api_base_url: String,
    pub timeouts: Timeouts,
}

impl AppConfig {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            solver_name: DEFAULT_SOLVER_NAME.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Base URL guaranteed to end with a single '/'.
    pub fn api_base(&self) -> String {
        format!("{}/", self.api_base_url.trim_end_matches('/'))
    }
}

/// Namespaced reference to the secret holding the OpenStack credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Solver configuration carried opaquely on each challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    #[serde(default)]
    pub secret_ref: SecretRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl SolverConfig {
    /// Decode the opaque payload. A missing payload yields the zero config.
    pub fn from_json(raw: Option<&serde_json::Value>) -> Result<Self, SolverError> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => Ok(Self::deserialize(value)?),
        }
    }
}
