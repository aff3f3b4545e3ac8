//! Credential resolution over a namespaced key/value secret store.
pub mod cluster;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::SecretRef;
use crate::error::SolverError;

pub use cluster::KubeSecretStore;

pub const KEY_AUTH_URL: &str = "os_auth_url";
pub const KEY_USERNAME: &str = "os_username";
pub const KEY_PASSWORD: &str = "os_password";
pub const KEY_PROJECT_ID: &str = "os_project_id";
pub const KEY_DOMAIN_NAME: &str = "os_domain_name";

/// Raw secret payload: key to byte value.
pub type SecretData = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret not found")]
    NotFound,

    #[error("secret store request failed: {0}")]
    Kube(#[source] kube::Error),
}

/// Read-only access to namespaced secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError>;
}

/// In-process secret store keyed by (namespace, name).
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<(String, String), SecretData>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, namespace: &str, name: &str, data: SecretData) {
        self.secrets
            .write()
            .await
            .insert((namespace.to_string(), name.to_string()), data);
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        self.secrets
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or(SecretStoreError::NotFound)
    }
}

/// OpenStack identity material used to obtain a VK Cloud token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_id: String,
    pub domain_name: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("domain_name", &self.domain_name)
            .finish()
    }
}

impl Credential {
    /// Missing keys become empty strings; contents are not validated here.
    pub fn from_secret_data(data: &SecretData) -> Self {
        let field = |key: &str| {
            data.get(key)
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .unwrap_or_default()
        };
        Self {
            auth_url: field(KEY_AUTH_URL),
            username: field(KEY_USERNAME),
            password: field(KEY_PASSWORD),
            project_id: field(KEY_PROJECT_ID),
            domain_name: field(KEY_DOMAIN_NAME),
        }
    }
}

/// Look up the credential secret referenced by the solver config.
///
/// The secret is always read from `namespace` (the challenge's resource
/// namespace); a differing `secret_ref.namespace` is ignored.
pub async fn resolve_credential(
    store: &dyn SecretStore,
    namespace: &str,
    secret_ref: &SecretRef,
) -> Result<Credential, SolverError> {
    let requested = secret_ref.namespace.as_deref().filter(|ns| !ns.is_empty());
    if let Some(ref_ns) = requested.filter(|ns| *ns != namespace) {
        warn!(
            secret = %secret_ref.name,
            requested = %ref_ns,
            namespace = %namespace,
            "ignoring secretRef namespace, reading from resource namespace"
        );
    }

    let data = store
        .get(namespace, &secret_ref.name)
        .await
        .map_err(|source| SolverError::CredentialNotFound {
            namespace: namespace.to_string(),
            name: secret_ref.name.clone(),
            source,
        })?;

    debug!(secret = %secret_ref.name, namespace = %namespace, "resolved credential secret");
    Ok(Credential::from_secret_data(&data))
}
