//! Secret store backed by the Kubernetes core API.
use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, Config};

use super::{SecretData, SecretStore, SecretStoreError};

#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Must be called from within a tokio runtime.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = Client::try_from(config).context("failed to build Kubernetes client")?;
        Ok(Self::new(client))
    }
}

fn secret_data(secret: Secret) -> SecretData {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect()
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        if name.is_empty() || namespace.is_empty() {
            return Err(SecretStoreError::NotFound);
        }

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match secrets.get(name).await {
            Ok(secret) => Ok(secret_data(secret)),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(SecretStoreError::NotFound),
            Err(err) => Err(SecretStoreError::Kube(err)),
        }
    }
}
