//! DNS-01 challenge orchestration: config, credential, token, zone, record.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::auth::{AuthToken, Authenticator};
use crate::config::{AppConfig, SolverConfig};
use crate::error::SolverError;
use crate::secrets::{KubeSecretStore, SecretStore, resolve_credential};
use crate::vkcloud::client::VkCloudDnsClient;

/// Challenge as handed over by the certificate workflow.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub action: Option<ChallengeAction>,
    #[serde(default)]
    pub dns_name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub resource_namespace: String,
    #[serde(rename = "resolvedFQDN", default)]
    pub resolved_fqdn: String,
    #[serde(default)]
    pub resolved_zone: String,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    DecodeConfig,
    ResolveCredentials,
    Authenticate,
    FindZone,
    CreateRecord,
    DeleteRecord,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::DecodeConfig => "decode solver config",
            Stage::ResolveCredentials => "resolve credentials",
            Stage::Authenticate => "authenticate to VK Cloud",
            Stage::FindZone => "find zone ID",
            Stage::CreateRecord => "create TXT record",
            Stage::DeleteRecord => "delete TXT record",
        })
    }
}

/// A stage failure, reported as "failed to <stage>: <cause>".
#[derive(Debug, Error)]
#[error("failed to {stage}: {source}")]
pub struct ChallengeError {
    pub stage: Stage,
    #[source]
    pub source: SolverError,
}

trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T, ChallengeError>;
}

impl<T> StageExt<T> for Result<T, SolverError> {
    fn stage(self, stage: Stage) -> Result<T, ChallengeError> {
        self.map_err(|source| ChallengeError { stage, source })
    }
}

/// What the hosting webhook server drives.
#[async_trait]
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;

    /// Ensure the challenge TXT record is present.
    async fn present(&self, ch: &ChallengeRequest) -> Result<(), ChallengeError>;

    /// Ensure the challenge TXT record is absent.
    async fn clean_up(&self, ch: &ChallengeRequest) -> Result<(), ChallengeError>;
}

pub struct VkCloudSolver {
    config: AppConfig,
    secrets: Arc<dyn SecretStore>,
    authenticator: Authenticator,
    dns: VkCloudDnsClient,
}

impl VkCloudSolver {
    /// Connect the solver to the cluster's secret store.
    pub fn initialize(config: AppConfig, cluster: kube::Config) -> anyhow::Result<Self> {
        let store = KubeSecretStore::from_config(cluster)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: AppConfig, secrets: Arc<dyn SecretStore>) -> Self {
        let http = Client::new();
        Self {
            authenticator: Authenticator::new(http.clone(), config.timeouts.auth),
            dns: VkCloudDnsClient::new(http, &config),
            config,
            secrets,
        }
    }

    /// Shared front half of both pipelines: config, credential, token, zone.
    async fn prepare(&self, ch: &ChallengeRequest) -> Result<(AuthToken, String), ChallengeError> {
        let cfg = SolverConfig::from_json(ch.config.as_ref()).stage(Stage::DecodeConfig)?;

        let credential = resolve_credential(
            self.secrets.as_ref(),
            &ch.resource_namespace,
            &cfg.secret_ref,
        )
        .await
        .stage(Stage::ResolveCredentials)?;

        let token = self
            .authenticator
            .authenticate(&credential)
            .await
            .stage(Stage::Authenticate)?;

        let zone_id = self
            .dns
            .find_zone(&ch.resolved_zone, &token)
            .await
            .stage(Stage::FindZone)?;

        Ok((token, zone_id))
    }
}

#[async_trait]
impl Solver for VkCloudSolver {
    fn name(&self) -> &str {
        &self.config.solver_name
    }

    #[instrument(skip_all, fields(uid = %ch.uid, fqdn = %ch.resolved_fqdn))]
    async fn present(&self, ch: &ChallengeRequest) -> Result<(), ChallengeError> {
        let (token, zone_id) = self.prepare(ch).await?;
        self.dns
            .create_txt(&zone_id, &ch.resolved_fqdn, &ch.key, &token)
            .await
            .stage(Stage::CreateRecord)?;
        info!("challenge record presented");
        Ok(())
    }

    #[instrument(skip_all, fields(uid = %ch.uid, fqdn = %ch.resolved_fqdn))]
    async fn clean_up(&self, ch: &ChallengeRequest) -> Result<(), ChallengeError> {
        let (token, zone_id) = self.prepare(ch).await?;
        self.dns
            .delete_txt(&zone_id, &ch.resolved_fqdn, &ch.key, &token)
            .await
            .stage(Stage::DeleteRecord)?;
        info!("challenge record cleaned up");
        Ok(())
    }
}
