use crate::auth::AuthToken;
use crate::config::{AppConfig, Timeouts};
use crate::error::SolverError;
use crate::vkcloud::types::*;
use crate::vkcloud::{AUTH_TOKEN_HEADER, CHALLENGE_TTL, zone_names_match};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

#[derive(Clone)]
pub struct VkCloudDnsClient {
    http: Client,
    base_url: String, // e.g. "https://mcs.mail.ru/public-dns/v2/dns/"
    timeouts: Timeouts,
}

impl VkCloudDnsClient {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.api_base(),
            timeouts: config.timeouts.clone(),
        }
    }

    fn auth_header(
        &self,
        req: reqwest::RequestBuilder,
        token: &AuthToken,
    ) -> reqwest::RequestBuilder {
        req.header(AUTH_TOKEN_HEADER, token.as_str())
    }

    fn txt_url(&self, zone_id: &str) -> String {
        format!("{}{}/txt/", self.base_url, zone_id)
    }

    pub async fn list_zones(&self, token: &AuthToken) -> Result<Vec<Zone>, SolverError> {
        debug!(url = %self.base_url, "listing DNS zones");
        let res = self
            .auth_header(self.http.get(&self.base_url), token)
            .timeout(self.timeouts.zone_list)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(SolverError::transport("failed to fetch zones"))?;
        res.json::<Vec<Zone>>()
            .await
            .map_err(SolverError::transport("failed to parse zones response"))
    }

    /// Resolve the provider id of `zone`. The full zone list comes back in a
    /// single response; the first name match wins.
    pub async fn find_zone(&self, zone: &str, token: &AuthToken) -> Result<String, SolverError> {
        self.list_zones(token)
            .await?
            .into_iter()
            .find(|z| zone_names_match(&z.name, zone))
            .map(|z| z.uuid)
            .ok_or_else(|| SolverError::ZoneNotFound {
                zone: zone.to_string(),
            })
    }

    pub async fn list_txt_records(
        &self,
        zone_id: &str,
        token: &AuthToken,
    ) -> Result<Vec<TxtRecord>, SolverError> {
        let res = self
            .auth_header(self.http.get(self.txt_url(zone_id)), token)
            .timeout(self.timeouts.record_list)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(SolverError::transport("failed to fetch TXT records"))?;
        let list = res
            .json::<TxtRecordList>()
            .await
            .map_err(SolverError::transport("failed to parse TXT records"))?;
        Ok(list.txt_records)
    }

    pub async fn create_txt(
        &self,
        zone_id: &str,
        fqdn: &str,
        value: &str,
        token: &AuthToken,
    ) -> Result<(), SolverError> {
        let record = TxtRecordCreate {
            name: fqdn.to_string(),
            content: value.to_string(),
            ttl: CHALLENGE_TTL,
        };
        let res = self
            .auth_header(self.http.post(self.txt_url(zone_id)), token)
            .json(&record)
            .timeout(self.timeouts.record_create)
            .send()
            .await
            .map_err(SolverError::transport("failed to create TXT record"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SolverError::RecordCreateFailed { status, body });
        }

        info!(zone_id = %zone_id, fqdn = %fqdn, "created challenge TXT record");
        Ok(())
    }

    /// Ensure no record with exactly (`fqdn`, `value`) remains, deleting the
    /// first match in list order. Absence is success.
    pub async fn delete_txt(
        &self,
        zone_id: &str,
        fqdn: &str,
        value: &str,
        token: &AuthToken,
    ) -> Result<(), SolverError> {
        let records = self.list_txt_records(zone_id, token).await?;
        let Some(record) = records.iter().find(|r| r.matches(fqdn, value)) else {
            debug!(zone_id = %zone_id, fqdn = %fqdn, "no matching TXT record; nothing to delete");
            return Ok(());
        };

        let url = format!("{}{}", self.txt_url(zone_id), record.uuid);
        let res = self
            .auth_header(self.http.delete(url), token)
            .timeout(self.timeouts.record_delete)
            .send()
            .await
            .map_err(SolverError::transport("failed to delete TXT record"))?;

        match res.status() {
            StatusCode::NOT_FOUND => {
                debug!(record = %record.uuid, "TXT record already gone");
            }
            status if !status.is_success() => {
                let body = res.text().await.unwrap_or_default();
                return Err(SolverError::RecordDeleteFailed { status, body });
            }
            _ => {
                info!(
                    zone_id = %zone_id,
                    fqdn = %fqdn,
                    record = %record.uuid,
                    "deleted challenge TXT record"
                );
            }
        }
        Ok(())
    }
}
