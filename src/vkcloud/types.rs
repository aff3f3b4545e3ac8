use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub uuid: String,
    #[serde(rename = "zone")]
    pub name: String, // "example.com." or "example.com"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxtRecord {
    pub uuid: String,
    pub name: String, // "_acme-challenge.example.com."
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl TxtRecord {
    pub fn matches(&self, fqdn: &str, content: &str) -> bool {
        self.name == fqdn && self.content == content
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TxtRecordList {
    #[serde(default)]
    pub txt_records: Vec<TxtRecord>,
}

// Used when creating a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxtRecordCreate {
    pub name: String,
    pub content: String,
    pub ttl: u32,
}
