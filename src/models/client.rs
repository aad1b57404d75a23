use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinic client as listed on the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client embedded in an appointment; the backend omits timestamps there on some routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Client {
    /// Contact line for tables: email, then phone, then a dash
    pub fn contact(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| self.phone.as_deref().filter(|p| !p.is_empty()))
            .unwrap_or("-")
    }
}
