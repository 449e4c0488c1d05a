use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorConfigDto {
    pub provider_nsa: String,
    pub provider_uri: String,
    pub requester_nsa: String,
    /// Absent when the requester cannot receive asynchronous callbacks.
    pub requester_uri: Option<String>,
    pub http_user: Option<String>,
    pub http_password: Option<String>,
    pub reply_wait_secs: Option<u64>,
}
