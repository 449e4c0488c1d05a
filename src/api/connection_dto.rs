use serde::{Deserialize, Serialize};

/// A number that clients send either as JSON number or as string.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NumberOrStringDto {
    Number(i64),
    Text(String),
}

impl NumberOrStringDto {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrStringDto::Number(value) => Some(*value),
            NumberOrStringDto::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Connection attributes as posted by front-end clients.
///
/// Everything is optional at this level; required attributes are checked when
/// the request is built.
#[derive(Debug, Deserialize, Clone, Serialize, Default, PartialEq)]
pub struct ConnectionAttributesDto {
    pub description: Option<String>,
    pub src_domain: Option<String>,
    pub src_port: Option<String>,
    pub src_vlan: Option<NumberOrStringDto>,
    pub dst_domain: Option<String>,
    pub dst_port: Option<String>,
    pub dst_vlan: Option<NumberOrStringDto>,
    pub capacity: Option<NumberOrStringDto>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub explicit_routes: Option<Vec<String>>,
}

/// One name/value pair of a service characteristic list.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct ServiceCharacteristicDto {
    pub name: String,
    pub value: serde_json::Value,
}

/// Status of a connection as reported to front-end clients.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusDto {
    pub active: bool,
    pub connection_id: String,
    pub description: Option<String>,
    pub global_reservation_id: Option<String>,
    pub lifecycle_state: String,
    pub notification_id: Option<u64>,
    pub provision_state: Option<String>,
    #[serde(rename = "requesterNSA")]
    pub requester_nsa: String,
    pub reservation_state: String,
    pub version: u32,
    pub version_consistent: bool,
}
