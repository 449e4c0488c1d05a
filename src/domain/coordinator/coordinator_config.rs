use std::path::Path;
use std::time::Duration;

use crate::api::config_dto::CoordinatorConfigDto;
use crate::domain::protocol::credential::Credential;
use crate::domain::utils::id::NsaId;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Reply wait used when the configuration does not name one.
pub const DEFAULT_REPLY_WAIT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub nsa: NsaId,
    pub uri: String,
}

/// How the requester receives provider replies, resolved once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChannel {
    /// The provider can call back `requester_uri`; asynchronous operations are available.
    Callback { requester_uri: String },
    /// Only synchronous request/reply exchanges are possible.
    RequestOnly,
}

impl NotificationChannel {
    pub fn from_requester_uri(requester_uri: Option<String>) -> Self {
        match requester_uri.filter(|uri| !uri.trim().is_empty()) {
            Some(requester_uri) => NotificationChannel::Callback { requester_uri },
            None => NotificationChannel::RequestOnly,
        }
    }

    pub fn requester_uri(&self) -> Option<&str> {
        match self {
            NotificationChannel::Callback { requester_uri } => Some(requester_uri),
            NotificationChannel::RequestOnly => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub provider: ProviderEndpoint,
    pub requester_nsa: NsaId,
    pub notification_channel: NotificationChannel,
    pub credential: Credential,
    pub reply_wait: Duration,
}

impl CoordinatorConfig {
    pub fn new(provider_nsa: &str, provider_uri: &str, requester_nsa: &str, requester_uri: Option<&str>) -> Self {
        Self {
            provider: ProviderEndpoint { nsa: NsaId::new(provider_nsa), uri: provider_uri.to_string() },
            requester_nsa: NsaId::new(requester_nsa),
            notification_channel: NotificationChannel::from_requester_uri(requester_uri.map(str::to_string)),
            credential: Credential::Anonymous,
            reply_wait: DEFAULT_REPLY_WAIT,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_reply_wait(mut self, reply_wait: Duration) -> Self {
        self.reply_wait = reply_wait;
        self
    }

    pub fn from_json_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let dto: CoordinatorConfigDto = parse_json_file(file_path.as_ref())?;
        log::info!("Coordinator configuration loaded from '{}'.", file_path.as_ref().display());
        Self::try_from(dto)
    }
}

fn required(name: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::ConfigError(format!("'{}' must not be empty", name)));
    }
    Ok(value)
}

impl TryFrom<CoordinatorConfigDto> for CoordinatorConfig {
    type Error = Error;

    fn try_from(dto: CoordinatorConfigDto) -> Result<Self> {
        let reply_wait = match dto.reply_wait_secs {
            Some(0) => return Err(Error::ConfigError("'replyWaitSecs' must be greater than zero".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REPLY_WAIT,
        };

        Ok(Self {
            provider: ProviderEndpoint {
                nsa: NsaId::new(required("providerNsa", dto.provider_nsa)?),
                uri: required("providerUri", dto.provider_uri)?,
            },
            requester_nsa: NsaId::new(required("requesterNsa", dto.requester_nsa)?),
            notification_channel: NotificationChannel::from_requester_uri(dto.requester_uri),
            credential: Credential::from_pair(dto.http_user, dto.http_password),
            reply_wait,
        })
    }
}
