use std::fmt::Debug;
use std::str::FromStr;

use crate::domain::nsi::query::{
    QueryNotificationConfirmed, QueryNotificationReply, QueryNotificationRequest, QueryRequest, QuerySummaryConfirmed,
};
use crate::domain::protocol::reply::{GenericReply, ReserveReply, ReserveRequest};
use crate::domain::utils::id::ConnectionId;
use crate::error::{Error, Result};

/// Request/reply exchange with a remote connection provider.
///
/// Implementations block until the matching reply arrives. A service exception
/// reported in-band is part of the `Ok` reply; `Err` means the exchange itself
/// failed (`Error::TransportFailure`), except for the synchronous queries, whose
/// service exceptions are returned as `Error::ProtocolFailure`.
pub trait ProtocolClient: Debug + Send + Sync {
    fn reserve(&self, request: ReserveRequest) -> Result<ReserveReply>;

    fn reserve_commit(&self, connection_id: &ConnectionId) -> Result<GenericReply>;

    fn reserve_abort(&self, connection_id: &ConnectionId) -> Result<GenericReply>;

    fn provision(&self, connection_id: &ConnectionId) -> Result<GenericReply>;

    fn release(&self, connection_id: &ConnectionId) -> Result<GenericReply>;

    fn terminate(&self, connection_id: &ConnectionId) -> Result<GenericReply>;

    fn query_summary_sync(&self, query: &QueryRequest) -> Result<QuerySummaryConfirmed>;

    fn query_notification_sync(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationConfirmed>;

    /// Asynchronous notification query, answered through the requester endpoint.
    fn query_notification(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationReply>;
}

/// Names of the protocol operations, used for call logs and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    Reserve,
    ReserveCommit,
    ReserveAbort,
    Provision,
    Release,
    Terminate,
    QuerySummarySync,
    QueryNotificationSync,
    QueryNotification,
}

impl FromStr for ProviderOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reserve" => Ok(ProviderOperation::Reserve),
            "reserveCommit" => Ok(ProviderOperation::ReserveCommit),
            "reserveAbort" => Ok(ProviderOperation::ReserveAbort),
            "provision" => Ok(ProviderOperation::Provision),
            "release" => Ok(ProviderOperation::Release),
            "terminate" => Ok(ProviderOperation::Terminate),
            "querySummarySync" => Ok(ProviderOperation::QuerySummarySync),
            "queryNotificationSync" => Ok(ProviderOperation::QueryNotificationSync),
            "queryNotification" => Ok(ProviderOperation::QueryNotification),
            _ => Err(Error::invalid_attribute("operation", format!("unknown provider operation '{}'", s))),
        }
    }
}
