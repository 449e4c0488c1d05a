use std::sync::mpsc;

use crate::domain::nsi::query::{
    QueryNotificationConfirmed, QueryNotificationReply, QueryNotificationRequest, QueryRequest, QuerySummaryConfirmed,
};
use crate::domain::protocol::reply::{GenericReply, ReserveReply, ReserveRequest};
use crate::domain::utils::id::ConnectionId;
use crate::error::Result;

/// Messages representing every method of the ProtocolClient trait, so calls
/// can be handed to the session worker thread.
pub enum SessionMessage {
    Reserve {
        request: ReserveRequest,
        reply_to: mpsc::Sender<Result<ReserveReply>>,
    },

    ReserveCommit {
        connection_id: ConnectionId,
        reply_to: mpsc::Sender<Result<GenericReply>>,
    },

    ReserveAbort {
        connection_id: ConnectionId,
        reply_to: mpsc::Sender<Result<GenericReply>>,
    },

    Provision {
        connection_id: ConnectionId,
        reply_to: mpsc::Sender<Result<GenericReply>>,
    },

    Release {
        connection_id: ConnectionId,
        reply_to: mpsc::Sender<Result<GenericReply>>,
    },

    Terminate {
        connection_id: ConnectionId,
        reply_to: mpsc::Sender<Result<GenericReply>>,
    },

    QuerySummarySync {
        query: QueryRequest,
        reply_to: mpsc::Sender<Result<QuerySummaryConfirmed>>,
    },

    QueryNotificationSync {
        query: QueryNotificationRequest,
        reply_to: mpsc::Sender<Result<QueryNotificationConfirmed>>,
    },

    QueryNotification {
        query: QueryNotificationRequest,
        reply_to: mpsc::Sender<Result<QueryNotificationReply>>,
    },

    Shutdown,
}
