use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::domain::nsi::query::{
    QueryNotificationConfirmed, QueryNotificationReply, QueryNotificationRequest, QueryRequest, QuerySummaryConfirmed,
};
use crate::domain::protocol::protocol_client_trait::ProtocolClient;
use crate::domain::protocol::reply::{GenericReply, ReserveReply, ReserveRequest};
use crate::domain::protocol::session_message::SessionMessage;
use crate::domain::utils::id::ConnectionId;
use crate::error::{Error, Result};

/// Handle to a protocol client running on its own worker thread.
///
/// Every call is forwarded to the worker and the reply is awaited for at most
/// `reply_wait`. The single worker serializes all calls of the process. A call
/// that times out is not cancelled: the worker still finishes it, the reply is dropped.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    name: String,
    tx: mpsc::Sender<SessionMessage>,
    reply_wait: Duration,
}

impl ProviderSession {
    pub fn spawn(name: impl Into<String>, client: Arc<dyn ProtocolClient>, reply_wait: Duration) -> Result<Self> {
        let name = name.into();
        let (tx, rx) = mpsc::channel::<SessionMessage>();

        let thread_name = name.clone();
        thread::Builder::new().name(format!("Session-{}", name)).spawn(move || {
            log::info!("Provider session {} started.", thread_name);
            Self::run_session_loop(client, rx);
            log::info!("Provider session {} stopped.", thread_name);
        })?;

        Ok(Self { name, tx, reply_wait })
    }

    pub fn reply_wait(&self) -> Duration {
        self.reply_wait
    }

    /// Stops the worker after the calls already queued.
    pub fn shutdown(&self) {
        if self.tx.send(SessionMessage::Shutdown).is_err() {
            log::debug!("Provider session {} already stopped", self.name);
        }
    }

    fn run_session_loop(client: Arc<dyn ProtocolClient>, rx: mpsc::Receiver<SessionMessage>) {
        // Send failures mean the caller already gave up waiting.
        while let Ok(msg) = rx.recv() {
            match msg {
                SessionMessage::Reserve { request, reply_to } => {
                    let _ = reply_to.send(client.reserve(request));
                }
                SessionMessage::ReserveCommit { connection_id, reply_to } => {
                    let _ = reply_to.send(client.reserve_commit(&connection_id));
                }
                SessionMessage::ReserveAbort { connection_id, reply_to } => {
                    let _ = reply_to.send(client.reserve_abort(&connection_id));
                }
                SessionMessage::Provision { connection_id, reply_to } => {
                    let _ = reply_to.send(client.provision(&connection_id));
                }
                SessionMessage::Release { connection_id, reply_to } => {
                    let _ = reply_to.send(client.release(&connection_id));
                }
                SessionMessage::Terminate { connection_id, reply_to } => {
                    let _ = reply_to.send(client.terminate(&connection_id));
                }
                SessionMessage::QuerySummarySync { query, reply_to } => {
                    let _ = reply_to.send(client.query_summary_sync(&query));
                }
                SessionMessage::QueryNotificationSync { query, reply_to } => {
                    let _ = reply_to.send(client.query_notification_sync(&query));
                }
                SessionMessage::QueryNotification { query, reply_to } => {
                    let _ = reply_to.send(client.query_notification(&query));
                }
                SessionMessage::Shutdown => break,
            }
        }
    }

    fn call<R, F>(&self, operation: &str, msg_builder: F) -> Result<R>
    where
        F: FnOnce(mpsc::Sender<Result<R>>) -> SessionMessage,
    {
        let (reply_tx, reply_rx) = mpsc::channel();

        self.tx
            .send(msg_builder(reply_tx))
            .map_err(|_| Error::TransportFailure(format!("provider session {} is closed, {} not sent", self.name, operation)))?;

        match reply_rx.recv_timeout(self.reply_wait) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Provider session {}: no reply to {} within {:?}", self.name, operation, self.reply_wait);
                Err(Error::TransportFailure(format!("no reply to {} within {:?}", operation, self.reply_wait)))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::TransportFailure(format!("provider session {} stopped while waiting for {}", self.name, operation)))
            }
        }
    }
}

impl ProtocolClient for ProviderSession {
    fn reserve(&self, request: ReserveRequest) -> Result<ReserveReply> {
        self.call("reserve", |tx| SessionMessage::Reserve { request, reply_to: tx })
    }

    fn reserve_commit(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        self.call("reserveCommit", |tx| SessionMessage::ReserveCommit { connection_id: connection_id.clone(), reply_to: tx })
    }

    fn reserve_abort(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        self.call("reserveAbort", |tx| SessionMessage::ReserveAbort { connection_id: connection_id.clone(), reply_to: tx })
    }

    fn provision(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        self.call("provision", |tx| SessionMessage::Provision { connection_id: connection_id.clone(), reply_to: tx })
    }

    fn release(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        self.call("release", |tx| SessionMessage::Release { connection_id: connection_id.clone(), reply_to: tx })
    }

    fn terminate(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        self.call("terminate", |tx| SessionMessage::Terminate { connection_id: connection_id.clone(), reply_to: tx })
    }

    fn query_summary_sync(&self, query: &QueryRequest) -> Result<QuerySummaryConfirmed> {
        self.call("querySummarySync", |tx| SessionMessage::QuerySummarySync { query: query.clone(), reply_to: tx })
    }

    fn query_notification_sync(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationConfirmed> {
        self.call("queryNotificationSync", |tx| SessionMessage::QueryNotificationSync { query: query.clone(), reply_to: tx })
    }

    fn query_notification(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationReply> {
        self.call("queryNotification", |tx| SessionMessage::QueryNotification { query: query.clone(), reply_to: tx })
    }
}
