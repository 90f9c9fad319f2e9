//! Elicitation session: transport, configuration and cancellation shared by
//! every form instance and wizard run that uses it.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ElicitationConfig;
use crate::outcome::CancelReason;
use crate::schema::ElicitationRequest;
use crate::transport::{ElicitationReply, ElicitationTransport, TransportError};

/// Result of one suspended round-trip
#[derive(Debug)]
pub(crate) enum RoundTrip {
    Reply(ElicitationReply),
    Cancelled(CancelReason),
    NotSupported(String),
}

/// Handle used to run elicitations over one transport.
///
/// Cloning is cheap; clones share the transport, configuration and
/// cancellation token. Use [`ElicitationSession::child`] to get a session
/// that can be cancelled on its own.
#[derive(Clone)]
pub struct ElicitationSession {
    transport: Arc<dyn ElicitationTransport>,
    config: Arc<ElicitationConfig>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ElicitationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElicitationSession")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ElicitationSession {
    /// Create a session with default configuration
    pub fn new(transport: Arc<dyn ElicitationTransport>) -> Self {
        Self {
            transport,
            config: Arc::new(ElicitationConfig::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ElicitationConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Use an external cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A session sharing transport and config, cancelled with this one but
    /// also cancellable on its own
    pub fn child(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            cancel: self.cancel.child_token(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ElicitationConfig {
        &self.config
    }

    /// Token that cancels pending elicitations of this session
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every pending and future elicitation of this session
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the remote side advertises elicitation support
    pub fn supports_elicitation(&self) -> bool {
        self.transport.supports_elicitation()
    }

    /// Send a request and wait for the reply, the timeout, or cancellation,
    /// whichever comes first.
    pub(crate) async fn round_trip(
        &self,
        request: &ElicitationRequest,
        timeout: Duration,
    ) -> RoundTrip {
        if !self.transport.supports_elicitation() {
            return RoundTrip::NotSupported(
                "client did not declare the elicitation capability".to_string(),
            );
        }

        tokio::select! {
            biased;

            () = self.cancel.cancelled() => {
                warn!("Elicitation cancelled by signal");
                RoundTrip::Cancelled(CancelReason::Signal)
            }
            result = self.transport.elicit(request) => match result {
                Ok(reply) => {
                    debug!(action = ?reply.action, "Received elicitation reply");
                    RoundTrip::Reply(reply)
                }
                Err(TransportError::NotSupported(reason)) => RoundTrip::NotSupported(reason),
                Err(TransportError::Closed) => {
                    warn!("Transport closed while elicitation was pending");
                    RoundTrip::Cancelled(CancelReason::Disconnected)
                }
                Err(TransportError::Malformed(reason)) => {
                    warn!(%reason, "Malformed elicitation reply");
                    RoundTrip::Cancelled(CancelReason::Malformed)
                }
            },
            () = tokio::time::sleep(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "Elicitation timed out");
                RoundTrip::Cancelled(CancelReason::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElicitationSchema;
    use crate::transport::{ReplyAction, ScriptedTransport};

    fn request() -> ElicitationRequest {
        ElicitationRequest {
            message: "m".to_string(),
            requested_schema: ElicitationSchema::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_transport_times_out() {
        let session = ElicitationSession::new(Arc::new(ScriptedTransport::new().then_hang()));
        let result = session.round_trip(&request(), Duration::from_secs(10)).await;
        assert!(matches!(result, RoundTrip::Cancelled(CancelReason::Timeout)));
    }

    #[tokio::test]
    async fn test_cancelled_session_resolves_immediately() {
        let session = ElicitationSession::new(Arc::new(ScriptedTransport::new().then_hang()));
        session.cancel();
        let result = session.round_trip(&request(), Duration::from_secs(3600)).await;
        assert!(matches!(result, RoundTrip::Cancelled(CancelReason::Signal)));
    }

    #[tokio::test]
    async fn test_child_cancel_leaves_parent_running() {
        let parent = ElicitationSession::new(Arc::new(
            ScriptedTransport::new().then_hang().then_decline(),
        ));
        let child = parent.child();
        child.cancel();

        let result = child.round_trip(&request(), Duration::from_secs(60)).await;
        assert!(matches!(result, RoundTrip::Cancelled(CancelReason::Signal)));
        assert!(!parent.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_transport_errors_map_to_round_trip() {
        let transport = ScriptedTransport::new()
            .then_fail(TransportError::Malformed("bad json".to_string()))
            .then_decline();
        let session = ElicitationSession::new(Arc::new(transport));
        let timeout = Duration::from_secs(60);

        assert!(matches!(
            session.round_trip(&request(), timeout).await,
            RoundTrip::Cancelled(CancelReason::Malformed)
        ));
        assert!(matches!(
            session.round_trip(&request(), timeout).await,
            RoundTrip::Reply(ElicitationReply { action: ReplyAction::Decline, .. })
        ));
        assert!(matches!(
            session.round_trip(&request(), timeout).await,
            RoundTrip::Cancelled(CancelReason::Disconnected)
        ));

        let session = ElicitationSession::new(Arc::new(ScriptedTransport::unsupported()));
        assert!(matches!(
            session.round_trip(&request(), timeout).await,
            RoundTrip::NotSupported(_)
        ));
    }
}
