//! Transport contract for elicitation round-trips.
//!
//! The transport owns the wire: it delivers an [`ElicitationRequest`] to the
//! client and resolves with the client's raw reply. Anything it cannot make
//! sense of is reported as [`TransportError::Malformed`] and later treated as
//! a cancellation; only [`TransportError::NotSupported`] escapes to callers
//! as an error.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::ElicitationRequest;

/// Action tag of a raw reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyAction {
    /// User submitted the form
    Accept,
    /// User explicitly declined
    Decline,
    /// User dismissed without choosing
    Cancel,
    /// Any tag this library does not know
    #[serde(other)]
    Unknown,
}

/// Raw client reply, before classification or validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitationReply {
    /// The user action
    pub action: ReplyAction,

    /// Submitted content; only meaningful with [`ReplyAction::Accept`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    /// Optional metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ElicitationReply {
    /// An accept reply with content
    pub fn accept(content: Value) -> Self {
        Self {
            action: ReplyAction::Accept,
            content: Some(content),
            meta: None,
        }
    }

    /// A decline reply
    pub fn decline() -> Self {
        Self {
            action: ReplyAction::Decline,
            content: None,
            meta: None,
        }
    }

    /// A cancel reply
    pub fn cancel() -> Self {
        Self {
            action: ReplyAction::Cancel,
            content: None,
            meta: None,
        }
    }

    /// Parse a reply received as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Malformed`] if the value is not a reply object.
    pub fn from_json(value: Value) -> Result<Self, TransportError> {
        serde_json::from_value(value).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

/// Transport failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The remote side cannot perform structured elicitation
    #[error("Elicitation not supported: {0}")]
    NotSupported(String),

    /// The connection closed before a reply arrived
    #[error("Transport closed before a reply arrived")]
    Closed,

    /// The reply could not be understood
    #[error("Malformed elicitation reply: {0}")]
    Malformed(String),
}

/// Transport that carries elicitation requests to a client
#[async_trait]
pub trait ElicitationTransport: Send + Sync {
    /// Send one request and wait for the raw reply
    async fn elicit(&self, request: &ElicitationRequest) -> Result<ElicitationReply, TransportError>;

    /// Check if the remote side advertises elicitation support
    fn supports_elicitation(&self) -> bool {
        true
    }
}

/// One scripted step of a [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Resolve with this reply
    Reply(ElicitationReply),
    /// Fail with this error
    Fail(TransportError),
    /// Never resolve
    Hang,
}

/// In-memory transport that replays a queued script and records requests.
///
/// When the script runs out, further requests fail with
/// [`TransportError::Closed`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<ElicitationRequest>>,
    unsupported: bool,
}

impl ScriptedTransport {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose client lacks elicitation support
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Queue an arbitrary step
    #[must_use]
    pub fn then(self, step: ScriptStep) -> Self {
        self.script.lock().push_back(step);
        self
    }

    /// Queue an accept reply
    #[must_use]
    pub fn then_accept(self, content: Value) -> Self {
        self.then(ScriptStep::Reply(ElicitationReply::accept(content)))
    }

    /// Queue a decline reply
    #[must_use]
    pub fn then_decline(self) -> Self {
        self.then(ScriptStep::Reply(ElicitationReply::decline()))
    }

    /// Queue a cancel reply
    #[must_use]
    pub fn then_cancel(self) -> Self {
        self.then(ScriptStep::Reply(ElicitationReply::cancel()))
    }

    /// Queue a reply that never arrives
    #[must_use]
    pub fn then_hang(self) -> Self {
        self.then(ScriptStep::Hang)
    }

    /// Queue a transport failure
    #[must_use]
    pub fn then_fail(self, error: TransportError) -> Self {
        self.then(ScriptStep::Fail(error))
    }

    /// Append a step to a shared transport
    pub fn push(&self, step: ScriptStep) {
        self.script.lock().push_back(step);
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ElicitationRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl ElicitationTransport for ScriptedTransport {
    async fn elicit(&self, request: &ElicitationRequest) -> Result<ElicitationReply, TransportError> {
        if self.unsupported {
            return Err(TransportError::NotSupported(
                "client did not declare the elicitation capability".to_string(),
            ));
        }

        self.requests.lock().push(request.clone());
        let step = self.script.lock().pop_front();
        match step {
            Some(ScriptStep::Reply(reply)) => Ok(reply),
            Some(ScriptStep::Fail(error)) => Err(error),
            Some(ScriptStep::Hang) => std::future::pending().await,
            None => Err(TransportError::Closed),
        }
    }

    fn supports_elicitation(&self) -> bool {
        !self.unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElicitationSchema;
    use serde_json::json;

    fn request() -> ElicitationRequest {
        ElicitationRequest {
            message: "hello".to_string(),
            requested_schema: ElicitationSchema::new(),
        }
    }

    #[test]
    fn test_reply_parsing() {
        let reply = ElicitationReply::from_json(json!({"action": "accept", "content": {"a": 1}}))
            .unwrap();
        assert_eq!(reply.action, ReplyAction::Accept);
        assert_eq!(reply.content, Some(json!({"a": 1})));

        let reply = ElicitationReply::from_json(json!({"action": "postpone"})).unwrap();
        assert_eq!(reply.action, ReplyAction::Unknown);

        assert!(matches!(
            ElicitationReply::from_json(json!("accept")),
            Err(TransportError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_scripted_transport_replays_in_order() {
        let transport = ScriptedTransport::new()
            .then_accept(json!({"x": 1}))
            .then_decline()
            .then_fail(TransportError::Malformed("garbage".to_string()));

        assert_eq!(transport.elicit(&request()).await.unwrap().action, ReplyAction::Accept);
        assert_eq!(transport.elicit(&request()).await.unwrap().action, ReplyAction::Decline);
        assert!(matches!(
            transport.elicit(&request()).await,
            Err(TransportError::Malformed(_))
        ));
        assert_eq!(transport.elicit(&request()).await, Err(TransportError::Closed));
        assert_eq!(transport.request_count(), 4);
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_transport() {
        let transport = ScriptedTransport::unsupported();
        assert!(!transport.supports_elicitation());
        assert!(matches!(
            transport.elicit(&request()).await,
            Err(TransportError::NotSupported(_))
        ));
        assert_eq!(transport.request_count(), 0);
    }
}
