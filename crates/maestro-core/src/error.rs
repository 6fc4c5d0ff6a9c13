use thiserror::Error;

/// Top-level error type for the Maestro orchestrator.
///
/// The taxonomy is deliberately closed: the queue processor dead-letters
/// failed messages with [`MaestroError::kind`] as the reason code, and the
/// gateway maps variants to HTTP statuses, so callers branch on kind
/// rather than on message text.
#[derive(Debug, Error)]
pub enum MaestroError {
    /// A single discovery endpoint could not be fetched or parsed.
    /// Per-endpoint and non-fatal: discovery logs it and moves on.
    #[error("discovery of {endpoint} failed: {reason}")]
    Discovery { endpoint: String, reason: String },

    /// The registry is empty at dispatch time.
    #[error("no agents available")]
    NoAgentsAvailable,

    /// The router returned no agent despite a non-empty registry.
    #[error("no suitable agent found for this task")]
    NoSuitableAgent,

    /// A dispatch was requested for a name absent from the registry.
    #[error("agent '{0}' not found")]
    AgentNotFound(String),

    /// The stored descriptor has no resolvable base address.
    #[error("no base URL stored for agent '{0}'")]
    MissingBaseUrl(String),

    /// The outbound call to an agent failed (network error or non-success
    /// response).
    #[error("dispatch to agent '{agent}' failed: {reason}")]
    Dispatch { agent: String, reason: String },

    /// A queue primitive (send/receive/complete/dead-letter/abandon)
    /// failed at the transport level.
    #[error("queue transport failure: {0}")]
    QueueTransport(String),

    /// No queue transport is configured; async operations are unavailable.
    #[error("queue transport not available")]
    QueueUnavailable,

    /// A queue message body could not be decoded into the expected payload.
    #[error("malformed queue payload: {0}")]
    MalformedPayload(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaestroError {
    /// Stable reason code for this error, used when dead-lettering.
    pub fn kind(&self) -> &'static str {
        match self {
            MaestroError::Discovery { .. } => "DiscoveryFailure",
            MaestroError::NoAgentsAvailable => "NoAgentsAvailable",
            MaestroError::NoSuitableAgent => "NoSuitableAgent",
            MaestroError::AgentNotFound(_) => "AgentNotFound",
            MaestroError::MissingBaseUrl(_) => "MissingBaseUrl",
            MaestroError::Dispatch { .. } => "DispatchError",
            MaestroError::QueueTransport(_) => "QueueTransportFailure",
            MaestroError::QueueUnavailable => "QueueUnavailable",
            MaestroError::MalformedPayload(_) => "MalformedPayload",
            MaestroError::Json(_) => "JsonError",
            MaestroError::Io(_) => "IoError",
        }
    }
}

/// A convenience `Result` alias using [`MaestroError`].
pub type MaestroResult<T> = Result<T, MaestroError>;
