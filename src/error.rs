//! Error types for repository communication.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`GraphDbError`]. Errors fall into a few families:
//!
//! | Family | Variants | Recovered by |
//! |--------|----------|--------------|
//! | Transport | [`Transport`](GraphDbError::Transport), [`Status`](GraphDbError::Status) | endpoint failover |
//! | Exhaustion | [`EndpointsExhausted`](GraphDbError::EndpointsExhausted) | nothing, surfaced to the caller |
//! | Parsing | [`Parse`](GraphDbError::Parse), [`Json`](GraphDbError::Json), [`Utf8`](GraphDbError::Utf8) | nothing, never retried |
//! | Configuration | [`Config`](GraphDbError::Config), [`Url`](GraphDbError::Url) | raised before any request |
//! | Transaction | [`InvalidTransactionState`](GraphDbError::InvalidTransactionState) | raised before any request |

use crate::transaction::TransactionStatus;
use std::string::FromUtf8Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphDbError>;

/// Errors raised while talking to a repository.
#[derive(Debug, thiserror::Error)]
pub enum GraphDbError {
    /// The request never produced a response (connection refused, timeout, broken body).
    #[error("transport failure on {endpoint}: {message}")]
    Transport {
        /// URL the request was sent to
        endpoint: String,
        /// Underlying transport message
        message: String,
        /// Whether the failure was a timeout
        timeout: bool,
    },

    /// The server answered with a non-success status.
    #[error("{endpoint} responded with status {status}: {body}")]
    Status {
        /// URL the request was sent to
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// Every endpoint of the pool failed at the transport level.
    #[error("all {} endpoint(s) failed {attempted:?}: {source}", .attempted.len())]
    EndpointsExhausted {
        /// Endpoints tried, in order
        attempted: Vec<String>,
        /// Error of the last attempt
        #[source]
        source: Box<GraphDbError>,
    },

    /// Malformed response content.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Operation on a transaction that is no longer active.
    #[error("transaction {id} is {status}, no further operations are allowed")]
    InvalidTransactionState {
        /// Transaction identifier
        id: String,
        /// Status the transaction ended in
        status: TransactionStatus,
    },

    /// A response header the protocol requires was not sent.
    #[error("missing response header: {0}")]
    MissingHeader(String),

    /// The consumer of a stream went away.
    #[error("stream closed by consumer")]
    StreamClosed,

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// URL error
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Non UTF-8 text body
    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),
}

impl GraphDbError {
    /// Whether the error happened at the transport level and another endpoint may succeed.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, GraphDbError::Transport { .. })
    }

    /// Whether the error is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            GraphDbError::Transport { timeout, .. } => *timeout,
            GraphDbError::EndpointsExhausted { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status carried by the error, if the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphDbError::Status { status, .. } => Some(*status),
            GraphDbError::EndpointsExhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    pub(crate) fn parse(message: impl std::fmt::Display) -> Self {
        GraphDbError::Parse(message.to_string())
    }
}

impl From<rio_turtle::TurtleError> for GraphDbError {
    fn from(err: rio_turtle::TurtleError) -> Self {
        GraphDbError::parse(err)
    }
}

impl From<rio_xml::RdfXmlError> for GraphDbError {
    fn from(err: rio_xml::RdfXmlError) -> Self {
        GraphDbError::parse(err)
    }
}

impl From<sparesults::QueryResultsParseError> for GraphDbError {
    fn from(err: sparesults::QueryResultsParseError) -> Self {
        GraphDbError::parse(err)
    }
}
