//! Error types for the pooled client.

/// Result type for the pooled client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced while talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RESP2 framing or parse error.
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    /// The store answered with an error reply.
    #[error("server error: {message}")]
    Server { message: String },

    /// Reply type or shape did not match the command's declared result.
    #[error("unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },

    /// Pool is at capacity and no idle connections are available.
    #[error("connection pool exhausted (max active: {max_active})")]
    PoolExhausted { max_active: usize },

    /// Address could not be resolved into a socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// AUTH was rejected while dialing.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Pool configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds a `Server` error from a raw RESP error payload.
    pub fn server(message: &[u8]) -> Self {
        ClientError::Server {
            message: String::from_utf8_lossy(message).into_owned(),
        }
    }

    /// Whether the connection that produced this error is still usable.
    ///
    /// Error replies and decode mismatches leave the stream in sync; IO and
    /// framing failures do not.
    pub fn keeps_connection(&self) -> bool {
        matches!(
            self,
            ClientError::Server { .. } | ClientError::UnexpectedResponse { .. }
        )
    }
}
