//! Error types for the collection handles.

use redcol_client::ClientError;

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors surfaced by `RemoteList` and `RemoteHash`.
///
/// A blocking wait that expires is not an error; it yields `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// Transport, framing, store error reply or reply-shape failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A transfer was requested without a destination list.
    #[error("destination list is missing")]
    MissingDestination,

    /// The destination list has an empty key.
    #[error("destination list key is empty")]
    EmptyDestinationKey,

    /// A blocking wait was given a negative timeout.
    #[error("timeout must not be negative (got {0})")]
    NegativeTimeout(i64),

    /// A variadic operation was called without any items.
    #[error("{command} needs at least one item")]
    EmptyArguments { command: &'static str },

    /// A stored value could not be decoded as the requested type.
    #[error("cannot decode value as {expected}: {reason}")]
    Decode {
        expected: &'static str,
        reason: String,
    },
}

impl CollectionError {
    /// Whether the arguments were rejected before contacting the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CollectionError::MissingDestination
                | CollectionError::EmptyDestinationKey
                | CollectionError::NegativeTimeout(_)
                | CollectionError::EmptyArguments { .. }
        )
    }

    /// The store's error message, when the store rejected the command.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            CollectionError::Client(ClientError::Server { message }) => Some(message),
            _ => None,
        }
    }
}
