//! Single-command execution seam between collection handles and the store.

use std::sync::Arc;

use crate::command::Command;
use crate::error::ClientResult;
use crate::pool::ConnectionPool;
use crate::resp::RespValue;

/// Executes exactly one command and returns the raw reply.
///
/// Implementations own connection handling: whatever they borrow for the
/// command must be released before `dispatch` returns, on every path.
pub trait Dispatch {
    fn dispatch(&self, command: &Command) -> ClientResult<RespValue>;
}

impl Dispatch for ConnectionPool {
    fn dispatch(&self, command: &Command) -> ClientResult<RespValue> {
        let mut conn = self.acquire()?;
        conn.exec(command)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn dispatch(&self, command: &Command) -> ClientResult<RespValue> {
        (**self).dispatch(command)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, command: &Command) -> ClientResult<RespValue> {
        (**self).dispatch(command)
    }
}
