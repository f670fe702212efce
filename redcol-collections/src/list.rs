//! # Remote List
//!
//! Purpose: A double-ended list stored under one key, with blocking pops
//! and atomic back-to-front transfer between two lists.
//!
//! ## Design Principles
//! 1. **One Command Per Operation**: Every method sends exactly one store
//!    command; a transfer is never split into a pop and a push.
//! 2. **Validate Before Sending**: Bad destinations and negative timeouts
//!    are rejected without touching the store.
//! 3. **Timeout Is A Value**: An expired wait returns `Ok(None)`; only
//!    transport, store and reply-shape failures are errors.
//!
//! Indices are 0-based from the front; negative indices count from the
//! back (`-1` is the last element). The store checks them at call time.

use std::fmt;

use redcol_client::{Command, ConnectionPool, Dispatch, RespValue, ToArg};

use crate::error::{CollectionError, Result};
use crate::keyed::Keyed;
use crate::reply;
use crate::value::Value;

/// Operations on a remote double-ended list.
pub trait ListOps: Keyed {
    /// Deletes the whole list. Returns true when something was deleted.
    fn clear(&self) -> Result<bool>;

    /// Number of elements; 0 for a missing list.
    fn count(&self) -> Result<usize>;

    /// Removes and returns the front element.
    fn pop_front(&self) -> Result<Option<Value>>;

    /// Removes and returns the back element.
    fn pop_back(&self) -> Result<Option<Value>>;

    /// Removes and returns the front element, waiting up to
    /// `timeout_secs` seconds for one to arrive (0 waits forever).
    ///
    /// Returns `Ok(None)` when the wait expires.
    fn pop_front_wait(&self, timeout_secs: i64) -> Result<Option<Value>>;

    /// Back-end counterpart of [`ListOps::pop_front_wait`].
    fn pop_back_wait(&self, timeout_secs: i64) -> Result<Option<Value>>;

    /// Pushes values at the front, first value first, so the last value
    /// ends up at index 0. Returns the new length.
    fn push_front<V: ToArg>(&self, values: &[V]) -> Result<usize>;

    /// Pushes values at the back in order. Returns the new length.
    fn push_back<V: ToArg>(&self, values: &[V]) -> Result<usize>;

    /// Element at `index`, or `None` when out of range.
    fn get(&self, index: i64) -> Result<Option<Value>>;

    /// Overwrites the element at `index`; an out-of-range index is a
    /// store error.
    fn set<V: ToArg>(&self, index: i64, value: V) -> Result<()>;

    /// Removes every occurrence of `value`. Returns how many were removed.
    fn remove<V: ToArg>(&self, value: V) -> Result<usize>;

    /// Atomically moves the back element of this list to the front of
    /// `destination` and returns it; `None` when this list is empty.
    fn pop_back_to_front(&self, destination: Option<&dyn Keyed>) -> Result<Option<Value>>;

    /// Blocking variant of [`ListOps::pop_back_to_front`].
    fn pop_back_to_front_wait(
        &self,
        destination: Option<&dyn Keyed>,
        timeout_secs: i64,
    ) -> Result<Option<Value>>;

    /// Keeps only the inclusive range `start..=stop`; an empty range
    /// deletes the list.
    fn trim(&self, start: i64, stop: i64) -> Result<()>;

    /// Elements in the inclusive range `start..=stop`, front to back.
    fn range(&self, start: i64, stop: i64) -> Result<Vec<Value>>;
}

/// Store-backed list handle: a `(key, dispatcher)` binding with no local
/// state.
#[derive(Clone)]
pub struct RemoteList<D = ConnectionPool> {
    key: String,
    dispatch: D,
}

impl<D: Dispatch> RemoteList<D> {
    pub fn new(key: impl Into<String>, dispatch: D) -> Self {
        RemoteList {
            key: key.into(),
            dispatch,
        }
    }

    fn run(&self, command: Command) -> Result<RespValue> {
        Ok(self.dispatch.dispatch(&command)?)
    }

    fn push(&self, name: &'static str, values: &[impl ToArg]) -> Result<usize> {
        if values.is_empty() {
            return Err(CollectionError::EmptyArguments { command: name });
        }
        reply::count(self.run(Command::new(name).arg(&self.key).args(values))?)
    }

    fn pop_wait(&self, name: &'static str, timeout_secs: i64) -> Result<Option<Value>> {
        let wait = wait_secs(timeout_secs)?;
        reply::popped_pair(self.run(Command::new(name).arg(&self.key).blocking_timeout(wait))?)
    }
}

impl<D> Keyed for RemoteList<D> {
    fn key(&self) -> &str {
        &self.key
    }
}

impl<D> fmt::Debug for RemoteList<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteList").field("key", &self.key).finish()
    }
}

impl<D: Dispatch> ListOps for RemoteList<D> {
    fn clear(&self) -> Result<bool> {
        reply::flag(self.run(Command::new("DEL").arg(&self.key))?)
    }

    fn count(&self) -> Result<usize> {
        reply::count(self.run(Command::new("LLEN").arg(&self.key))?)
    }

    fn pop_front(&self) -> Result<Option<Value>> {
        reply::optional(self.run(Command::new("LPOP").arg(&self.key))?)
    }

    fn pop_back(&self) -> Result<Option<Value>> {
        reply::optional(self.run(Command::new("RPOP").arg(&self.key))?)
    }

    fn pop_front_wait(&self, timeout_secs: i64) -> Result<Option<Value>> {
        self.pop_wait("BLPOP", timeout_secs)
    }

    fn pop_back_wait(&self, timeout_secs: i64) -> Result<Option<Value>> {
        self.pop_wait("BRPOP", timeout_secs)
    }

    fn push_front<V: ToArg>(&self, values: &[V]) -> Result<usize> {
        self.push("LPUSH", values)
    }

    fn push_back<V: ToArg>(&self, values: &[V]) -> Result<usize> {
        self.push("RPUSH", values)
    }

    fn get(&self, index: i64) -> Result<Option<Value>> {
        reply::optional(self.run(Command::new("LINDEX").arg(&self.key).arg(index))?)
    }

    fn set<V: ToArg>(&self, index: i64, value: V) -> Result<()> {
        reply::status(self.run(Command::new("LSET").arg(&self.key).arg(index).arg(value))?)
    }

    fn remove<V: ToArg>(&self, value: V) -> Result<usize> {
        // Count 0 removes every occurrence.
        reply::count(self.run(Command::new("LREM").arg(&self.key).arg(0i64).arg(value))?)
    }

    fn pop_back_to_front(&self, destination: Option<&dyn Keyed>) -> Result<Option<Value>> {
        let destination = destination_key(destination)?;
        reply::optional(self.run(Command::new("RPOPLPUSH").arg(&self.key).arg(destination))?)
    }

    fn pop_back_to_front_wait(
        &self,
        destination: Option<&dyn Keyed>,
        timeout_secs: i64,
    ) -> Result<Option<Value>> {
        let destination = destination_key(destination)?;
        let wait = wait_secs(timeout_secs)?;
        let command = Command::new("BRPOPLPUSH")
            .arg(&self.key)
            .arg(destination)
            .blocking_timeout(wait);
        reply::optional(self.run(command)?)
    }

    fn trim(&self, start: i64, stop: i64) -> Result<()> {
        reply::status(self.run(Command::new("LTRIM").arg(&self.key).arg(start).arg(stop))?)
    }

    fn range(&self, start: i64, stop: i64) -> Result<Vec<Value>> {
        reply::values(self.run(Command::new("LRANGE").arg(&self.key).arg(start).arg(stop))?)
    }
}

fn destination_key(destination: Option<&dyn Keyed>) -> Result<&str> {
    let destination = destination.ok_or(CollectionError::MissingDestination)?;
    let key = destination.key();
    if key.is_empty() {
        return Err(CollectionError::EmptyDestinationKey);
    }
    Ok(key)
}

fn wait_secs(timeout_secs: i64) -> Result<u64> {
    u64::try_from(timeout_secs).map_err(|_| CollectionError::NegativeTimeout(timeout_secs))
}
