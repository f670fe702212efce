//! # Remote Hash
//!
//! A field → value map stored under one key. Each method is a single store
//! command; a field either exists with one value or does not exist.

use std::fmt;

use redcol_client::{Command, ConnectionPool, Dispatch, RespValue, ToArg};

use crate::error::{CollectionError, Result};
use crate::keyed::Keyed;
use crate::reply;
use crate::value::Value;

/// Operations on a remote hash.
pub trait HashOps: Keyed {
    /// Deletes the whole hash. Returns true when something was deleted.
    fn clear(&self) -> Result<bool>;

    /// Deletes fields. Returns how many existed.
    fn dels<F: ToArg>(&self, fields: &[F]) -> Result<usize>;

    fn del<F: ToArg>(&self, field: F) -> Result<bool>;

    fn has<F: ToArg>(&self, field: F) -> Result<bool>;

    fn set<F: ToArg, V: ToArg>(&self, field: F, value: V) -> Result<()>;

    /// Writes only when `field` is absent. Returns whether it was written.
    fn set_nx<F: ToArg, V: ToArg>(&self, field: F, value: V) -> Result<bool>;

    /// Writes every pair in one command.
    fn sets<I, F, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg;

    fn get<F: ToArg>(&self, field: F) -> Result<Option<Value>>;

    /// Values for `fields`, positionally; missing fields are `None`.
    fn gets<F: ToArg>(&self, fields: &[F]) -> Result<Vec<Option<Value>>>;

    fn names(&self) -> Result<Vec<Value>>;

    fn values(&self) -> Result<Vec<Value>>;

    /// Every `(field, value)` pair in store order.
    fn pairs(&self) -> Result<Vec<(Value, Value)>>;

    fn count(&self) -> Result<usize>;

    /// Adds `amount` to an integer field (missing fields start at 0) and
    /// returns the new value. The store rejects non-integer fields.
    ///
    /// The total is the store's 64-bit integer whatever the width of
    /// `amount`: once the store has answered, the write is applied.
    fn inc_i32<F: ToArg>(&self, field: F, amount: i32) -> Result<i64>;

    fn inc_i64<F: ToArg>(&self, field: F, amount: i64) -> Result<i64>;

    /// An `amount` above `i64::MAX` is refused by the store unapplied.
    fn inc_u64<F: ToArg>(&self, field: F, amount: u64) -> Result<i64>;

    /// Adds `amount` to a float field and returns the new value.
    fn inc_f64<F: ToArg>(&self, field: F, amount: f64) -> Result<f64>;
}

/// Store-backed hash handle: a `(key, dispatcher)` binding with no local
/// state.
#[derive(Clone)]
pub struct RemoteHash<D = ConnectionPool> {
    key: String,
    dispatch: D,
}

impl<D: Dispatch> RemoteHash<D> {
    pub fn new(key: impl Into<String>, dispatch: D) -> Self {
        RemoteHash {
            key: key.into(),
            dispatch,
        }
    }

    fn run(&self, command: Command) -> Result<RespValue> {
        Ok(self.dispatch.dispatch(&command)?)
    }

    fn incr_by<F: ToArg>(&self, field: F, amount: impl ToArg) -> Result<i64> {
        reply::integer(self.run(Command::new("HINCRBY").arg(&self.key).arg(field).arg(amount))?)
    }
}

impl<D> Keyed for RemoteHash<D> {
    fn key(&self) -> &str {
        &self.key
    }
}

impl<D> fmt::Debug for RemoteHash<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHash").field("key", &self.key).finish()
    }
}

impl<D: Dispatch> HashOps for RemoteHash<D> {
    fn clear(&self) -> Result<bool> {
        reply::flag(self.run(Command::new("DEL").arg(&self.key))?)
    }

    fn dels<F: ToArg>(&self, fields: &[F]) -> Result<usize> {
        if fields.is_empty() {
            return Err(CollectionError::EmptyArguments { command: "HDEL" });
        }
        reply::count(self.run(Command::new("HDEL").arg(&self.key).args(fields))?)
    }

    fn del<F: ToArg>(&self, field: F) -> Result<bool> {
        reply::flag(self.run(Command::new("HDEL").arg(&self.key).arg(field))?)
    }

    fn has<F: ToArg>(&self, field: F) -> Result<bool> {
        reply::flag(self.run(Command::new("HEXISTS").arg(&self.key).arg(field))?)
    }

    fn set<F: ToArg, V: ToArg>(&self, field: F, value: V) -> Result<()> {
        reply::integer(self.run(Command::new("HSET").arg(&self.key).arg(field).arg(value))?)?;
        Ok(())
    }

    fn set_nx<F: ToArg, V: ToArg>(&self, field: F, value: V) -> Result<bool> {
        reply::flag(self.run(Command::new("HSETNX").arg(&self.key).arg(field).arg(value))?)
    }

    fn sets<I, F, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg,
    {
        let mut command = Command::new("HSET").arg(&self.key);
        let mut written = 0usize;
        for (field, value) in pairs {
            command = command.arg(field).arg(value);
            written += 1;
        }
        if written == 0 {
            return Err(CollectionError::EmptyArguments { command: "HSET" });
        }
        reply::integer(self.run(command)?)?;
        Ok(())
    }

    fn get<F: ToArg>(&self, field: F) -> Result<Option<Value>> {
        reply::optional(self.run(Command::new("HGET").arg(&self.key).arg(field))?)
    }

    fn gets<F: ToArg>(&self, fields: &[F]) -> Result<Vec<Option<Value>>> {
        if fields.is_empty() {
            return Err(CollectionError::EmptyArguments { command: "HMGET" });
        }
        reply::optional_values(self.run(Command::new("HMGET").arg(&self.key).args(fields))?)
    }

    fn names(&self) -> Result<Vec<Value>> {
        reply::values(self.run(Command::new("HKEYS").arg(&self.key))?)
    }

    fn values(&self) -> Result<Vec<Value>> {
        reply::values(self.run(Command::new("HVALS").arg(&self.key))?)
    }

    fn pairs(&self) -> Result<Vec<(Value, Value)>> {
        reply::pairs(self.run(Command::new("HGETALL").arg(&self.key))?)
    }

    fn count(&self) -> Result<usize> {
        reply::count(self.run(Command::new("HLEN").arg(&self.key))?)
    }

    fn inc_i32<F: ToArg>(&self, field: F, amount: i32) -> Result<i64> {
        self.incr_by(field, amount)
    }

    fn inc_i64<F: ToArg>(&self, field: F, amount: i64) -> Result<i64> {
        self.incr_by(field, amount)
    }

    fn inc_u64<F: ToArg>(&self, field: F, amount: u64) -> Result<i64> {
        self.incr_by(field, amount)
    }

    fn inc_f64<F: ToArg>(&self, field: F, amount: f64) -> Result<f64> {
        reply::float(self.run(Command::new("HINCRBYFLOAT").arg(&self.key).arg(field).arg(amount))?)
    }
}
