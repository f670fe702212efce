//! # Reply Decoding
//!
//! Purpose: Turn a raw store reply into the result type an operation
//! declares.
//!
//! Store error replies become `ClientError::Server`. A reply of the wrong
//! type or shape becomes `ClientError::UnexpectedResponse`; it is never
//! coerced into a default.

use redcol_client::{ClientError, RespValue};

use crate::error::{CollectionError, Result};
use crate::value::Value;

fn unexpected(expected: &'static str, reply: &RespValue) -> CollectionError {
    ClientError::UnexpectedResponse {
        expected,
        actual: reply.kind(),
    }
    .into()
}

fn checked(reply: RespValue) -> Result<RespValue> {
    match reply {
        RespValue::Error(message) => Err(ClientError::server(&message).into()),
        other => Ok(other),
    }
}

/// `+OK` style acknowledgement.
pub(crate) fn status(reply: RespValue) -> Result<()> {
    match checked(reply)? {
        RespValue::Simple(_) => Ok(()),
        other => Err(unexpected("status", &other)),
    }
}

pub(crate) fn integer(reply: RespValue) -> Result<i64> {
    match checked(reply)? {
        RespValue::Integer(value) => Ok(value),
        other => Err(unexpected("integer", &other)),
    }
}

/// Non-negative integer such as a length or a removal count.
pub(crate) fn count(reply: RespValue) -> Result<usize> {
    match checked(reply)? {
        RespValue::Integer(value) if value >= 0 => Ok(value as usize),
        other => Err(unexpected("non-negative integer", &other)),
    }
}

/// 0/1 integer flag.
pub(crate) fn flag(reply: RespValue) -> Result<bool> {
    match checked(reply)? {
        RespValue::Integer(value) => Ok(value != 0),
        other => Err(unexpected("integer flag", &other)),
    }
}

/// Single value or absent.
pub(crate) fn optional(reply: RespValue) -> Result<Option<Value>> {
    match checked(reply)? {
        RespValue::Bulk(Some(data)) => Ok(Some(Value::from(data))),
        RespValue::Bulk(None) | RespValue::Array(None) => Ok(None),
        other => Err(unexpected("bulk string or nil", &other)),
    }
}

/// Bulk string parsed as a float, as HINCRBYFLOAT replies.
pub(crate) fn float(reply: RespValue) -> Result<f64> {
    match checked(reply)? {
        RespValue::Bulk(Some(data)) => Value::from(data).to_f64(),
        other => Err(unexpected("bulk string", &other)),
    }
}

/// Array of present values, in reply order. A null array reads as empty.
pub(crate) fn values(reply: RespValue) -> Result<Vec<Value>> {
    match checked(reply)? {
        RespValue::Array(Some(items)) => items
            .into_iter()
            .map(|item| match item {
                RespValue::Bulk(Some(data)) => Ok(Value::from(data)),
                other => Err(unexpected("bulk string element", &other)),
            })
            .collect(),
        RespValue::Array(None) => Ok(Vec::new()),
        other => Err(unexpected("array", &other)),
    }
}

/// Array whose elements may individually be nil, as HMGET replies.
pub(crate) fn optional_values(reply: RespValue) -> Result<Vec<Option<Value>>> {
    match checked(reply)? {
        RespValue::Array(Some(items)) => items.into_iter().map(optional).collect(),
        other => Err(unexpected("array", &other)),
    }
}

/// Flat `field, value, field, value, ...` array, as HGETALL replies.
pub(crate) fn pairs(reply: RespValue) -> Result<Vec<(Value, Value)>> {
    let flat = values(reply)?;
    if flat.len() % 2 != 0 {
        return Err(ClientError::UnexpectedResponse {
            expected: "even number of elements",
            actual: format!("array of {}", flat.len()),
        }
        .into());
    }
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((field, value));
    }
    Ok(pairs)
}

/// BLPOP/BRPOP reply: `(list name, value)` or null on timeout.
///
/// The list name echo is dropped; only the value is returned.
pub(crate) fn popped_pair(reply: RespValue) -> Result<Option<Value>> {
    match checked(reply)? {
        RespValue::Array(None) | RespValue::Bulk(None) => Ok(None),
        RespValue::Array(Some(mut items)) if items.len() == 2 && !items[0].is_null() => {
            match items.pop() {
                Some(RespValue::Bulk(Some(data))) => Ok(Some(Value::from(data))),
                Some(other) => Err(unexpected("bulk string value", &other)),
                None => Ok(None),
            }
        }
        other => Err(unexpected("two-element array or nil", &other)),
    }
}
