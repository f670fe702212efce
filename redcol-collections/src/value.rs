//! # Stored Values
//!
//! Values are opaque byte strings. Typed views are requested explicitly and
//! a value that does not parse is a `CollectionError::Decode`, never a zero.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use redcol_client::ToArg;

use crate::error::{CollectionError, Result};

/// An opaque value read from a hash field or list element.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(Bytes);

impl Value {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the value as UTF-8 text.
    pub fn to_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.0).map_err(|err| CollectionError::Decode {
            expected: "utf-8 string",
            reason: err.to_string(),
        })
    }

    pub fn into_string(self) -> Result<String> {
        self.to_str().map(str::to_owned)
    }

    pub fn to_i64(&self) -> Result<i64> {
        self.parse("i64")
    }

    pub fn to_u64(&self) -> Result<u64> {
        self.parse("u64")
    }

    pub fn to_f64(&self) -> Result<f64> {
        self.parse("f64")
    }

    fn parse<T>(&self, expected: &'static str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let text = std::str::from_utf8(&self.0).map_err(|err| CollectionError::Decode {
            expected,
            reason: err.to_string(),
        })?;
        text.parse().map_err(|err: T::Err| CollectionError::Decode {
            expected,
            reason: format!("{:?}: {}", text, err),
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => write!(f, "Value({:?})", text),
            Err(_) => write!(f, "Value(<{} bytes>)", self.0.len()),
        }
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value(Bytes::from(bytes))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value(Bytes::from(text))
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<[u8]> for Value {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl ToArg for Value {
    fn to_arg(&self) -> Bytes {
        self.0.clone()
    }
}
