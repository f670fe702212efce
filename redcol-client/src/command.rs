//! # Command Builder
//!
//! Purpose: Assemble one store command as an ordered list of binary-safe
//! arguments: the command name, the key, then operation arguments.
//!
//! ## Design Principles
//! 1. **One Command Per Operation**: Callers build exactly one `Command`
//!    and hand it to a [`Dispatch`](crate::Dispatch) implementation.
//! 2. **Flatten In Call Order**: Variadic values are appended as given.
//! 3. **Explicit Blocking**: Commands that may park the connection carry
//!    their wait so the transport can size its read deadline.

use bytes::Bytes;

/// Types that can be encoded as a single command argument.
pub trait ToArg {
    /// Encodes this value as a RESP bulk string argument.
    fn to_arg(&self) -> Bytes;
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

impl ToArg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl<const N: usize> ToArg for [u8; N] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

macro_rules! display_arg {
    ($($ty:ty),*) => {
        $(
            impl ToArg for $ty {
                fn to_arg(&self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

display_arg!(i32, i64, u32, u64, usize, f64);

/// A single store command: name followed by ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    parts: Vec<Bytes>,
    wait_secs: Option<u64>,
}

impl Command {
    /// Starts a command with the given name.
    pub fn new(name: &'static str) -> Self {
        Command {
            parts: vec![Bytes::from_static(name.as_bytes())],
            wait_secs: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, value: impl ToArg) -> Self {
        self.parts.push(value.to_arg());
        self
    }

    /// Appends every value in order.
    pub fn args<V: ToArg>(mut self, values: &[V]) -> Self {
        self.parts.extend(values.iter().map(ToArg::to_arg));
        self
    }

    /// Appends the server-side timeout (whole seconds, 0 = forever) and
    /// marks the command as one that may suspend the connection.
    pub fn blocking_timeout(mut self, secs: u64) -> Self {
        self.parts.push(secs.to_arg());
        self.wait_secs = Some(secs);
        self
    }

    /// Command name as sent on the wire.
    pub fn name(&self) -> &str {
        std::str::from_utf8(&self.parts[0]).unwrap_or("?")
    }

    /// Name followed by every argument.
    pub fn parts(&self) -> &[Bytes] {
        &self.parts
    }

    /// Arguments after the command name.
    pub fn args_slice(&self) -> &[Bytes] {
        &self.parts[1..]
    }

    /// Server-side wait in seconds for blocking commands.
    pub fn blocking_wait(&self) -> Option<u64> {
        self.wait_secs
    }
}
