//! # Redcol Pooled Client
//!
//! Purpose: Provide a lightweight, synchronous Redis-compatible transport
//! with connection pooling for the typed collection handles.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Reuse TCP connections to avoid repeated connects.
//! 2. **One Command Per Borrow**: Each dispatch borrows a connection, runs one
//!    command and gives the connection back.
//! 3. **Minimal Allocation**: Reuse buffers for RESP framing and parsing.
//! 4. **Protocol Clarity**: Encode/parse RESP2 explicitly for correctness.

mod command;
mod config;
mod dispatch;
mod error;
mod pool;
mod resp;

pub use command::{Command, ToArg};
pub use config::PoolConfig;
pub use dispatch::Dispatch;
pub use error::{ClientError, ClientResult};
pub use pool::{ConnectionPool, PoolStats, PooledConnection};
pub use resp::{encode_command, read_response, RespValue};
