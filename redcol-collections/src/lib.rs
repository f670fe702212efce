//! # Redcol Typed Collections
//!
//! Purpose: Strongly-typed handles for a remote hash and a remote
//! double-ended list, each bound to one store key and one connection pool.
//!
//! ## Design Principles
//! 1. **Handles Are Bindings**: `RemoteList`/`RemoteHash` hold only a key and
//!    a dispatcher; creating or dropping one never touches the store.
//! 2. **Capability Traits**: `ListOps`/`HashOps` describe the operations so a
//!    test double can stand in for the store-backed types.
//! 3. **Opaque Values**: Stored data is bytes; callers decode explicitly.
//! 4. **Injected Pool**: The pool is passed to each handle, never global.
//!
//! ```ignore
//! use redcol_client::{ConnectionPool, PoolConfig};
//! use redcol_collections::{ListOps, RemoteList};
//!
//! let pool = ConnectionPool::new(PoolConfig::with_addr("127.0.0.1:6379"));
//! let jobs = RemoteList::new("jobs", pool.clone());
//! let running = RemoteList::new("jobs:running", pool);
//! jobs.push_back(&["job-1"])?;
//! let claimed = jobs.pop_back_to_front_wait(Some(&running), 5)?;
//! ```

mod error;
mod hash;
mod keyed;
mod list;
mod reply;
mod value;

pub use error::{CollectionError, Result};
pub use hash::{HashOps, RemoteHash};
pub use keyed::Keyed;
pub use list::{ListOps, RemoteList};
pub use value::Value;
