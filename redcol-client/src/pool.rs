//! # Connection Pool
//!
//! Purpose: Lend one TCP connection per store operation and take it back
//! afterwards, bounding how many connections exist and how long idle ones
//! are trusted.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Keep a bounded set of reusable connections.
//! 2. **Minimal Locking**: Hold the mutex only while moving idle connections.
//! 3. **Fail Fast**: Exceeding `max_active` returns an error immediately.
//! 4. **RAII Release**: `PooledConnection` gives the connection back on drop,
//!    so every exit path releases it; broken connections are discarded.
//! 5. **Validate Stale Connections**: Long-idle connections are PINGed
//!    before reuse and expired ones are closed.

use std::collections::VecDeque;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::config::PoolConfig;
use crate::error::{ClientError, ClientResult};
use crate::resp::{encode_command, read_response, RespValue};

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Connections parked in the pool.
    pub idle: usize,
    /// Connections alive, idle or lent out.
    pub active: usize,
}

struct IdleConnection {
    conn: Connection,
    since: Instant,
}

struct PoolState {
    idle: VecDeque<IdleConnection>,
    total: usize,
}

struct PoolInner {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

/// Connection pool handle. Clones share the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates a new connection pool. No connection is dialed until the
    /// first `acquire`.
    pub fn new(config: PoolConfig) -> Self {
        let state = PoolState {
            idle: VecDeque::with_capacity(config.max_idle),
            total: 0,
        };
        ConnectionPool {
            inner: Arc::new(PoolInner {
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Acquires a connection from the pool.
    ///
    /// Idle connections are reused most-recent first. A connection idle for
    /// longer than `probe_after` must answer PING before it is handed out.
    pub fn acquire(&self) -> ClientResult<PooledConnection> {
        while let Some(idle) = self.pop_idle() {
            let mut conn = idle.conn;
            if self.needs_probe(idle.since) {
                if let Err(err) = conn.ping() {
                    warn!(error = %err, "idle connection failed liveness probe");
                    self.release_slot();
                    continue;
                }
            }
            return Ok(PooledConnection::new(self.inner.clone(), conn));
        }

        if !self.try_reserve() {
            return Err(ClientError::PoolExhausted {
                max_active: self.inner.config.max_active,
            });
        }

        match Connection::connect(&self.inner.config) {
            Ok(conn) => {
                debug!(addr = %self.inner.config.addr, "dialed new connection");
                Ok(PooledConnection::new(self.inner.clone(), conn))
            }
            Err(err) => {
                self.release_slot();
                Err(err)
            }
        }
    }

    /// Current idle and active connection counts.
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            idle: state.idle.len(),
            active: state.total,
        }
    }

    fn pop_idle(&self) -> Option<IdleConnection> {
        let mut state = self.inner.state.lock();
        if let Some(limit) = self.inner.config.idle_timeout {
            let before = state.idle.len();
            state.idle.retain(|idle| idle.since.elapsed() < limit);
            let expired = before - state.idle.len();
            if expired > 0 {
                state.total = state.total.saturating_sub(expired);
                debug!(expired, "closed idle connections past idle timeout");
            }
        }
        state.idle.pop_back()
    }

    fn needs_probe(&self, since: Instant) -> bool {
        match self.inner.config.probe_after {
            Some(after) => since.elapsed() >= after,
            None => false,
        }
    }

    fn try_reserve(&self) -> bool {
        let mut state = self.inner.state.lock();
        let max_active = self.inner.config.max_active;
        if max_active != 0 && state.total >= max_active {
            return false;
        }
        state.total += 1;
        true
    }

    fn release_slot(&self) {
        let mut state = self.inner.state.lock();
        state.total = state.total.saturating_sub(1);
    }

    fn return_connection(&self, conn: Connection) {
        let mut state = self.inner.state.lock();
        if state.idle.len() < self.inner.config.max_idle {
            state.idle.push_back(IdleConnection {
                conn,
                since: Instant::now(),
            });
        } else {
            state.total = state.total.saturating_sub(1);
        }
    }
}

/// RAII wrapper returning a connection to the pool on drop.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    conn: Option<Connection>,
    valid: bool,
}

impl PooledConnection {
    fn new(pool: Arc<PoolInner>, conn: Connection) -> Self {
        PooledConnection {
            pool,
            conn: Some(conn),
            valid: true,
        }
    }

    /// Executes one command and returns the parsed reply.
    pub fn exec(&mut self, command: &Command) -> ClientResult<RespValue> {
        let conn = match self.conn.as_mut() {
            Some(conn) => conn,
            None => return Err(ClientError::Protocol("connection already released")),
        };
        trace!(command = command.name(), "dispatching");
        let response = conn.exec(command);
        if let Err(err) = &response {
            if !err.keeps_connection() {
                // IO/framing failures leave the stream out of sync.
                self.valid = false;
            }
        }
        response
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => return,
        };

        let pool = ConnectionPool {
            inner: self.pool.clone(),
        };

        if self.valid && !conn.broken {
            pool.return_connection(conn);
        } else {
            debug!("discarding connection after transport failure");
            pool.release_slot();
        }
    }
}

/// Single TCP connection with reusable buffers.
///
/// The buffers are stored on the connection to avoid per-call allocations.
struct Connection {
    // Buffered reader reduces syscalls while still allowing direct writes.
    reader: BufReader<TcpStream>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
    read_timeout: Option<Duration>,
    // Socket settings no longer match the pool's; close instead of reusing.
    broken: bool,
}

impl Connection {
    fn connect(config: &PoolConfig) -> ClientResult<Self> {
        let stream = connect_stream(config)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        // Disable Nagle to keep request latency low for small payloads.
        stream.set_nodelay(true)?;

        let mut conn = Connection {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
            read_timeout: config.read_timeout,
            broken: false,
        };

        if let Some(password) = &config.password {
            match conn.exec(&Command::new("AUTH").arg(password))? {
                RespValue::Simple(_) => {}
                RespValue::Error(message) => {
                    return Err(ClientError::Auth(
                        String::from_utf8_lossy(&message).into_owned(),
                    ))
                }
                other => return Err(ClientError::Auth(format!("unexpected {}", other.kind()))),
            }
        }

        if config.database != 0 {
            match conn.exec(&Command::new("SELECT").arg(config.database))? {
                RespValue::Simple(_) => {}
                RespValue::Error(message) => return Err(ClientError::server(&message)),
                other => {
                    return Err(ClientError::UnexpectedResponse {
                        expected: "simple string",
                        actual: other.kind(),
                    })
                }
            }
        }

        Ok(conn)
    }

    fn exec(&mut self, command: &Command) -> ClientResult<RespValue> {
        match command.blocking_wait() {
            Some(wait) => {
                // The store may legitimately hold the reply for `wait` seconds.
                let deadline = match (wait, self.read_timeout) {
                    (0, _) | (_, None) => None,
                    (secs, Some(base)) => Some(Duration::from_secs(secs) + base),
                };
                self.reader.get_ref().set_read_timeout(deadline)?;
                let response = self.round_trip(command);
                let restored = self.reader.get_ref().set_read_timeout(self.read_timeout);
                self.note_restore(restored);
                // The store has already acted on the command, so its reply wins.
                response
            }
            None => self.round_trip(command),
        }
    }

    fn round_trip(&mut self, command: &Command) -> ClientResult<RespValue> {
        self.write_buf.clear();
        encode_command(command.parts(), &mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        read_response(&mut self.reader, &mut self.line_buf)
    }

    fn note_restore(&mut self, restored: std::io::Result<()>) {
        if let Err(err) = restored {
            warn!(error = %err, "failed to restore read timeout after blocking command");
            self.broken = true;
        }
    }

    fn ping(&mut self) -> ClientResult<()> {
        match self.exec(&Command::new("PING"))? {
            RespValue::Simple(_) => Ok(()),
            RespValue::Error(message) => Err(ClientError::server(&message)),
            other => Err(ClientError::UnexpectedResponse {
                expected: "PONG",
                actual: other.kind(),
            }),
        }
    }
}

fn connect_stream(config: &PoolConfig) -> ClientResult<TcpStream> {
    let addr: SocketAddr = config
        .addr
        .to_socket_addrs()
        .map_err(|_| ClientError::InvalidAddress(config.addr.clone()))?
        .next()
        .ok_or_else(|| ClientError::InvalidAddress(config.addr.clone()))?;
    let stream = match config.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
        None => TcpStream::connect(addr)?,
    };
    Ok(stream)
}
