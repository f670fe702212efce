//! Scripted RESP2 server: accepts one connection and answers each command
//! with whatever the handler writes.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use redcol_client::{ConnectionPool, PoolConfig};

pub type Handler = fn(usize, Vec<Vec<u8>>, &mut TcpStream);

pub fn spawn_server(expected_commands: usize, handler: Handler) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        for idx in 0..expected_commands {
            let args = read_command(&mut reader).expect("read command");
            handler(idx, args, &mut stream);
        }
    });

    addr
}

pub fn pool_for(addr: String) -> ConnectionPool {
    ConnectionPool::new(PoolConfig {
        addr,
        max_idle: 1,
        max_active: 1,
        read_timeout: Some(Duration::from_millis(500)),
        write_timeout: Some(Duration::from_secs(1)),
        connect_timeout: Some(Duration::from_secs(1)),
        ..PoolConfig::default()
    })
}

/// Reads one command frame, rejecting lines and bulk payloads that are not
/// CRLF-terminated.
pub fn read_command<R: BufRead>(reader: &mut R) -> std::io::Result<Vec<Vec<u8>>> {
    let line = read_line(reader)?;
    let count = header(&line, b'*')?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let line = read_line(reader)?;
        let len = header(&line, b'$')?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data)?;
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf)?;
        if crlf != [b'\r', b'\n'] {
            return Err(invalid("missing crlf"));
        }
        args.push(data);
    }
    Ok(args)
}

fn read_line<R: BufRead>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(invalid("invalid line"));
    }
    buf.truncate(buf.len() - 2);
    Ok(buf)
}

fn header(line: &[u8], marker: u8) -> std::io::Result<usize> {
    if line.first() != Some(&marker) {
        return Err(invalid("unexpected marker"));
    }
    std::str::from_utf8(&line[1..])
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| invalid("bad length"))
}

fn invalid(reason: &'static str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, reason)
}

pub fn write_raw(stream: &mut TcpStream, raw: &[u8]) {
    let _ = stream.write_all(raw);
    let _ = stream.flush();
}

pub fn write_integer(stream: &mut TcpStream, value: i64) {
    write_raw(stream, format!(":{}\r\n", value).as_bytes());
}

pub fn write_bulk(stream: &mut TcpStream, data: &[u8]) {
    write_raw(stream, format!("${}\r\n", data.len()).as_bytes());
    write_raw(stream, data);
    write_raw(stream, b"\r\n");
}

pub fn words(args: &[Vec<u8>]) -> Vec<String> {
    args.iter().map(|a| String::from_utf8_lossy(a).into_owned()).collect()
}
