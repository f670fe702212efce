//! In-memory store double that speaks the same commands as the real store,
//! including blocking pops that park the caller on a condition variable.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use redcol_client::{ClientResult, Command, Dispatch, RespValue};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

enum Entry {
    List(VecDeque<Bytes>),
    // Insertion-ordered, like a small hash on the real store.
    Hash(Vec<(Bytes, Bytes)>),
}

#[derive(Default)]
pub struct MemoryStore {
    keys: Mutex<HashMap<String, Entry>>,
    pushed: Condvar,
    commands: AtomicUsize,
}

type Keys = HashMap<String, Entry>;

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of commands that reached the store.
    pub fn commands_seen(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    fn execute(&self, name: &str, args: &[Bytes], wait: Option<u64>) -> RespValue {
        let mut keys = self.keys.lock();
        match name {
            "DEL" => {
                let removed = args.iter().filter(|k| keys.remove(&key(k)).is_some()).count();
                int(removed as i64)
            }
            "LLEN" => match list_ref(&keys, &args[0]) {
                Ok(list) => int(list.map_or(0, |l| l.len()) as i64),
                Err(err) => err,
            },
            "LPUSH" | "RPUSH" => {
                let list = match list_mut(&mut keys, &args[0], true) {
                    Ok(list) => list.expect("created"),
                    Err(err) => return err,
                };
                for value in &args[1..] {
                    if name == "LPUSH" {
                        list.push_front(value.clone());
                    } else {
                        list.push_back(value.clone());
                    }
                }
                let len = list.len() as i64;
                drop(keys);
                self.pushed.notify_all();
                int(len)
            }
            "LPOP" => pop(&mut keys, &args[0], true).map_or_else(|e| e, bulk_or_nil),
            "RPOP" => pop(&mut keys, &args[0], false).map_or_else(|e| e, bulk_or_nil),
            "BLPOP" | "BRPOP" => {
                let front = name == "BLPOP";
                let deadline = deadline(wait);
                loop {
                    match pop(&mut keys, &args[0], front) {
                        Err(err) => return err,
                        Ok(Some(value)) => {
                            return RespValue::Array(Some(vec![
                                RespValue::Bulk(Some(args[0].to_vec())),
                                RespValue::Bulk(Some(value.to_vec())),
                            ]))
                        }
                        Ok(None) => {}
                    }
                    if !self.park(&mut keys, deadline) {
                        return RespValue::Array(None);
                    }
                }
            }
            "RPOPLPUSH" => transfer(&mut keys, &args[0], &args[1]).map_or_else(|e| e, bulk_or_nil),
            "BRPOPLPUSH" => {
                let deadline = deadline(wait);
                loop {
                    match transfer(&mut keys, &args[0], &args[1]) {
                        Err(err) => return err,
                        Ok(Some(value)) => {
                            drop(keys);
                            self.pushed.notify_all();
                            return RespValue::Bulk(Some(value.to_vec()));
                        }
                        Ok(None) => {}
                    }
                    if !self.park(&mut keys, deadline) {
                        return RespValue::Array(None);
                    }
                }
            }
            "LINDEX" => match list_ref(&keys, &args[0]) {
                Ok(list) => {
                    let list = match list {
                        Some(list) => list,
                        None => return RespValue::Bulk(None),
                    };
                    match resolve_index(list.len(), parse_i64(&args[1])) {
                        Some(idx) => RespValue::Bulk(Some(list[idx].to_vec())),
                        None => RespValue::Bulk(None),
                    }
                }
                Err(err) => err,
            },
            "LSET" => match list_mut(&mut keys, &args[0], false) {
                Ok(Some(list)) => match resolve_index(list.len(), parse_i64(&args[1])) {
                    Some(idx) => {
                        list[idx] = args[2].clone();
                        ok()
                    }
                    None => error("ERR index out of range"),
                },
                Ok(None) => error("ERR no such key"),
                Err(err) => err,
            },
            "LREM" => {
                let list = match list_mut(&mut keys, &args[0], false) {
                    Ok(Some(list)) => list,
                    Ok(None) => return int(0),
                    Err(err) => return err,
                };
                let before = list.len();
                list.retain(|item| item != &args[2]);
                let removed = before - list.len();
                drop_if_empty(&mut keys, &args[0]);
                int(removed as i64)
            }
            "LRANGE" => match list_ref(&keys, &args[0]) {
                Ok(Some(list)) => {
                    let range = resolve_range(list.len(), parse_i64(&args[1]), parse_i64(&args[2]));
                    let items = range
                        .map(|r| {
                            r.map(|idx| RespValue::Bulk(Some(list[idx].to_vec())))
                                .collect::<Vec<_>>()
                        })
                        .unwrap_or_default();
                    RespValue::Array(Some(items))
                }
                Ok(None) => RespValue::Array(Some(Vec::new())),
                Err(err) => err,
            },
            "LTRIM" => {
                let list = match list_mut(&mut keys, &args[0], false) {
                    Ok(Some(list)) => list,
                    Ok(None) => return ok(),
                    Err(err) => return err,
                };
                match resolve_range(list.len(), parse_i64(&args[1]), parse_i64(&args[2])) {
                    Some(range) => {
                        let kept: VecDeque<Bytes> = range.map(|idx| list[idx].clone()).collect();
                        *list = kept;
                    }
                    None => list.clear(),
                }
                drop_if_empty(&mut keys, &args[0]);
                ok()
            }
            "HSET" | "HSETNX" => {
                let hash = match hash_mut(&mut keys, &args[0], true) {
                    Ok(hash) => hash.expect("created"),
                    Err(err) => return err,
                };
                let mut added = 0;
                for pair in args[1..].chunks(2) {
                    match hash.iter().position(|(f, _)| f == &pair[0]) {
                        Some(_) if name == "HSETNX" => {}
                        Some(idx) => hash[idx].1 = pair[1].clone(),
                        None => {
                            hash.push((pair[0].clone(), pair[1].clone()));
                            added += 1;
                        }
                    }
                }
                int(added)
            }
            "HGET" => match hash_ref(&keys, &args[0]) {
                Ok(hash) => bulk_or_nil(hash.and_then(|h| field(h, &args[1]))),
                Err(err) => err,
            },
            "HMGET" => match hash_ref(&keys, &args[0]) {
                Ok(hash) => RespValue::Array(Some(
                    args[1..]
                        .iter()
                        .map(|f| bulk_or_nil(hash.and_then(|h| field(h, f))))
                        .collect(),
                )),
                Err(err) => err,
            },
            "HDEL" => {
                let hash = match hash_mut(&mut keys, &args[0], false) {
                    Ok(Some(hash)) => hash,
                    Ok(None) => return int(0),
                    Err(err) => return err,
                };
                let before = hash.len();
                hash.retain(|(f, _)| !args[1..].contains(f));
                let removed = before - hash.len();
                drop_if_empty(&mut keys, &args[0]);
                int(removed as i64)
            }
            "HEXISTS" => match hash_ref(&keys, &args[0]) {
                Ok(hash) => int(hash.and_then(|h| field(h, &args[1])).is_some() as i64),
                Err(err) => err,
            },
            "HLEN" => match hash_ref(&keys, &args[0]) {
                Ok(hash) => int(hash.map_or(0, |h| h.len()) as i64),
                Err(err) => err,
            },
            "HKEYS" | "HVALS" | "HGETALL" => match hash_ref(&keys, &args[0]) {
                Ok(hash) => {
                    let mut items = Vec::new();
                    for (f, v) in hash.into_iter().flatten() {
                        if name != "HVALS" {
                            items.push(RespValue::Bulk(Some(f.to_vec())));
                        }
                        if name != "HKEYS" {
                            items.push(RespValue::Bulk(Some(v.to_vec())));
                        }
                    }
                    RespValue::Array(Some(items))
                }
                Err(err) => err,
            },
            "HINCRBY" => {
                if args.len() != 3 {
                    return error("ERR wrong number of arguments for 'hincrby' command");
                }
                let amount = match text(&args[2]).parse::<i64>() {
                    Ok(amount) => amount,
                    Err(_) => return error("ERR value is not an integer or out of range"),
                };
                let hash = match hash_mut(&mut keys, &args[0], true) {
                    Ok(hash) => hash.expect("created"),
                    Err(err) => return err,
                };
                let current = match field(hash, &args[1]) {
                    Some(value) => match text(&value).parse::<i64>() {
                        Ok(current) => current,
                        Err(_) => return error("ERR hash value is not an integer"),
                    },
                    None => 0,
                };
                let total = match current.checked_add(amount) {
                    Some(total) => total,
                    None => return error("ERR increment or decrement would overflow"),
                };
                put_field(hash, &args[1], Bytes::from(total.to_string()));
                int(total)
            }
            "HINCRBYFLOAT" => {
                let amount = match text(&args[2]).parse::<f64>() {
                    Ok(amount) => amount,
                    Err(_) => return error("ERR value is not a valid float"),
                };
                let hash = match hash_mut(&mut keys, &args[0], true) {
                    Ok(hash) => hash.expect("created"),
                    Err(err) => return err,
                };
                let current = match field(hash, &args[1]) {
                    Some(value) => match text(&value).parse::<f64>() {
                        Ok(current) => current,
                        Err(_) => return error("ERR hash value is not a float"),
                    },
                    None => 0.0,
                };
                let total = Bytes::from((current + amount).to_string());
                put_field(hash, &args[1], total.clone());
                RespValue::Bulk(Some(total.to_vec()))
            }
            other => error(&format!("ERR unknown command '{}'", other)),
        }
    }

    /// Waits for a push. Returns false once the deadline has passed.
    fn park(&self, keys: &mut parking_lot::MutexGuard<'_, Keys>, deadline: Option<Instant>) -> bool {
        match deadline {
            None => {
                self.pushed.wait(keys);
                true
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                self.pushed.wait_for(keys, deadline - now);
                true
            }
        }
    }
}

impl Dispatch for MemoryStore {
    fn dispatch(&self, command: &Command) -> ClientResult<RespValue> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        let args = command.args_slice();
        // The blocking variants carry their timeout as the last argument.
        let args = match command.blocking_wait() {
            Some(_) => &args[..args.len() - 1],
            None => args,
        };
        Ok(self.execute(command.name(), args, command.blocking_wait()))
    }
}

fn deadline(wait: Option<u64>) -> Option<Instant> {
    match wait {
        Some(0) | None => None,
        Some(secs) => Some(Instant::now() + Duration::from_secs(secs)),
    }
}

fn key(raw: &Bytes) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn text(raw: &Bytes) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn parse_i64(raw: &Bytes) -> i64 {
    text(raw).parse().unwrap_or(0)
}

fn int(value: i64) -> RespValue {
    RespValue::Integer(value)
}

fn ok() -> RespValue {
    RespValue::Simple(b"OK".to_vec())
}

fn error(message: &str) -> RespValue {
    RespValue::Error(message.as_bytes().to_vec())
}

fn bulk_or_nil(value: Option<Bytes>) -> RespValue {
    RespValue::Bulk(value.map(|v| v.to_vec()))
}

fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { index + len } else { index };
    if idx < 0 || idx >= len {
        None
    } else {
        Some(idx as usize)
    }
}

fn resolve_range(len: usize, start: i64, stop: i64) -> Option<std::ops::RangeInclusive<usize>> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if start > stop || start >= len {
        None
    } else {
        Some(start as usize..=stop as usize)
    }
}

fn list_ref<'a>(keys: &'a Keys, raw: &Bytes) -> Result<Option<&'a VecDeque<Bytes>>, RespValue> {
    match keys.get(&key(raw)) {
        None => Ok(None),
        Some(Entry::List(list)) => Ok(Some(list)),
        Some(_) => Err(error(WRONGTYPE)),
    }
}

fn list_mut<'a>(
    keys: &'a mut Keys,
    raw: &Bytes,
    create: bool,
) -> Result<Option<&'a mut VecDeque<Bytes>>, RespValue> {
    let name = key(raw);
    if create && !keys.contains_key(&name) {
        keys.insert(name.clone(), Entry::List(VecDeque::new()));
    }
    match keys.get_mut(&name) {
        None => Ok(None),
        Some(Entry::List(list)) => Ok(Some(list)),
        Some(_) => Err(error(WRONGTYPE)),
    }
}

fn hash_ref<'a>(keys: &'a Keys, raw: &Bytes) -> Result<Option<&'a Vec<(Bytes, Bytes)>>, RespValue> {
    match keys.get(&key(raw)) {
        None => Ok(None),
        Some(Entry::Hash(hash)) => Ok(Some(hash)),
        Some(_) => Err(error(WRONGTYPE)),
    }
}

fn hash_mut<'a>(
    keys: &'a mut Keys,
    raw: &Bytes,
    create: bool,
) -> Result<Option<&'a mut Vec<(Bytes, Bytes)>>, RespValue> {
    let name = key(raw);
    if create && !keys.contains_key(&name) {
        keys.insert(name.clone(), Entry::Hash(Vec::new()));
    }
    match keys.get_mut(&name) {
        None => Ok(None),
        Some(Entry::Hash(hash)) => Ok(Some(hash)),
        Some(_) => Err(error(WRONGTYPE)),
    }
}

fn field(hash: &[(Bytes, Bytes)], name: &Bytes) -> Option<Bytes> {
    hash.iter().find(|(f, _)| f == name).map(|(_, v)| v.clone())
}

fn put_field(hash: &mut Vec<(Bytes, Bytes)>, name: &Bytes, value: Bytes) {
    match hash.iter().position(|(f, _)| f == name) {
        Some(idx) => hash[idx].1 = value,
        None => hash.push((name.clone(), value)),
    }
}

fn drop_if_empty(keys: &mut Keys, raw: &Bytes) {
    let name = key(raw);
    let empty = match keys.get(&name) {
        Some(Entry::List(list)) => list.is_empty(),
        Some(Entry::Hash(hash)) => hash.is_empty(),
        None => false,
    };
    if empty {
        keys.remove(&name);
    }
}

fn pop(keys: &mut Keys, raw: &Bytes, front: bool) -> Result<Option<Bytes>, RespValue> {
    let list = match list_mut(keys, raw, false)? {
        Some(list) => list,
        None => return Ok(None),
    };
    let value = if front { list.pop_front() } else { list.pop_back() };
    drop_if_empty(keys, raw);
    Ok(value)
}

fn transfer(keys: &mut Keys, src: &Bytes, dst: &Bytes) -> Result<Option<Bytes>, RespValue> {
    // Type-check the destination before touching the source.
    list_ref(keys, dst)?;
    let value = match pop(keys, src, false)? {
        Some(value) => value,
        None => return Ok(None),
    };
    let list = list_mut(keys, dst, true)?.expect("created");
    list.push_front(value.clone());
    Ok(Some(value))
}
