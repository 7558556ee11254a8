//! Role-scoped public facade (spec.md §4.8): composes the token
//! allocator, codec, buffers, worker loops and file I/O into the
//! `client_*`/`server_*` operations an embedding application calls.
//! `ClientManager` and `ServerManager` are deliberately separate types
//! rather than one type with an internal role tag — a process only ever
//! runs one role, and giving each its own buffer set makes "which
//! buffers exist for this role" a compile-time fact instead of a
//! runtime `Option` check.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::attribute::AttributeList;
use crate::buffer::Buffer;
use crate::codec;
use crate::error::IpcError;
use crate::fileio::{self, RequestKind};
use crate::logging;
use crate::request::{GetRequest, GetResponse, PendingGet, RequestShape, SetRequest};
use crate::token::{self, Rid};
use crate::worker::Worker;

pub type ResponseCallback = Arc<dyn Fn(Rid, AttributeList) + Send + Sync>;
pub type GetCallback = Arc<dyn Fn(&GetRequest) -> AttributeList + Send + Sync>;
pub type SetCallback = Arc<dyn Fn(&SetRequest) -> Result<(), IpcError> + Send + Sync>;

/// Public accessor to the token allocator (C1) for callers that want to
/// pre-compute a RID before constructing a request.
pub fn generate_request_id() -> Rid {
    token::next()
}

// ---- shared poll/flush helpers, used by both roles' worker ticks ----

fn flush_gets(buf: &Buffer<GetRequest>, dir: &Path) -> bool {
    buf.drain_with(|items| {
        if items.is_empty() {
            return true;
        }
        let rid = token::next();
        let body = codec::encode_get_batch(items);
        let name = fileio::unique_file_name(RequestKind::Get, rid);
        match fileio::write_atomic(dir, &name, &body) {
            Ok(_) => true,
            Err(e) => {
                logging::log_error(&format!("GET flush failed, batch dropped: {}", e));
                false
            }
        }
    })
}

fn flush_sets(buf: &Buffer<SetRequest>, dir: &Path) -> bool {
    buf.drain_with(|items| {
        if items.is_empty() {
            return true;
        }
        let rid = token::next();
        let body = codec::encode_set_batch(items);
        let name = fileio::unique_file_name(RequestKind::Set, rid);
        match fileio::write_atomic(dir, &name, &body) {
            Ok(_) => true,
            Err(e) => {
                logging::log_error(&format!("SET flush failed, batch dropped: {}", e));
                false
            }
        }
    })
}

fn flush_responses(buf: &Buffer<GetResponse>, dir: &Path) -> bool {
    buf.drain_with(|items| {
        if items.is_empty() {
            return true;
        }
        let rid = token::next();
        let body = codec::encode_get_response_batch(items);
        let name = fileio::unique_file_name(RequestKind::GetResponse, rid);
        match fileio::write_atomic(dir, &name, &body) {
            Ok(_) => true,
            Err(e) => {
                logging::log_error(&format!("GET_RESPONSE flush failed, batch dropped: {}", e));
                false
            }
        }
    })
}

/// One poll-tick pass over files of `kind`: list, read, decode, hand each
/// file's records to `dispatch`, delete on successful decode. A file
/// missing its footer is left untouched for the next tick (spec.md §7,
/// error kind 3); a read or list failure is logged and skipped likewise.
fn poll_files<T>(
    dir: &Path,
    kind: RequestKind,
    decode: impl Fn(&str) -> Result<Vec<T>, codec::DecodeError>,
    mut dispatch: impl FnMut(Vec<T>),
) {
    let files = match fileio::list_files(dir, kind) {
        Ok(files) => files,
        Err(e) => {
            logging::log_error(&format!("list_files failed: {}", e));
            return;
        }
    };
    for path in files {
        let body = match fileio::read_only(&path) {
            Ok(body) => body,
            Err(e) => {
                logging::log_error(&format!("read failed, retrying next tick: {}", e));
                continue;
            }
        };
        let records = match decode(&body) {
            Ok(records) => records,
            Err(_) => continue, // footer missing: peer mid-write, retry next tick
        };
        dispatch(records);
        if let Err(e) = fileio::delete(&path) {
            logging::log_error(&format!("failed to delete consumed file {}: {}", path.display(), e));
        }
    }
}

// ---- CLIENT ----

pub struct ClientManager {
    dir: PathBuf,
    get_buffer: Arc<Buffer<GetRequest>>,
    set_buffer: Arc<Buffer<SetRequest>>,
    pending: Arc<Buffer<PendingGet>>,
    workers: Vec<Worker>,
}

impl ClientManager {
    /// Allocate the client buffers and start the GET-flush, SET-flush,
    /// response-poll and pending-reaper loops (spec.md §4.8).
    pub fn init(dir: impl Into<PathBuf>, tick_rate: u64, buffer_max: usize, on_response: ResponseCallback) -> Self {
        let dir = dir.into();
        let get_buffer = Arc::new(Buffer::with_reserve(buffer_max));
        let set_buffer = Arc::new(Buffer::with_reserve(buffer_max));
        let pending = Arc::new(Buffer::with_reserve(buffer_max));
        let mut workers = Vec::with_capacity(4);

        workers.push({
            let dir = dir.clone();
            let buf = Arc::clone(&get_buffer);
            Worker::spawn(tick_rate, move || {
                flush_gets(&buf, &dir);
            })
        });

        workers.push({
            let dir = dir.clone();
            let buf = Arc::clone(&set_buffer);
            Worker::spawn(tick_rate, move || {
                flush_sets(&buf, &dir);
            })
        });

        workers.push({
            let dir = dir.clone();
            let pending = Arc::clone(&pending);
            Worker::spawn(tick_rate, move || {
                poll_files(&dir, RequestKind::GetResponse, codec::decode_get_response_file, |responses| {
                    for resp in responses {
                        let matched = pending.remove_first(|p| p.rid() == resp.rid());
                        if matched.is_some() {
                            on_response(resp.rid(), resp.attributes().clone());
                        }
                    }
                });
            })
        });

        // Pending-reaper: spec.md §9 leaves response-timeout policy as an
        // open question with no code in the original, so this loop has no
        // eviction behavior yet. It still runs as an owned thread so
        // shutdown's join-all story matches spec.md §4.8's four client loops.
        workers.push(Worker::spawn(tick_rate, || {}));

        ClientManager {
            dir,
            get_buffer,
            set_buffer,
            pending,
            workers,
        }
    }

    /// Stop all loops, waiting for each to report not-running, then clear
    /// every buffer. Any pending GET is abandoned without invoking its
    /// response callback (spec.md §4.9, state ABANDONED).
    pub fn shutdown(&mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
        self.get_buffer.clear();
        self.set_buffer.clear();
        self.pending.clear();
    }

    /// Reject if empty; otherwise push to the GET buffer and clone into
    /// the pending-GET buffer for later correlation.
    pub fn submit_get(&self, req: GetRequest) -> bool {
        if req.is_empty() {
            logging::log_error("refused empty GET on submit");
            return false;
        }
        let pending = PendingGet::new(req.clone());
        let pushed = self.get_buffer.push(req);
        if pushed {
            self.pending.push(pending);
        }
        pushed
    }

    pub fn submit_set(&self, req: SetRequest) -> bool {
        if req.is_empty() {
            logging::log_error("refused empty SET on submit");
            return false;
        }
        self.set_buffer.push(req)
    }

    pub fn flush_gets(&self) -> bool {
        flush_gets(&self.get_buffer, &self.dir)
    }

    pub fn flush_sets(&self) -> bool {
        flush_sets(&self.set_buffer, &self.dir)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ---- SERVER ----

pub struct ServerManager {
    dir: PathBuf,
    set_buffer: Arc<Buffer<SetRequest>>,
    response_buffer: Arc<Buffer<GetResponse>>,
    workers: Vec<Worker>,
}

impl ServerManager {
    /// Allocate the server's SET and outbound GET_RESPONSE buffers and
    /// start the SET-flush, GET-poll, SET-poll and response-flush loops.
    pub fn init(
        dir: impl Into<PathBuf>,
        tick_rate: u64,
        buffer_max: usize,
        on_get: GetCallback,
        on_set: SetCallback,
    ) -> Self {
        let dir = dir.into();
        let set_buffer = Arc::new(Buffer::with_reserve(buffer_max));
        let response_buffer = Arc::new(Buffer::with_reserve(buffer_max));
        let mut workers = Vec::with_capacity(4);

        workers.push({
            let dir = dir.clone();
            let buf = Arc::clone(&set_buffer);
            Worker::spawn(tick_rate, move || {
                flush_sets(&buf, &dir);
            })
        });

        workers.push({
            let dir = dir.clone();
            let response_buffer = Arc::clone(&response_buffer);
            let on_get = Arc::clone(&on_get);
            Worker::spawn(tick_rate, move || {
                poll_files(&dir, RequestKind::Get, codec::decode_get_file, |requests| {
                    for req in requests {
                        let attrs = on_get(&req);
                        response_buffer.push(GetResponse::new(req.subject(), req.rid(), attrs));
                    }
                });
            })
        });

        workers.push({
            let dir = dir.clone();
            let on_set = Arc::clone(&on_set);
            Worker::spawn(tick_rate, move || {
                poll_files(&dir, RequestKind::Set, codec::decode_set_file, |requests| {
                    for req in requests {
                        if let Err(e) = on_set(&req) {
                            logging::log_error(&format!("on_set failed for subject {}: {}", req.subject(), e));
                        }
                    }
                });
            })
        });

        workers.push({
            let dir = dir.clone();
            let response_buffer = Arc::clone(&response_buffer);
            Worker::spawn(tick_rate, move || {
                flush_responses(&response_buffer, &dir);
            })
        });

        ServerManager {
            dir,
            set_buffer,
            response_buffer,
            workers,
        }
    }

    pub fn shutdown(&mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
        self.set_buffer.clear();
        self.response_buffer.clear();
    }

    pub fn submit_set(&self, req: SetRequest) -> bool {
        if req.is_empty() {
            logging::log_error("refused empty SET on submit");
            return false;
        }
        self.set_buffer.push(req)
    }

    pub fn flush_sets(&self) -> bool {
        flush_sets(&self.set_buffer, &self.dir)
    }
}
