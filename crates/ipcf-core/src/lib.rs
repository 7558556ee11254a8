//! Core library for a file-mediated request/response exchange between a
//! client and a server process that share no memory (see each module's
//! doc comment for the piece of the design it covers).

pub mod attribute;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod fileio;
pub mod logging;
pub mod manager;
pub mod request;
pub mod spinlock;
pub mod token;
pub mod worker;

pub use attribute::{AttributeList, AttributeName, AttributeValue};
pub use buffer::Buffer;
pub use config::{load_config, Config};
pub use error::IpcError;
pub use fileio::{FILE_EXTENSION, FOOTER};
pub use manager::{generate_request_id, ClientManager, GetCallback, ResponseCallback, ServerManager, SetCallback};
pub use request::{GetRequest, GetResponse, PendingGet, RequestShape, SetRequest};
pub use spinlock::{BackoffMode, SpinLock};
pub use token::Rid;
pub use worker::Worker;
