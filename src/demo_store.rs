//! In-memory demonstration backing store for the CLI. The real backing
//! store that a production server would read and write against — a
//! database, a live game-state service, whatever the embedding
//! application already owns — is out of scope for the core library
//! (spec.md §1, "actual entity store"); `DemoStore` is only enough to
//! drive the `ipcf` binary's `server`/`demo` subcommands end to end.

use std::sync::Arc;

use dashmap::DashMap;
use ipcf_core::{AttributeList, AttributeName, AttributeValue, GetCallback, RequestShape, SetCallback};

#[derive(Clone, Default)]
pub struct DemoStore {
    entries: Arc<DashMap<String, AttributeList>>,
}

impl DemoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate one subject's record, for `ipcf demo`'s walkthrough.
    pub fn seed(&self, subject: &str, name: AttributeName, value: AttributeValue) {
        self.entries.entry(subject.to_string()).or_default().set(name, value);
    }

    pub fn on_get(&self) -> GetCallback {
        let entries = Arc::clone(&self.entries);
        Arc::new(move |req| {
            let mut result = AttributeList::new();
            if let Some(record) = entries.get(req.subject()) {
                for name in req.want() {
                    if let Some(value) = record.get(*name) {
                        result.set(*name, value.clone());
                    }
                }
            }
            result
        })
    }

    pub fn on_set(&self) -> SetCallback {
        let entries = Arc::clone(&self.entries);
        Arc::new(move |req| {
            let mut record = entries.entry(req.subject().to_string()).or_default();
            for (name, value) in req.attributes().iter() {
                record.set(name, value.clone());
            }
            Ok(())
        })
    }
}
