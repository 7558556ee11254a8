//! Error type for the ipcf core's I/O boundary.
//!
//! Nothing in this crate is fatal to the manager (spec.md §7): every
//! failure mode here is surfaced as a `Result` or logged and retried on
//! the next worker tick, never propagated as a panic across the public
//! boundary. Codec parse failures have their own narrower
//! `codec::DecodeError` (the only thing a decoder can report is "footer
//! missing, retry next tick" — a malformed line is silently dropped per
//! spec.md §7 kind 4, not an error value); a submission-invalid request
//! is reported as a plain `bool` return from `submit_get`/`submit_set`,
//! exactly as spec.md §7 kind 1 specifies. `IpcError` covers what's left:
//! the write/read/list failures spec.md §7 calls "I/O transient".

#[derive(Debug, Clone)]
pub enum IpcError {
    /// A file write, read, or directory listing failed.
    Io {
        operation: String,
        path: Option<String>,
        source: String,
    },
}

impl std::fmt::Display for IpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpcError::Io { operation, path, source } => {
                write!(f, "I/O error in {}: {}", operation, source)?;
                if let Some(path) = path {
                    write!(f, " (path: {})", path)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for IpcError {}

impl IpcError {
    pub fn io(operation: impl Into<String>, path: Option<String>, source: impl std::fmt::Display) -> Self {
        IpcError::Io {
            operation: operation.into(),
            path,
            source: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_when_present() {
        let err = IpcError::io("write_atomic", Some("/tmp/x.ipcf".to_string()), "disk full");
        let rendered = err.to_string();
        assert!(rendered.contains("write_atomic"));
        assert!(rendered.contains("/tmp/x.ipcf"));
    }

    #[test]
    fn display_omits_path_when_absent() {
        let err = IpcError::io("list_files", None, "permission denied");
        let rendered = err.to_string();
        assert!(rendered.contains("list_files"));
        assert!(!rendered.contains("path:"));
    }
}
