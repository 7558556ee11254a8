//! Atomic whole-file writes and directory scanning (spec.md §4.7).
//!
//! `write_atomic` strengthens the original's direct `fopen(..., "w")` +
//! `fputs` + `fclose` into the temp-file-then-rename idiom used throughout
//! the teacher's content-addressable store
//! (`examples/bhuvanprakash-jhol/crates/jhol-core/src/cas/cas.rs`): write
//! the full body to a sibling `.tmp` path, `sync_all`, then `fs::rename`
//! into place. A reader polling the directory never observes a
//! partially-written file under this scheme, which is what spec.md's
//! footer-gated "file complete" sentinel is there to guard against in the
//! first place — the rename makes that guard belt-and-braces rather than
//! the sole protection.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, Timelike};

use crate::error::IpcError;
use crate::token::Rid;

pub const FILE_EXTENSION: &str = "ipcf";
pub const FOOTER: &str = "EOF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get,
    GetResponse,
    Set,
}

impl RequestKind {
    fn prefix(&self) -> &'static str {
        match self {
            RequestKind::Get => "GET",
            RequestKind::GetResponse => "GETRESPONSE",
            RequestKind::Set => "SET",
        }
    }
}

/// Build `<REQ>#<RID>#<HH-MM-SS>.ipcf`. The RID component guarantees
/// uniqueness; the time component is advisory only (diagnostics, not
/// parsing).
pub fn unique_file_name(kind: RequestKind, rid: Rid) -> String {
    let now = Local::now();
    format!(
        "{}#{}#{:02}-{:02}-{:02}.{}",
        kind.prefix(),
        rid,
        now.hour(),
        now.minute(),
        now.second(),
        FILE_EXTENSION
    )
}

/// Write `body` to `dir/<name>` so that it appears whole to any reader
/// that checks for the `"EOF"` footer before parsing. Durability beyond
/// close is out of scope (spec.md §1).
pub fn write_atomic(dir: &Path, name: &str, body: &str) -> Result<PathBuf, IpcError> {
    let final_path = dir.join(name);
    let tmp_path = dir.join(format!("{}.tmp-{}", name, tmp_suffix()));

    let mut file = fs::File::create(&tmp_path).map_err(|e| {
        IpcError::io("write_atomic:create", Some(tmp_path.display().to_string()), e)
    })?;
    use std::io::Write;
    file.write_all(body.as_bytes()).map_err(|e| {
        IpcError::io("write_atomic:write", Some(tmp_path.display().to_string()), e)
    })?;
    file.sync_all().map_err(|e| {
        IpcError::io("write_atomic:sync", Some(tmp_path.display().to_string()), e)
    })?;
    drop(file);

    fs::rename(&tmp_path, &final_path).map_err(|e| {
        IpcError::io("write_atomic:rename", Some(final_path.display().to_string()), e)
    })?;

    Ok(final_path)
}

fn tmp_suffix() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// Enumerate regular files in `dir` whose name starts with `kind`'s
/// prefix (e.g. `"GET#"`), so pollers only see their own request type.
pub fn list_files(dir: &Path, kind: RequestKind) -> Result<Vec<PathBuf>, IpcError> {
    let prefix = format!("{}#", kind.prefix());
    let entries = fs::read_dir(dir).map_err(|e| {
        IpcError::io("list_files", Some(dir.display().to_string()), e)
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IpcError::io("list_files:entry", Some(dir.display().to_string()), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.starts_with(&prefix) {
                out.push(path);
            }
        }
    }
    Ok(out)
}

/// Read a file fully and delete it. Used once the codec has decoded it.
pub fn read_and_delete(path: &Path) -> Result<String, IpcError> {
    let body = fs::read_to_string(path).map_err(|e| {
        IpcError::io("read_and_delete:read", Some(path.display().to_string()), e)
    })?;
    fs::remove_file(path).map_err(|e| {
        IpcError::io("read_and_delete:remove", Some(path.display().to_string()), e)
    })?;
    Ok(body)
}

pub fn read_only(path: &Path) -> Result<String, IpcError> {
    fs::read_to_string(path).map_err(|e| {
        IpcError::io("read_only", Some(path.display().to_string()), e)
    })
}

pub fn delete(path: &Path) -> Result<(), IpcError> {
    fs::remove_file(path).map_err(|e| {
        IpcError::io("delete", Some(path.display().to_string()), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_produces_readable_whole_file() {
        let dir = tempdir().unwrap();
        let path = write_atomic(dir.path(), "GET#1#00-00-00.ipcf", "1-XYZ,PlayerName,\nEOF").unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.ends_with(FOOTER));
    }

    #[test]
    fn write_atomic_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        write_atomic(dir.path(), "SET#2#00-00-00.ipcf", "EOF").unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn list_files_filters_by_request_kind_prefix() {
        let dir = tempdir().unwrap();
        write_atomic(dir.path(), "GET#1#00-00-00.ipcf", "EOF").unwrap();
        write_atomic(dir.path(), "SET#2#00-00-00.ipcf", "EOF").unwrap();
        let gets = list_files(dir.path(), RequestKind::Get).unwrap();
        assert_eq!(gets.len(), 1);
        assert!(gets[0].file_name().unwrap().to_str().unwrap().starts_with("GET#"));
    }

    #[test]
    fn unique_file_name_embeds_prefix_and_rid() {
        let name = unique_file_name(RequestKind::GetResponse, Rid::from(9));
        assert!(name.starts_with("GETRESPONSE#9#"));
        assert!(name.ends_with(".ipcf"));
    }

    #[test]
    fn read_and_delete_removes_the_file() {
        let dir = tempdir().unwrap();
        let path = write_atomic(dir.path(), "SET#3#00-00-00.ipcf", "EOF").unwrap();
        let body = read_and_delete(&path).unwrap();
        assert_eq!(body, "EOF");
        assert!(!path.exists());
    }
}
