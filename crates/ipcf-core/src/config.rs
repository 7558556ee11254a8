//! Optional `.ipcfrc` (JSON) config, merged with environment variables,
//! in the style of the teacher's `config::load_config` (`.jholrc`).
//! Missing or invalid file falls back to the documented defaults: the
//! role's shared directory, `TICK_RATE = 8` (spec.md §4.6) and
//! `BUFFER_MAX = 65536` (spec.md §4.5).

use std::path::{Path, PathBuf};

use crate::buffer::BUFFER_MAX;
use crate::worker::DEFAULT_TICK_RATE;

#[derive(Debug, Clone)]
pub struct Config {
    pub shared_dir: PathBuf,
    pub tick_rate: u64,
    pub buffer_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shared_dir: default_shared_dir(),
            tick_rate: DEFAULT_TICK_RATE,
            buffer_max: BUFFER_MAX,
        }
    }
}

/// Fallback shared directory when neither a config file, `IPCF_DIR`, nor
/// an explicit CLI flag names one: a subdirectory of the user's local
/// data directory, resolved the way the teacher resolves its cache
/// directory (`dirs::cache_dir()` in `global_cache.rs`).
fn default_shared_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ipcf")
}

/// Load config from `.ipcfrc` in `dir`, then in the home directory, then
/// apply `IPCF_DIR` / `IPCF_TICK_RATE` / `IPCF_BUFFER_MAX` environment
/// overrides on top. CLI flags in the binary override all of this again.
pub fn load_config(dir: &Path) -> Config {
    let mut cfg = Config::default();

    let candidates = [
        dir.join(".ipcfrc"),
        dirs::home_dir().unwrap_or_else(|| dir.to_path_buf()).join(".ipcfrc"),
    ];
    for path in &candidates {
        if path.is_file() {
            if let Ok(text) = std::fs::read_to_string(path) {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                    apply_json(&mut cfg, &value);
                }
            }
            break;
        }
    }

    if let Ok(dir) = std::env::var("IPCF_DIR") {
        cfg.shared_dir = PathBuf::from(dir);
    }
    if let Ok(rate) = std::env::var("IPCF_TICK_RATE") {
        if let Ok(parsed) = rate.parse() {
            cfg.tick_rate = parsed;
        }
    }
    if let Ok(max) = std::env::var("IPCF_BUFFER_MAX") {
        if let Ok(parsed) = max.parse() {
            cfg.buffer_max = parsed;
        }
    }

    cfg
}

fn apply_json(cfg: &mut Config, value: &serde_json::Value) {
    if let Some(dir) = value.get("sharedDir").and_then(|v| v.as_str()) {
        cfg.shared_dir = PathBuf::from(dir);
    }
    if let Some(rate) = value.get("tickRate").and_then(|v| v.as_u64()) {
        cfg.tick_rate = rate;
    }
    if let Some(max) = value.get("bufferMax").and_then(|v| v.as_u64()) {
        cfg.buffer_max = max as usize;
    }
}
