//! Minimal timestamped logger, in the style of the teacher's
//! `utils::log`/`utils::log_error`: no external logging framework, just
//! local-time-prefixed lines printed to stderr, silenced by the
//! `IPCF_QUIET` environment variable (mirrors the teacher's
//! `JHOL_QUIET`). Worker ticks call these on I/O-transient and
//! parse-incomplete conditions (spec.md §7) rather than propagating them.

use chrono::Local;
use std::env;

fn is_quiet() -> bool {
    env::var("IPCF_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn log(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
}

pub fn log_error(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("[{}] ERROR: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_env_var_accepts_truthy_values() {
        env::set_var("IPCF_QUIET", "true");
        assert!(is_quiet());
        env::remove_var("IPCF_QUIET");
        assert!(!is_quiet());
    }
}
