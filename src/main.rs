//! Thin CLI layer: parse args, styled output, and call into ipcf-core.
//! Crash-proof: panic caught and reported; all errors return Result.

mod demo_store;

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use clap::{Arg, Command};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use ipcf_core::{
    generate_request_id, load_config, AttributeList, AttributeName, AttributeValue, ClientManager,
    GetRequest, ResponseCallback, ServerManager, SetRequest,
};

use demo_store::DemoStore;

// ---- UI helpers (no-op when stdout isn't a TTY) ----

fn use_color() -> bool {
    std::io::stdout().is_terminal() && env::var("NO_COLOR").unwrap_or_default().is_empty()
}

fn success(msg: &str) {
    if use_color() {
        println!("{}", msg.green());
    } else {
        println!("{}", msg);
    }
}

fn error(msg: &str) {
    if use_color() {
        eprintln!("{}", msg.red());
    } else {
        eprintln!("{}", msg);
    }
}

fn info(msg: &str) {
    if use_color() {
        println!("{}", msg.cyan());
    } else {
        println!("{}", msg);
    }
}

fn dim(msg: &str) {
    if use_color() {
        println!("{}", msg.dimmed());
    } else {
        println!("{}", msg);
    }
}

/// Spin until `done` reports `true` or `timeout` elapses.
fn wait_with_spinner(message: &str, timeout: Duration, done: impl Fn() -> bool) -> bool {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⠈⠐⠠⠰⠸⠹")
            .template("{spinner:.dim} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    let tick = Duration::from_millis(80);
    let mut elapsed = Duration::ZERO;
    loop {
        if done() {
            spinner.finish_and_clear();
            return true;
        }
        if elapsed >= timeout {
            spinner.finish_and_clear();
            return false;
        }
        spinner.tick();
        thread::sleep(tick);
        elapsed += tick;
    }
}

// ---- attribute parsing shared by the client subcommands ----

fn parse_want(raw: &str) -> Vec<AttributeName> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AttributeName::from_key)
        .collect()
}

/// `"PlayerName=Ada,IsOnline=1"` -> an `AttributeList`. `IsOnline` is
/// parsed as a bool (`"1"`/`"true"`); every other known key is kept as a
/// string. This is CLI-level convenience, independent of the wire codec.
fn parse_set_pairs(raw: &str) -> AttributeList {
    let mut attrs = AttributeList::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let name = AttributeName::from_key(key);
        if name == AttributeName::None {
            continue;
        }
        let value = match name {
            AttributeName::IsOnline => AttributeValue::Bool(value == "1" || value.eq_ignore_ascii_case("true")),
            _ => AttributeValue::Str(value.to_string()),
        };
        attrs.set(name, value);
    }
    attrs
}

fn render_attrs(attrs: &AttributeList) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value.to_wire()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run() -> Result<(), String> {
    let dir_arg = Arg::new("dir").long("dir").help("Shared directory both processes poll (defaults to config/env)");
    let tick_rate_arg = Arg::new("tick-rate")
        .long("tick-rate")
        .value_parser(clap::value_parser!(u64))
        .help("Worker ticks per second (default from config, else 8)");

    let matches = Command::new("ipcf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("File-mediated request/response exchange between a client and a server process")
        .after_help(
            "Examples:\n  ipcf demo\n  ipcf server --dir /tmp/ipcf-shared\n  ipcf client get --dir /tmp/ipcf-shared --subject XYZ --want PlayerName\n  ipcf client set --dir /tmp/ipcf-shared --subject XYZ --set IsOnline=1",
        )
        .subcommand(
            Command::new("server")
                .about("Run the server role against an in-memory demonstration backing store")
                .arg(dir_arg.clone())
                .arg(tick_rate_arg.clone())
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10")
                        .help("Seconds to run before shutting down"),
                ),
        )
        .subcommand(
            Command::new("client")
                .about("Submit requests as the client role")
                .subcommand(
                    Command::new("get")
                        .about("Submit a GET and wait for the response")
                        .arg(dir_arg.clone())
                        .arg(tick_rate_arg.clone())
                        .arg(Arg::new("subject").long("subject").required(true).help("Subject identifier"))
                        .arg(
                            Arg::new("want")
                                .long("want")
                                .required(true)
                                .help("Comma-separated attribute names to retrieve"),
                        )
                        .arg(
                            Arg::new("timeout")
                                .long("timeout")
                                .value_parser(clap::value_parser!(u64))
                                .default_value("5")
                                .help("Seconds to wait for the response before giving up"),
                        ),
                )
                .subcommand(
                    Command::new("set")
                        .about("Submit a SET")
                        .arg(dir_arg.clone())
                        .arg(tick_rate_arg.clone())
                        .arg(Arg::new("subject").long("subject").required(true).help("Subject identifier"))
                        .arg(
                            Arg::new("set")
                                .long("set")
                                .required(true)
                                .help("Comma-separated name=value pairs to apply"),
                        ),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Run client and server in one process and walk through a single GET")
                .arg(dir_arg.clone())
                .arg(tick_rate_arg.clone()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_m)) => {
            let cwd = env::current_dir().map_err(|e| e.to_string())?;
            let mut cfg = load_config(&cwd);
            if let Some(dir) = sub_m.get_one::<String>("dir") {
                cfg.shared_dir = PathBuf::from(dir);
            }
            if let Some(rate) = sub_m.get_one::<u64>("tick-rate") {
                cfg.tick_rate = *rate;
            }
            let duration = *sub_m.get_one::<u64>("duration").unwrap();
            std::fs::create_dir_all(&cfg.shared_dir).map_err(|e| e.to_string())?;

            let store = DemoStore::new();
            store.seed("XYZ", AttributeName::PlayerName, AttributeValue::Str("Ada".to_string()));
            store.seed("XYZ", AttributeName::IsOnline, AttributeValue::Bool(true));

            info(&format!("server listening on {} ({}s)", cfg.shared_dir.display(), duration));
            let mut server = ServerManager::init(cfg.shared_dir.clone(), cfg.tick_rate, cfg.buffer_max, store.on_get(), store.on_set());
            thread::sleep(Duration::from_secs(duration));
            server.shutdown();
            success("server stopped.");
        }
        Some(("client", client_m)) => match client_m.subcommand() {
            Some(("get", sub_m)) => {
                let cwd = env::current_dir().map_err(|e| e.to_string())?;
                let mut cfg = load_config(&cwd);
                if let Some(dir) = sub_m.get_one::<String>("dir") {
                    cfg.shared_dir = PathBuf::from(dir);
                }
                if let Some(rate) = sub_m.get_one::<u64>("tick-rate") {
                    cfg.tick_rate = *rate;
                }
                let subject = sub_m.get_one::<String>("subject").unwrap().clone();
                let want = parse_want(sub_m.get_one::<String>("want").unwrap());
                let timeout = Duration::from_secs(*sub_m.get_one::<u64>("timeout").unwrap());
                std::fs::create_dir_all(&cfg.shared_dir).map_err(|e| e.to_string())?;

                let received: Arc<Mutex<Option<AttributeList>>> = Arc::new(Mutex::new(None));
                let sink = Arc::clone(&received);
                let on_response: ResponseCallback = Arc::new(move |_rid, attrs| {
                    *sink.lock().unwrap() = Some(attrs);
                });
                let mut client = ClientManager::init(cfg.shared_dir.clone(), cfg.tick_rate, cfg.buffer_max, on_response);

                let rid = generate_request_id();
                let req = GetRequest::new(subject.clone(), rid, want);
                if !client.submit_get(req) {
                    client.shutdown();
                    return Err("refused to submit an empty GET".to_string());
                }
                info(&format!("submitted GET rid={} subject={}", rid, subject));

                let poll = Arc::clone(&received);
                let arrived = wait_with_spinner("waiting for GET_RESPONSE", timeout, move || poll.lock().unwrap().is_some());
                client.shutdown();

                match received.lock().unwrap().take() {
                    Some(attrs) => success(&format!("{}", render_attrs(&attrs))),
                    None if arrived => error("response arrived but carried no attributes"),
                    None => error("timed out waiting for a response"),
                }
            }
            Some(("set", sub_m)) => {
                let cwd = env::current_dir().map_err(|e| e.to_string())?;
                let mut cfg = load_config(&cwd);
                if let Some(dir) = sub_m.get_one::<String>("dir") {
                    cfg.shared_dir = PathBuf::from(dir);
                }
                if let Some(rate) = sub_m.get_one::<u64>("tick-rate") {
                    cfg.tick_rate = *rate;
                }
                let subject = sub_m.get_one::<String>("subject").unwrap().clone();
                let attrs = parse_set_pairs(sub_m.get_one::<String>("set").unwrap());
                std::fs::create_dir_all(&cfg.shared_dir).map_err(|e| e.to_string())?;

                let on_response: ResponseCallback = Arc::new(|_rid, _attrs| {});
                let mut client = ClientManager::init(cfg.shared_dir.clone(), cfg.tick_rate, cfg.buffer_max, on_response);
                let rid = generate_request_id();
                let req = SetRequest::new(subject.clone(), rid, attrs.clone());
                if !client.submit_set(req) {
                    client.shutdown();
                    return Err("refused to submit an empty SET".to_string());
                }
                client.flush_sets();
                client.shutdown();
                success(&format!("submitted SET rid={} subject={} [{}]", rid, subject, render_attrs(&attrs)));
            }
            _ => {
                dim("Run `ipcf client get --help` or `ipcf client set --help`.");
            }
        },
        Some(("demo", sub_m)) => {
            let dir = sub_m
                .get_one::<String>("dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(format!("ipcf-demo-{}", generate_request_id())));
            let tick_rate = sub_m.get_one::<u64>("tick-rate").copied().unwrap_or(16);
            std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
            info(&format!("demo shared directory: {}", dir.display()));

            let store = DemoStore::new();
            store.seed("XYZ", AttributeName::PlayerName, AttributeValue::Str("Ada".to_string()));
            let mut server = ServerManager::init(dir.clone(), tick_rate, 64, store.on_get(), store.on_set());

            let received: Arc<Mutex<Option<AttributeList>>> = Arc::new(Mutex::new(None));
            let sink = Arc::clone(&received);
            let on_response: ResponseCallback = Arc::new(move |_rid, attrs| {
                *sink.lock().unwrap() = Some(attrs);
            });
            let mut client = ClientManager::init(dir.clone(), tick_rate, 64, on_response);

            let rid = generate_request_id();
            let req = GetRequest::new("XYZ", rid, vec![AttributeName::PlayerName]);
            client.submit_get(req);
            info(&format!("client submitted GET rid={} subject=XYZ want=PlayerName", rid));

            let poll = Arc::clone(&received);
            wait_with_spinner("round trip in progress", Duration::from_secs(3), move || poll.lock().unwrap().is_some());

            client.shutdown();
            server.shutdown();

            match received.lock().unwrap().take() {
                Some(attrs) => success(&format!("round trip complete: {}", render_attrs(&attrs))),
                None => error("round trip did not complete within the demo window"),
            }
        }
        _ => {
            if use_color() {
                println!("{}", "ipcf".bright_cyan().bold());
                dim("File-mediated request/response exchange between a client and a server process.");
            } else {
                println!("ipcf — file-mediated request/response exchange");
            }
            dim("\nRun `ipcf --help` for details.");
        }
    }

    Ok(())
}

fn main() {
    if !use_color() {
        colored::control::set_override(false);
    }

    let code = match std::panic::catch_unwind(run) {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            error(&e);
            1
        }
        Err(_) => {
            error("An unexpected error occurred. Please report this issue.");
            1
        }
    };
    std::process::exit(code);
}
