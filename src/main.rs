mod auth;
mod calc;
mod cycle;
mod hierarchy;
mod ipc;
mod logging;
mod model;
mod scope;

use std::io::{self, BufRead, Write};

fn main() {
    // Logs go to a file; a logging failure must not take the daemon down.
    let _logger = match logging::init() {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("campusd: logging disabled: {:#}", e);
            None
        }
    };

    let mut state = ipc::AppState::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
