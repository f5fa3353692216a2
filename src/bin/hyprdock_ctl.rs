//! Send a single command to a running hyprdock daemon.
//!
//! Usage:
//!     hyprdock-ctl hover-enter
//!     hyprdock-ctl hover-leave
//!     hyprdock-ctl activate <index>
//!     hyprdock-ctl reorder <source> <target>
//!
//! The socket defaults to `$XDG_RUNTIME_DIR/hyprdock.sock`; set
//! `HYPRDOCK_SOCKET` to override it.

use hyprdock::command::Command;
use hyprdock::config::default_socket_path;
use log::{debug, error};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: hyprdock-ctl hover-enter | hover-leave | activate <index> | reorder <source> <target>";

fn parse_index(arg: Option<&String>) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| USAGE.to_string())?;
    arg.parse()
        .map_err(|_| format!("not a button index: {}", arg))
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        Some("hover-enter") => Ok(Command::HoverEnter),
        Some("hover-leave") => Ok(Command::HoverLeave),
        Some("activate") => Ok(Command::Activate(parse_index(args.get(1))?)),
        Some("reorder") => Ok(Command::Reorder {
            source: parse_index(args.get(1))?,
            target: parse_index(args.get(2))?,
        }),
        _ => Err(USAGE.to_string()),
    }
}

fn send(path: &Path, cmd: &Command) -> std::io::Result<()> {
    let line = serde_json::to_string(cmd)?;
    let mut stream = UnixStream::connect(path)?;
    writeln!(stream, "{}", line)?;
    stream.flush()
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    let path = std::env::var_os("HYPRDOCK_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(default_socket_path);
    debug!("sending {:?} to {}", cmd, path.display());

    match send(&path, &cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("cannot reach {}: {}", path.display(), e);
            eprintln!("hyprdock-ctl: {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
