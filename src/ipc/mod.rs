//! IPC listener that accepts UI commands over a Unix socket.
//!
//! The UI layer (or any script, e.g. a bar button running `hyprdock-ctl`)
//! connects to the socket and sends newline-delimited JSON commands.

pub mod listener;
