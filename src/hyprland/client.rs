//! [`Compositor`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its request socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! Hyprland answers one request per connection, so every query opens a
//! short-lived stream with bounded read/write timeouts.

use super::instance_dir;
use crate::command::{Fullscreen, MonitorInfo, WindowInfo};
use crate::traits::Compositor;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
pub enum HyprlandError {
    /// The request socket could not be located or reached.
    #[error("cannot reach hyprland: {0}")]
    Connection(String),

    /// Hyprland answered with something we could not parse.
    #[error("malformed reply to {command}: {reason}")]
    Protocol { command: String, reason: String },

    /// The exchange failed half-way (including timeouts).
    #[error("io error during {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A dispatch was answered with something other than `ok`.
    #[error("dispatch {command} rejected: {reply}")]
    Dispatch { command: String, reply: String },
}

/// Handle on a Hyprland instance's request socket.
#[derive(Debug, Clone)]
pub struct HyprlandClient {
    path: PathBuf,
    timeout: Duration,
}

impl HyprlandClient {
    /// Locate the running instance and check that its socket accepts
    /// connections.
    ///
    /// Fails with [`HyprlandError::Connection`] when the environment does not
    /// describe a Hyprland session or the socket is not reachable.
    pub fn connect(timeout: Duration) -> Result<Self, HyprlandError> {
        let dir = instance_dir().map_err(HyprlandError::Connection)?;
        let client = Self::with_socket(dir.join(".socket.sock"), timeout);
        UnixStream::connect(&client.path).map_err(|e| {
            HyprlandError::Connection(format!("connect to {}: {}", client.path.display(), e))
        })?;
        Ok(client)
    }

    /// Build a client for an explicit socket path without probing it.
    pub fn with_socket(path: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// The filesystem path of the request socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send a raw command and return the raw reply.
    pub fn query(&self, command: &str) -> Result<Vec<u8>, HyprlandError> {
        let io_err = |source| HyprlandError::Io {
            command: command.to_string(),
            source,
        };
        let mut stream = UnixStream::connect(&self.path).map_err(|e| {
            HyprlandError::Connection(format!("connect to {}: {}", self.path.display(), e))
        })?;
        stream.set_read_timeout(Some(self.timeout)).map_err(io_err)?;
        stream.set_write_timeout(Some(self.timeout)).map_err(io_err)?;

        stream.write_all(command.as_bytes()).map_err(io_err)?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).map_err(io_err)?;
        debug!("{} -> {} bytes", command, reply.len());
        Ok(reply)
    }

    /// Send a JSON data query (`j/<command>`) and decode the reply.
    fn json<T: DeserializeOwned>(&self, data_command: &str) -> Result<T, HyprlandError> {
        let command = format!("j/{}", data_command);
        let reply = self.query(&command)?;
        serde_json::from_slice(&reply).map_err(|e| HyprlandError::Protocol {
            command,
            reason: e.to_string(),
        })
    }

    /// Send a dispatch command and check for `"ok"`.
    fn dispatch(&self, args: &str) -> Result<(), HyprlandError> {
        let command = format!("/dispatch {}", args);
        let reply = self.query(&command)?;
        let reply = String::from_utf8_lossy(&reply);
        if reply.trim() == "ok" {
            Ok(())
        } else {
            Err(HyprlandError::Dispatch {
                command,
                reply: reply.trim().to_string(),
            })
        }
    }
}

//  Minimal serde structs for the JSON we care about

#[derive(Deserialize)]
struct WorkspaceRef {
    id: i32,
}

/// Subset of an object returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default)]
    at: (i32, i32),
    #[serde(default)]
    size: (i32, i32),
    workspace: WorkspaceRef,
    #[serde(default)]
    floating: bool,
    #[serde(default)]
    fullscreen: Fullscreen,
    #[serde(default)]
    monitor: i64,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "initialClass", default)]
    initial_class: String,
}

impl From<ClientJson> for WindowInfo {
    fn from(c: ClientJson) -> Self {
        // The initial class is stable for the lifetime of the window; some
        // applications rewrite `class` later.
        let app_identity = if c.initial_class.is_empty() {
            c.class
        } else {
            c.initial_class
        };
        WindowInfo {
            address: c.address,
            app_identity,
            workspace_id: c.workspace.id,
            monitor: c.monitor,
            floating: c.floating,
            fullscreen: c.fullscreen.0,
            title: c.title,
            at: c.at,
            size: c.size,
        }
    }
}

/// Subset of the JSON object returned by `j/activewindow`.
#[derive(Deserialize)]
struct ActiveWindowJson {
    address: String,
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    id: i64,
    name: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: i32,
    #[serde(default)]
    focused: bool,
    #[serde(rename = "activeWorkspace")]
    active_workspace: WorkspaceRef,
}

fn unit_scale() -> f64 {
    1.0
}

//  Compositor implementation

impl Compositor for HyprlandClient {
    type Error = HyprlandError;

    fn clients(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        let clients: Vec<ClientJson> = self.json("clients")?;
        Ok(clients.into_iter().map(WindowInfo::from).collect())
    }

    fn active_window_address(&self) -> Result<Option<String>, Self::Error> {
        let reply = self.query("j/activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if String::from_utf8_lossy(&reply).trim() == "{}" {
            return Ok(None);
        }
        let w: ActiveWindowJson =
            serde_json::from_slice(&reply).map_err(|e| HyprlandError::Protocol {
                command: "j/activewindow".into(),
                reason: e.to_string(),
            })?;
        Ok(Some(w.address))
    }

    fn active_workspace(&self) -> Result<i32, Self::Error> {
        let ws: WorkspaceRef = self.json("activeworkspace")?;
        Ok(ws.id)
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error> {
        let monitors: Vec<MonitorJson> = self.json("monitors")?;
        Ok(monitors
            .into_iter()
            .map(|m| MonitorInfo {
                id: m.id,
                name: m.name,
                width: m.width,
                height: m.height,
                x: m.x,
                y: m.y,
                scale: m.scale,
                transform: m.transform,
                focused: m.focused,
                active_workspace: m.active_workspace.id,
            })
            .collect())
    }

    fn focus_window(&self, address: &str) -> Result<(), Self::Error> {
        self.dispatch(&format!("focuswindow address:{}", address))
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "hyprdock-client-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    /// Fake Hyprland request socket answering from a fixed table.
    /// Returns the log of requests it received.
    fn fake_hyprland(path: &Path, replies: &[(&str, &str)]) -> Arc<Mutex<Vec<String>>> {
        let _ = std::fs::remove_file(path);
        let listener = UnixListener::bind(path).expect("bind fake socket");
        let table: HashMap<String, String> = replies
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = [0u8; 1024];
                let n = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let reply = table
                    .get(&request)
                    .cloned()
                    .unwrap_or_else(|| "unknown request".into());
                log2.lock().unwrap().push(request);
                let _ = stream.write_all(reply.as_bytes());
            }
        });
        log
    }

    const CLIENTS: &str = r#"[
        {"address":"0xa1","mapped":true,"at":[10,20],"size":[800,600],
         "workspace":{"id":1,"name":"1"},"floating":false,"fullscreen":0,
         "monitor":0,"class":"kitty","title":"shell","initialClass":"kitty"},
        {"address":"0xb2","at":[0,0],"size":[400,300],
         "workspace":{"id":2,"name":"2"},"floating":true,"fullscreen":false,
         "monitor":0,"class":"renamed","title":"Mozilla","initialClass":"firefox"}
    ]"#;

    #[test]
    fn clients_are_decoded() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(&path, &[("j/clients", CLIENTS)]);
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));

        let windows = client.clients().unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].address, "0xa1");
        assert_eq!(windows[0].app_identity, "kitty");
        assert_eq!(windows[0].at, (10, 20));
        assert_eq!(windows[0].size, (800, 600));
        assert!(windows[0].is_tiled());
        // initialClass wins over a rewritten class.
        assert_eq!(windows[1].app_identity, "firefox");
        assert!(windows[1].floating);
        assert_eq!(windows[1].workspace_id, 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_reply_is_protocol_error() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(&path, &[("j/clients", "[{\"address\": ")]);
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));

        let err = client.clients().unwrap_err();
        assert!(matches!(err, HyprlandError::Protocol { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn active_window_empty_object_is_none() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(&path, &[("j/activewindow", "{}")]);
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));
        assert_eq!(client.active_window_address().unwrap(), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn active_window_and_workspace() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(
            &path,
            &[
                ("j/activewindow", r#"{"address":"0xa1","title":"shell"}"#),
                ("j/activeworkspace", r#"{"id":4,"name":"4"}"#),
            ],
        );
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));
        assert_eq!(client.active_window_address().unwrap(), Some("0xa1".into()));
        assert_eq!(client.active_workspace().unwrap(), 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn monitors_are_decoded() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(
            &path,
            &[(
                "j/monitors",
                r#"[{"id":0,"name":"DP-1","width":2560,"height":1440,"x":0,"y":0,
                     "scale":1.25,"transform":0,
                     "focused":true,"activeWorkspace":{"id":3,"name":"3"}},
                    {"id":1,"name":"HDMI-A-1","width":1920,"height":1080,"x":2048,"y":0,
                     "focused":false,"activeWorkspace":{"id":5,"name":"5"}}]"#,
            )],
        );
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));
        let mons = client.monitors().unwrap();
        assert_eq!(mons.len(), 2);
        assert_eq!(mons[0].name, "DP-1");
        assert!(mons[0].focused);
        assert_eq!(mons[0].active_workspace, 3);
        assert_eq!(mons[0].logical_size(), (2048, 1152));
        // Older replies without a scale are treated as unscaled.
        assert_eq!(mons[1].scale, 1.0);
        assert_eq!(mons[1].logical_size(), (1920, 1080));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn focus_window_dispatches_by_address() {
        let path = tmp_socket_path();
        let log = fake_hyprland(&path, &[("/dispatch focuswindow address:0xa1", "ok")]);
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));
        client.focus_window("0xa1").unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["/dispatch focuswindow address:0xa1".to_string()]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejected_dispatch_is_error() {
        let path = tmp_socket_path();
        let _log = fake_hyprland(&path, &[]);
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(500));
        let err = client.focus_window("0xdead").unwrap_err();
        assert!(matches!(err, HyprlandError::Dispatch { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_connection_error() {
        let path = tmp_socket_path();
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(100));
        assert!(matches!(
            client.query("j/clients"),
            Err(HyprlandError::Connection(_))
        ));
    }

    #[test]
    fn silent_server_times_out() {
        let path = tmp_socket_path();
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        // Accept but never answer (and never close).
        let handle = std::thread::spawn(move || {
            let conn = listener.accept();
            std::thread::sleep(Duration::from_millis(400));
            drop(conn);
        });
        let client = HyprlandClient::with_socket(&path, Duration::from_millis(100));
        let err = client.query("j/clients").unwrap_err();
        assert!(matches!(err, HyprlandError::Io { .. }));
        let _ = handle.join();
        let _ = std::fs::remove_file(&path);
    }
}
