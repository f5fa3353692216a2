//! Translates Hyprland's event socket into [`CompositorEvent`]s.
//!
//! Hyprland broadcasts events on `socket2`
//! (`$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`) as
//! `EVENT>>DATA\n` lines.  The ones the dock cares about:
//!
//! | Event                | Payload                      |
//! |----------------------|------------------------------|
//! | `openwindow`         | `ADDR,WORKSPACE,CLASS,TITLE` |
//! | `closewindow`        | `ADDR`                       |
//! | `activewindowv2`     | `ADDR`                       |
//! | `changefloatingmode` | `ADDR,0\|1`                  |
//! | `fullscreen`         | `0\|1`                       |
//! | `movewindowv2`       | `ADDR,WSID,WSNAME`           |
//! | `workspacev2`        | `WSID,WSNAME`                |
//!
//! A [`subscribe`]d [`EventStream`] lives exactly as long as its connection.
//! [`HyprlandEventSource`] wraps it with reconnection: every fresh
//! subscription starts with a [`CompositorEvent::Ready`].

use super::{instance_dir, normalize_address};
use crate::command::{CompositorEvent, Message};
use crate::traits::MessageSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Lines};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Error from the Hyprland event source.
#[derive(Debug, thiserror::Error)]
#[error("hyprland event error: {0}")]
pub struct HyprlandEventError(String);

/// Resolve the Hyprland event socket path.
pub fn socket2_path() -> Result<PathBuf, HyprlandEventError> {
    let dir = instance_dir().map_err(HyprlandEventError)?;
    Ok(dir.join(".socket2.sock"))
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// Translate one socket2 line into an event, or `None` for events the dock
/// ignores (and for garbage).
pub fn parse_event(line: &str) -> Option<CompositorEvent> {
    let (event, data) = parse_event_line(line)?;
    let data = data.trim();
    match event {
        "openwindow" => {
            // The title may itself contain commas; only split the first three.
            let mut parts = data.splitn(4, ',');
            let address = parts.next().filter(|a| !a.is_empty())?;
            let _workspace = parts.next()?;
            let class = parts.next()?;
            Some(CompositorEvent::WindowOpened {
                address: normalize_address(address),
                app_identity: class.to_string(),
            })
        }
        "closewindow" if !data.is_empty() => Some(CompositorEvent::WindowClosed {
            address: normalize_address(data),
        }),
        // An empty or "," payload means focus moved to no window.
        "activewindowv2" => Some(CompositorEvent::ActiveWindowChanged {
            address: data
                .split(',')
                .next()
                .filter(|a| !a.is_empty())
                .map(normalize_address)
                .unwrap_or_default(),
        }),
        "changefloatingmode" => {
            let address = data.split(',').next().filter(|a| !a.is_empty())?;
            Some(CompositorEvent::FloatingModeChanged {
                address: normalize_address(address),
            })
        }
        "fullscreen" => Some(CompositorEvent::FullscreenChanged {
            fullscreen: data == "1",
        }),
        "movewindowv2" => {
            let mut parts = data.splitn(3, ',');
            let address = parts.next().filter(|a| !a.is_empty())?;
            let workspace_id = parts.next()?.parse().ok()?;
            Some(CompositorEvent::WindowMoved {
                address: normalize_address(address),
                workspace_id,
            })
        }
        "workspacev2" => {
            let workspace_id = data.split(',').next()?.parse().ok()?;
            Some(CompositorEvent::WorkspaceChanged { workspace_id })
        }
        _ => None,
    }
}

/// Events from one socket2 connection.
///
/// The stream is infinite while the compositor runs and ends when the
/// connection closes.  It cannot be restarted: reconnecting means calling
/// [`subscribe`] again.
pub struct EventStream {
    lines: Lines<BufReader<UnixStream>>,
}

impl Iterator for EventStream {
    type Item = Result<CompositorEvent, HyprlandEventError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    if let Some(ev) = parse_event(&line) {
                        return Some(Ok(ev));
                    }
                }
                Err(e) => return Some(Err(HyprlandEventError(format!("read error: {}", e)))),
            }
        }
    }
}

/// Open a new event subscription on the socket at `path`.
pub fn subscribe(path: &Path) -> Result<EventStream, HyprlandEventError> {
    let stream = UnixStream::connect(path)
        .map_err(|e| HyprlandEventError(format!("connect to {}: {}", path.display(), e)))?;
    Ok(EventStream {
        lines: BufReader::new(stream).lines(),
    })
}

/// A [`MessageSource`] that follows Hyprland's event socket forever,
/// resubscribing after `reconnect_delay` whenever the connection is lost.
pub struct HyprlandEventSource {
    path: PathBuf,
    reconnect_delay: Duration,
}

impl HyprlandEventSource {
    pub fn new(path: impl AsRef<Path>, reconnect_delay: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reconnect_delay,
        }
    }

    /// Follow the running instance's event socket.
    pub fn from_env(reconnect_delay: Duration) -> Result<Self, HyprlandEventError> {
        Ok(Self::new(socket2_path()?, reconnect_delay))
    }
}

impl MessageSource for HyprlandEventSource {
    type Error = HyprlandEventError;

    /// Subscribe and forward events.
    ///
    /// This method **blocks** until the receiving side hangs up.  Run it on
    /// a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Message>) -> Result<(), Self::Error> {
        loop {
            match subscribe(&self.path) {
                Ok(events) => {
                    info!("subscribed to {}", self.path.display());
                    if sink.send(CompositorEvent::Ready.into()).is_err() {
                        return Ok(());
                    }
                    for ev in events {
                        match ev {
                            Ok(ev) => {
                                debug!("event {:?}", ev);
                                if sink.send(ev.into()).is_err() {
                                    info!("sink closed, shutting down");
                                    return Ok(());
                                }
                            }
                            Err(e) => {
                                error!("{}", e);
                                break;
                            }
                        }
                    }
                    warn!("socket2 stream ended");
                }
                Err(e) => warn!("{}", e),
            }
            std::thread::sleep(self.reconnect_delay);
        }
    }
}

//  Tests
