//! Entry point for the **hyprdock** daemon.
//!
//! Binds the UI command socket first, then connects to Hyprland and follows
//! its event socket.  Both sources run on background threads; the
//! [`DockController`] loop runs on the main thread.  Every state change is
//! written to stdout as one line of JSON for the UI to render; logs go to
//! stderr.

use hyprdock::command::Message;
use hyprdock::config::{config_dir, default_socket_path, Config, ConfigError, DockConfig};
use hyprdock::controller::{DockController, DockUpdate};
use hyprdock::hyprland::client::HyprlandClient;
use hyprdock::hyprland::events::HyprlandEventSource;
use hyprdock::ipc::listener::UnixSocketListener;
use hyprdock::launcher::DetachedLauncher;
use hyprdock::pinned::PinnedStore;
use hyprdock::traits::MessageSource;
use hyprdock::visibility::Visibility;
use log::{error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

/// Try to load the config from `$XDG_CONFIG_HOME/hyprdock/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e @ ConfigError::Missing(_)) => {
            info!("{}, using defaults", e);
            Config::default()
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Load the pinned order.  An unreadable file leaves nothing pinned; it is
/// overwritten by the next reorder.
fn load_pinned(config: &DockConfig) -> PinnedStore {
    let path = config
        .pinned_file
        .clone()
        .unwrap_or_else(|| config_dir().join("dock.json"));
    match PinnedStore::load(&path) {
        Ok(store) => {
            info!("{} pinned app(s) from {}", store.order().len(), path.display());
            store
        }
        Err(e) => {
            warn!("{}; starting with nothing pinned", e);
            PinnedStore::empty(&path)
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let dock = config.dock;
    let pinned = load_pinned(&dock);

    let (update_tx, update_rx) = mpsc::channel::<DockUpdate>();
    spawn_update_writer(update_rx);

    // Commands sent while the compositor is unreachable wait in the queue.
    let (msg_tx, msg_rx) = mpsc::channel::<Message>();
    spawn_command_listener(msg_tx.clone(), default_socket_path());

    let client = connect_with_retry(&dock, &update_tx);

    let mut controller = DockController::new(
        client,
        DetachedLauncher,
        pinned,
        dock.clone(),
        Instant::now(),
    );
    controller.set_updates(update_tx);

    spawn_event_source(msg_tx, &dock);

    controller.run(msg_rx);
}

/// Block until Hyprland's request socket answers.  Until then the dock is
/// reported as shown.
fn connect_with_retry(config: &DockConfig, updates: &mpsc::Sender<DockUpdate>) -> HyprlandClient {
    let mut warned = false;
    loop {
        match HyprlandClient::connect(config.ipc_timeout()) {
            Ok(client) => {
                info!("connected to {}", client.path().display());
                return client;
            }
            Err(e) => {
                if !warned {
                    error!("{}; keeping the dock shown and retrying", e);
                    let _ = updates.send(DockUpdate::Visibility(Visibility::Shown));
                    warned = true;
                }
                std::thread::sleep(config.reconnect_delay());
            }
        }
    }
}

//  Helpers

fn spawn_command_listener(tx: mpsc::Sender<Message>, path: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

fn spawn_event_source(tx: mpsc::Sender<Message>, config: &DockConfig) {
    match HyprlandEventSource::from_env(config.reconnect_delay()) {
        Ok(mut source) => {
            std::thread::spawn(move || {
                if let Err(e) = source.run(tx) {
                    error!("event source error: {}", e);
                }
            });
        }
        Err(e) => error!("no compositor events: {}", e),
    }
}

/// Write every update to stdout as a JSON line.
fn spawn_update_writer(rx: mpsc::Receiver<DockUpdate>) {
    std::thread::spawn(move || {
        let stdout = std::io::stdout();
        for update in rx {
            let line = match serde_json::to_string(&update) {
                Ok(line) => line,
                Err(e) => {
                    error!("cannot encode update: {}", e);
                    continue;
                }
            };
            let mut out = stdout.lock();
            if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
                warn!("stdout closed, no longer publishing updates");
                return;
            }
        }
    });
}
