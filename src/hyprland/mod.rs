//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`Compositor`](crate::traits::Compositor) and
//! [`MessageSource`](crate::traits::MessageSource) traits, powered by
//! Hyprland's IPC sockets.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod client;
pub mod events;

use std::path::PathBuf;

/// Resolve the directory holding the Hyprland instance sockets.
///
/// Hyprland ≥ 0.40 stores its sockets under
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/`.
pub(crate) fn instance_dir() -> Result<PathBuf, String> {
    let runtime_dir =
        std::env::var("XDG_RUNTIME_DIR").map_err(|_| "XDG_RUNTIME_DIR not set".to_string())?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| "HYPRLAND_INSTANCE_SIGNATURE not set".to_string())?;
    Ok(PathBuf::from(format!("{}/hypr/{}", runtime_dir, his)))
}

/// Hyprland prints addresses without the `0x` prefix on the event socket but
/// with it in JSON replies.  Normalise to the prefixed form.
pub(crate) fn normalize_address(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("0x") {
        raw.to_string()
    } else {
        format!("0x{}", raw)
    }
}
