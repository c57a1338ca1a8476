//! Kiosk window control via `xdotool`: minimize the active window,
//! falling back to a class-based search over the known browser
//! classes.

use anyhow::{bail, Result};
use tokio::process::Command;

/// Minimize the active window, or the first window matching one of
/// the given classes. Errors only when every option is exhausted.
pub async fn minimize(window_classes: &[String]) -> Result<()> {
    if minimize_active().await {
        return Ok(());
    }

    for class in window_classes {
        if let Some(window_id) = find_by_class(class).await {
            if minimize_by_id(&window_id).await {
                tracing::info!("Minimized {} window {}", class, window_id);
                return Ok(());
            }
        }
    }

    bail!("No window could be minimized")
}

async fn minimize_active() -> bool {
    Command::new("xdotool")
        .args(["getactivewindow", "windowminimize"])
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

async fn find_by_class(class: &str) -> Option<String> {
    let output = Command::new("xdotool")
        .args(["search", "--class", class])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .filter(|id| !id.is_empty())
}

async fn minimize_by_id(window_id: &str) -> bool {
    Command::new("xdotool")
        .args(["windowminimize", window_id])
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
