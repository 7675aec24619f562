//! Screenshot capture through compositor tools.

use crate::command::{command_exists, run_checked};
use crate::{DesktopError, DesktopResult};
use async_trait::async_trait;
use chrono::Utc;
use deskmate_core::{AssistantError, CapturedScreen, ScreenCapturer};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Screenshot tool that produced a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenBackend {
    Grim,
    Hyprshot,
    ScreenCapture,
}

impl std::fmt::Display for ScreenBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenBackend::Grim => write!(f, "grim"),
            ScreenBackend::Hyprshot => write!(f, "hyprshot"),
            ScreenBackend::ScreenCapture => write!(f, "screencapture"),
        }
    }
}

/// Checks `grim`, then `hyprshot`, then macOS `screencapture`.
pub async fn detect_backend() -> Option<ScreenBackend> {
    if command_exists("grim").await {
        return Some(ScreenBackend::Grim);
    }
    if command_exists("hyprshot").await {
        return Some(ScreenBackend::Hyprshot);
    }
    if cfg!(target_os = "macos") && command_exists("screencapture").await {
        return Some(ScreenBackend::ScreenCapture);
    }
    None
}

/// Captures the desktop (or one named output) as PNG.
#[derive(Debug, Clone, Default)]
pub struct CommandScreenCapturer {
    monitor: Option<String>,
}

impl CommandScreenCapturer {
    pub fn new(monitor: Option<String>) -> Self {
        Self {
            monitor: monitor.filter(|m| !m.trim().is_empty()),
        }
    }

    fn temp_target() -> PathBuf {
        std::env::temp_dir().join(format!(
            "deskmate-shot-{}-{}.png",
            std::process::id(),
            Utc::now().timestamp_millis()
        ))
    }

    async fn capture_to(&self, backend: ScreenBackend, target: &Path) -> DesktopResult<()> {
        let target_str = target.to_string_lossy();
        match backend {
            ScreenBackend::Grim => match self.monitor.as_deref() {
                Some(monitor) => run_checked("grim", &["-o", monitor, &target_str]).await,
                None => run_checked("grim", &[&target_str]).await,
            },
            ScreenBackend::Hyprshot => {
                let dir = target
                    .parent()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| ".".to_string());
                let file = target
                    .file_name()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_default();
                let mut args = vec!["-m", "output"];
                if let Some(monitor) = self.monitor.as_deref() {
                    args.extend(["-m", monitor]);
                }
                args.extend(["-o", dir.as_str(), "-f", file.as_str(), "--silent"]);
                run_checked("hyprshot", &args).await
            }
            ScreenBackend::ScreenCapture => run_checked("screencapture", &["-x", &target_str]).await,
        }
    }

    async fn capture_png(&self) -> DesktopResult<CapturedScreen> {
        let backend = detect_backend().await.ok_or_else(|| {
            DesktopError::NoBackend(
                "no screenshot tool found (install 'grim' or 'hyprshot')".to_string(),
            )
        })?;

        let target = Self::temp_target();
        let captured = self.capture_to(backend, &target).await;
        let bytes = match captured {
            Ok(()) => tokio::fs::read(&target).await,
            Err(err) => {
                let _ = tokio::fs::remove_file(&target).await;
                return Err(err);
            }
        };
        if let Err(err) = tokio::fs::remove_file(&target).await {
            warn!(path = %target.display(), error = %err, "Failed to remove screenshot");
        }
        let bytes = bytes?;

        let (width, height) = png_dimensions(&bytes).ok_or_else(|| {
            DesktopError::InvalidOutput(format!("{} did not produce a PNG image", backend))
        })?;
        debug!(%backend, width, height, bytes = bytes.len(), "Screen captured");
        Ok(CapturedScreen::new(bytes, width, height))
    }
}

#[async_trait]
impl ScreenCapturer for CommandScreenCapturer {
    async fn capture(&self) -> Result<CapturedScreen, AssistantError> {
        Ok(self.capture_png().await?)
    }
}

/// Used when screen capture is switched off.
#[derive(Debug, Clone, Default)]
pub struct NullScreenCapturer;

#[async_trait]
impl ScreenCapturer for NullScreenCapturer {
    async fn capture(&self) -> Result<CapturedScreen, AssistantError> {
        Ok(CapturedScreen::empty())
    }
}

/// Width and height from the IHDR chunk of a PNG.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || &bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some((width, height))
}
