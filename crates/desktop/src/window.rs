//! Focused window metadata.

use crate::command::{command_exists, run_output};
use crate::{DesktopError, DesktopResult};
use async_trait::async_trait;
use deskmate_core::{AssistantError, ContextData, ContextProvider};
use serde_json::Value;
use sysinfo::{Pid, System};
use tracing::debug;

const MACOS_FRONT_APP: &str =
    "tell application \"System Events\" to get name of first application process whose frontmost is true";
const MACOS_FRONT_WINDOW: &str = "tell application \"System Events\" to tell (first process where frontmost is true) to get name of front window";

/// `active_window` provider: Hyprland, then X11, then macOS.
#[derive(Debug, Clone)]
pub struct ActiveWindowContextProvider {
    include_process_name: bool,
}

impl Default for ActiveWindowContextProvider {
    fn default() -> Self {
        Self {
            include_process_name: true,
        }
    }
}

impl ActiveWindowContextProvider {
    pub fn new(include_process_name: bool) -> Self {
        Self {
            include_process_name,
        }
    }

    async fn collect_hyprland(&self) -> DesktopResult<ContextData> {
        let raw = run_output("hyprctl", &["activewindow", "-j"]).await?;
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| DesktopError::InvalidOutput(e.to_string()))?;
        Ok(parse_hyprland_window(&json, self.include_process_name))
    }

    async fn collect_xdotool(&self) -> DesktopResult<ContextData> {
        let mut result = ContextData::new();
        let title = run_output("xdotool", &["getactivewindow", "getwindowname"]).await?;
        if !title.is_empty() {
            result.insert("title".to_string(), title);
        }
        if self.include_process_name {
            if let Ok(pid) = run_output("xdotool", &["getactivewindow", "getwindowpid"]).await {
                let name = resolve_process_name(&pid);
                if !name.is_empty() {
                    result.insert("process_name".to_string(), name);
                }
            }
        }
        Ok(result)
    }

    async fn collect_macos(&self) -> DesktopResult<ContextData> {
        let mut result = ContextData::new();
        if let Ok(app) = run_output("osascript", &["-e", MACOS_FRONT_APP]).await {
            if !app.is_empty() {
                result.insert("process_name".to_string(), app);
            }
        }
        if let Ok(title) = run_output("osascript", &["-e", MACOS_FRONT_WINDOW]).await {
            if !title.is_empty() {
                result.insert("title".to_string(), title);
            }
        }
        Ok(result)
    }

    async fn collect_any(&self) -> DesktopResult<ContextData> {
        if cfg!(target_os = "macos") {
            return self.collect_macos().await;
        }
        if command_exists("hyprctl").await {
            return self.collect_hyprland().await;
        }
        if command_exists("xdotool").await {
            return self.collect_xdotool().await;
        }
        Ok(ContextData::new())
    }
}

#[async_trait]
impl ContextProvider for ActiveWindowContextProvider {
    fn name(&self) -> &str {
        "active_window"
    }

    async fn collect(&self) -> Result<ContextData, AssistantError> {
        match self.collect_any().await {
            Ok(values) => Ok(values),
            Err(err) => {
                debug!(error = %err, "Active window unavailable");
                Ok(ContextData::new())
            }
        }
    }
}

/// Fields from `hyprctl activewindow -j`. No focused window yields `{}`.
pub fn parse_hyprland_window(json: &Value, include_process_name: bool) -> ContextData {
    let mut result = ContextData::new();
    if let Some(title) = json["title"].as_str().map(str::trim).filter(|t| !t.is_empty()) {
        result.insert("title".to_string(), title.to_string());
    }
    if let Some(class) = json["class"].as_str().map(str::trim).filter(|c| !c.is_empty()) {
        result.insert("class".to_string(), class.to_string());
    }
    if include_process_name {
        if let Some(pid) = json["pid"].as_i64().filter(|pid| *pid > 0) {
            result.insert("process_name".to_string(), resolve_process_name(&pid.to_string()));
        }
    }
    result
}

/// Process name for a pid string, or the input unchanged if it cannot be resolved.
pub fn resolve_process_name(pid_text: &str) -> String {
    let pid_text = pid_text.trim();
    let Ok(pid) = pid_text.parse::<u32>() else {
        return pid_text.to_string();
    };
    let mut sys = System::new();
    let pid = Pid::from_u32(pid);
    if sys.refresh_process(pid) {
        if let Some(process) = sys.process(pid) {
            return process.name().to_string();
        }
    }
    pid_text.to_string()
}
