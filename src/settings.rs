use crate::gesture::DOUBLE_CLICK_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Install the global middle-button tap on startup.
    #[serde(default = "default_gesture_enabled")]
    pub gesture_enabled: bool,
    /// Maximum gap between the two middle clicks, in milliseconds.
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
    #[serde(default = "default_panel_size")]
    pub panel_size: (f32, f32),
    /// Hide the panel as soon as it loses focus.
    #[serde(default = "default_hide_on_focus_loss")]
    pub hide_on_focus_loss: bool,
    /// Where the window is parked while hidden.
    #[serde(default = "default_offscreen_pos")]
    pub offscreen_pos: (f32, f32),
}

fn default_gesture_enabled() -> bool {
    true
}

fn default_double_click_ms() -> u64 {
    DOUBLE_CLICK_THRESHOLD.as_millis() as u64
}

fn default_panel_size() -> (f32, f32) {
    (720.0, 460.0)
}

fn default_hide_on_focus_loss() -> bool {
    true
}

fn default_offscreen_pos() -> (f32, f32) {
    (2000.0, 2000.0)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            gesture_enabled: default_gesture_enabled(),
            double_click_ms: default_double_click_ms(),
            panel_size: default_panel_size(),
            hide_on_focus_loss: default_hide_on_focus_loss(),
            offscreen_pos: default_offscreen_pos(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn double_click_threshold(&self) -> Duration {
        if self.double_click_ms == 0 {
            tracing::warn!("double_click_ms of 0 is invalid; using default");
            return DOUBLE_CLICK_THRESHOLD;
        }
        Duration::from_millis(self.double_click_ms)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}
