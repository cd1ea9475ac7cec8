#![cfg_attr(feature = "windows_gui", windows_subsystem = "windows")]

use shortcut_panel::dispatch;
use shortcut_panel::gesture::{DefaultHookBackend, PointerTap};
use shortcut_panel::gui::ShortcutPanel;
use shortcut_panel::icon::{IconCache, ShellIconResolver};
use shortcut_panel::logging;
use shortcut_panel::settings::{Settings, SETTINGS_FILE};
use shortcut_panel::shortcuts::{ShortcutStore, SHORTCUTS_FILE};

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

/// Files live next to the executable, falling back to the working directory.
fn data_path(name: &str) -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(name)))
        .unwrap_or_else(|| PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

fn main() -> anyhow::Result<()> {
    let settings_path = data_path(SETTINGS_FILE);
    let settings = Settings::load(&settings_path)?;
    logging::init(settings.debug_logging, settings.log_path());
    tracing::info!(path = %settings_path, "settings loaded");

    let store = ShortcutStore::load(&data_path(SHORTCUTS_FILE));

    let (bridge, gestures) = dispatch::channel();
    let tap = if settings.gesture_enabled {
        let mut tap = PointerTap::with_threshold(
            Box::new(DefaultHookBackend::default()),
            Arc::new(bridge),
            settings.double_click_threshold(),
        );
        match tap.install() {
            Ok(()) => Some(tap),
            Err(err) => {
                tracing::warn!(?err, "pointer tap unavailable; middle double-click disabled");
                None
            }
        }
    } else {
        None
    };

    let icons = Arc::new(IconCache::new(Arc::new(ShellIconResolver)));

    // Without the tap the window starts on screen.
    let start_visible = tap.is_none();
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([settings.panel_size.0, settings.panel_size.1])
        .with_visible(start_visible)
        .with_decorations(false)
        .with_always_on_top()
        .with_drag_and_drop(true);
    if !start_visible {
        viewport =
            viewport.with_position(egui::pos2(settings.offscreen_pos.0, settings.offscreen_pos.1));
    }

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let store_path = data_path(SHORTCUTS_FILE);
    eframe::run_native(
        "Shortcut Panel",
        native_options,
        Box::new(move |_cc| {
            Box::new(ShortcutPanel::new(
                settings, store, store_path, icons, gestures, tap,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!("shutting down");
    Ok(())
}
