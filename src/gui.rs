use crate::autostart;
use crate::dispatch::GestureReceiver;
use crate::gesture::PointerTap;
use crate::icon::{CacheKey, IconCache};
use crate::launcher::launch;
use crate::settings::Settings;
use crate::shortcuts::{Shortcut, ShortcutKind, ShortcutStore};
use crate::visibility::{apply_visibility, panel_position, ViewportCtx};
use crate::win_util::{cursor_position, primary_screen_size};
use eframe::egui;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How often the UI wakes up to look for gestures while idle.
pub const GESTURE_POLL_INTERVAL: Duration = Duration::from_millis(50);

const ICON_SIZE: f32 = 32.0;
const TILE_SIZE: egui::Vec2 = egui::vec2(96.0, 72.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameTarget {
    Category(usize),
    Item { category: usize, index: usize },
}

struct RenameDialog {
    target: RenameTarget,
    text: String,
    focus_requested: bool,
}

enum PanelAction {
    Launch(Shortcut),
    RemoveItem(usize),
    RenameItem(usize),
    SelectCategory(usize),
    RemoveCategory(usize),
    RenameCategory(usize),
}

pub struct ShortcutPanel {
    settings: Settings,
    store: ShortcutStore,
    store_path: String,
    icons: Arc<IconCache>,
    textures: HashMap<CacheKey, egui::TextureHandle>,
    gestures: GestureReceiver,
    tap: Option<PointerTap>,
    visible: bool,
    started: bool,
    focus_seen: bool,
    status: Option<String>,
    rename: Option<RenameDialog>,
    new_category: Option<String>,
}

impl ShortcutPanel {
    pub fn new(
        settings: Settings,
        store: ShortcutStore,
        store_path: String,
        icons: Arc<IconCache>,
        gestures: GestureReceiver,
        tap: Option<PointerTap>,
    ) -> Self {
        Self {
            settings,
            store,
            store_path,
            icons,
            textures: HashMap::new(),
            gestures,
            tap,
            visible: false,
            started: false,
            focus_seen: false,
            status: None,
            rename: None,
            new_category: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn store(&self) -> &ShortcutStore {
        &self.store
    }

    pub fn gestures_enabled(&self) -> bool {
        self.tap.as_ref().map(|t| t.is_installed()).unwrap_or(false)
    }

    /// Apply every gesture queued by the pointer tap, in order.
    ///
    /// Also reports faults and overflows recorded on the hook thread, since
    /// that thread is not allowed to log.
    pub fn process_gestures<C: ViewportCtx>(&mut self, ctx: &C) -> usize {
        if !self.started {
            self.started = true;
            // Without the tap nothing else can bring the window up.
            if !self.gestures_enabled() {
                tracing::info!("middle double-click unavailable; showing panel at startup");
                self.set_visible(true, ctx);
            }
        }
        if let Some(tap) = &self.tap {
            let faults = tap.take_faults();
            if faults > 0 {
                tracing::warn!(faults, "pointer tap swallowed callback faults");
            }
            let missed = tap.take_missed();
            if missed > 0 {
                tracing::warn!(missed, "middle presses skipped while detector was busy");
            }
        }
        let dropped = self.gestures.take_dropped();
        if dropped > 0 {
            tracing::warn!(dropped, "gesture queue full; toggles discarded");
        }

        let events = self.gestures.drain();
        for _ in &events {
            self.toggle_visibility(ctx);
        }
        events.len()
    }

    pub fn toggle_visibility<C: ViewportCtx>(&mut self, ctx: &C) {
        self.set_visible(!self.visible, ctx);
    }

    pub fn set_visible<C: ViewportCtx>(&mut self, visible: bool, ctx: &C) {
        self.visible = visible;
        self.focus_seen = false;
        let pos = if visible {
            cursor_position().map(|(x, y)| {
                panel_position(
                    (x as f32, y as f32),
                    self.settings.panel_size,
                    primary_screen_size().map(|(w, h)| (w as f32, h as f32)),
                )
            })
        } else {
            None
        };
        tracing::debug!(visible, ?pos, "panel visibility updated");
        apply_visibility(visible, ctx, pos, self.settings.offscreen_pos);
    }

    /// Get the panel out of the way. Without the tap a hidden panel could
    /// never come back, so it is only minimised.
    pub fn dismiss<C: ViewportCtx>(&mut self, ctx: &C) {
        if self.gestures_enabled() {
            self.set_visible(false, ctx);
        } else {
            self.focus_seen = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
        }
    }

    /// Add each existing path as a shortcut in the selected category.
    pub fn add_dropped_paths<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let category = self.store.selected_category;
        let mut added = 0;
        for path in paths {
            match Shortcut::from_path(&path) {
                Some(item) => {
                    tracing::info!(path = %path.display(), "adding shortcut");
                    if self.store.add_item(category, item) {
                        added += 1;
                    }
                }
                None => tracing::warn!(path = %path.display(), "dropped path does not exist"),
            }
        }
        if added > 0 {
            self.save_store();
        }
        added
    }

    /// Forget all cached icons so they are fetched from the shell again.
    pub fn refresh_icons(&mut self) {
        self.icons.clear();
        self.textures.clear();
    }

    fn save_store(&mut self) {
        if let Err(err) = self.store.save(&self.store_path) {
            tracing::error!(?err, path = %self.store_path, "failed to save shortcuts");
            self.status = Some(format!("Failed to save shortcuts: {err}"));
        }
    }

    fn icon_texture(&mut self, ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
        let key = CacheKey::new(Path::new(path));
        if let Some(tex) = self.textures.get(&key) {
            return Some(tex.clone());
        }
        let icon = self.icons.get_or_resolve(path)?;
        let tex = ctx.load_texture(
            key.as_str(),
            icon.to_color_image(),
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(key, tex.clone());
        Some(tex)
    }

    fn handle_focus(&mut self, ctx: &egui::Context) {
        if !self.visible || !self.settings.hide_on_focus_loss {
            return;
        }
        match ctx.input(|i| i.viewport().focused) {
            Some(true) => self.focus_seen = true,
            Some(false) if self.focus_seen => self.dismiss(ctx),
            _ => {}
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_dropped_paths(dropped);
        }
    }

    fn apply_action(&mut self, action: PanelAction, ctx: &egui::Context) {
        let category = self.store.selected_category;
        match action {
            PanelAction::Launch(item) => match launch(&item) {
                Ok(()) => {
                    self.status = None;
                    self.dismiss(ctx);
                }
                Err(err) => {
                    tracing::error!(?err, path = %item.path, "failed to launch shortcut");
                    self.status = Some(format!("Failed to open {}: {err}", item.name));
                }
            },
            PanelAction::RemoveItem(index) => {
                if self.store.remove_item(category, index) {
                    self.save_store();
                }
            }
            PanelAction::RenameItem(index) => {
                let text = self
                    .store
                    .selected()
                    .and_then(|c| c.items.get(index))
                    .map(|i| i.name.clone())
                    .unwrap_or_default();
                self.rename = Some(RenameDialog {
                    target: RenameTarget::Item { category, index },
                    text,
                    focus_requested: false,
                });
            }
            PanelAction::SelectCategory(idx) => {
                if self.store.select(idx) {
                    self.save_store();
                }
            }
            PanelAction::RemoveCategory(idx) => {
                if self.store.remove_category(idx) {
                    self.save_store();
                } else {
                    self.status = Some("At least one category must remain".into());
                }
            }
            PanelAction::RenameCategory(idx) => {
                let text = self
                    .store
                    .categories
                    .get(idx)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                self.rename = Some(RenameDialog {
                    target: RenameTarget::Category(idx),
                    text,
                    focus_requested: false,
                });
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Panel", |ui| {
                    if ui.button("New category").clicked() {
                        self.new_category = Some(String::new());
                        ui.close_menu();
                    }
                    if ui.button("Refresh icons").clicked() {
                        self.refresh_icons();
                        ui.close_menu();
                    }
                    let mut auto_start = self.store.auto_start;
                    if ui.checkbox(&mut auto_start, "Start with Windows").changed() {
                        match autostart::set_enabled(auto_start) {
                            Ok(state) => {
                                self.store.auto_start = state;
                                self.save_store();
                            }
                            Err(err) => {
                                tracing::error!(?err, "failed to change autostart");
                                self.status = Some(format!("Autostart: {err}"));
                            }
                        }
                    }
                    ui.separator();
                    if ui.button("Hide").clicked() {
                        ui.close_menu();
                        self.dismiss(ctx);
                    }
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                if !self.gestures_enabled() {
                    ui.label("(middle double-click unavailable)");
                }
            });
        });
    }

    fn category_list(&mut self, ctx: &egui::Context) -> Option<PanelAction> {
        let mut action = None;
        egui::SidePanel::left("categories")
            .resizable(false)
            .default_width(140.0)
            .show(ctx, |ui| {
                for (idx, cat) in self.store.categories.iter().enumerate() {
                    let selected = idx == self.store.selected_category;
                    let resp = ui.selectable_label(selected, &cat.name);
                    if resp.clicked() {
                        action = Some(PanelAction::SelectCategory(idx));
                    }
                    resp.context_menu(|ui| {
                        if ui.button("Rename").clicked() {
                            action = Some(PanelAction::RenameCategory(idx));
                            ui.close_menu();
                        }
                        if ui.button("Delete").clicked() {
                            action = Some(PanelAction::RemoveCategory(idx));
                            ui.close_menu();
                        }
                    });
                }
            });
        action
    }

    fn shortcut_grid(&mut self, ctx: &egui::Context) -> Option<PanelAction> {
        let items: Vec<Shortcut> = self
            .store
            .selected()
            .map(|c| c.items.clone())
            .unwrap_or_default();
        let textures: Vec<Option<egui::TextureHandle>> = items
            .iter()
            .map(|item| self.icon_texture(ctx, &item.path))
            .collect();

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::RED, status);
            }
            if items.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Drop files or folders here to add shortcuts");
                });
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (idx, (item, tex)) in items.iter().zip(&textures).enumerate() {
                        let button = match tex {
                            Some(tex) => egui::Button::image_and_text(
                                egui::Image::new(tex)
                                    .fit_to_exact_size(egui::vec2(ICON_SIZE, ICON_SIZE)),
                                &item.name,
                            ),
                            None => {
                                let glyph = match item.kind {
                                    ShortcutKind::Folder => "📁",
                                    ShortcutKind::Application => "📄",
                                };
                                egui::Button::new(format!("{glyph}\n{}", item.name))
                            }
                        };
                        let resp = ui.add(button.min_size(TILE_SIZE)).on_hover_text(&item.path);
                        if resp.clicked() {
                            action = Some(PanelAction::Launch(item.clone()));
                        }
                        resp.context_menu(|ui| {
                            if ui.button("Rename").clicked() {
                                action = Some(PanelAction::RenameItem(idx));
                                ui.close_menu();
                            }
                            if ui.button("Delete").clicked() {
                                action = Some(PanelAction::RemoveItem(idx));
                                ui.close_menu();
                            }
                        });
                    }
                });
            });
        });
        action
    }

    fn new_category_dialog(&mut self, ctx: &egui::Context) {
        let Some(name) = self.new_category.as_mut() else {
            return;
        };
        let mut close = false;
        let mut confirm = false;
        egui::Window::new("Add category")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Category name:");
                ui.text_edit_singleline(name).request_focus();
                ui.horizontal(|ui| {
                    confirm = ui.button("OK").clicked();
                    close = ui.button("Cancel").clicked();
                });
            });
        let (enter, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if confirm || enter {
            let name = name.trim().to_string();
            if !name.is_empty() {
                let idx = self.store.add_category(&name);
                self.store.select(idx);
                self.save_store();
            }
            close = true;
        }
        if close || escape {
            self.new_category = None;
        }
    }

    fn rename_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.rename.as_mut() else {
            return;
        };
        let mut close = false;
        let mut confirm = false;
        egui::Window::new("Rename")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("New name:");
                let resp = ui.text_edit_singleline(&mut dialog.text);
                if !dialog.focus_requested {
                    resp.request_focus();
                    dialog.focus_requested = true;
                }
                ui.horizontal(|ui| {
                    confirm = ui.button("OK").clicked();
                    close = ui.button("Cancel").clicked();
                });
            });
        let (enter, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if confirm || enter {
            let target = dialog.target;
            let text = dialog.text.clone();
            let changed = match target {
                RenameTarget::Category(idx) => self.store.rename_category(idx, &text),
                RenameTarget::Item { category, index } => {
                    self.store.rename_item(category, index, &text)
                }
            };
            if changed {
                self.save_store();
            }
            close = true;
        }
        if close || escape {
            self.rename = None;
        }
    }
}

impl eframe::App for ShortcutPanel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_gestures(ctx);
        self.handle_focus(ctx);
        self.handle_dropped_files(ctx);

        self.menu_bar(ctx);
        if let Some(action) = self.category_list(ctx) {
            self.apply_action(action, ctx);
        }
        if let Some(action) = self.shortcut_grid(ctx) {
            self.apply_action(action, ctx);
        }
        self.new_category_dialog(ctx);
        self.rename_dialog(ctx);

        ctx.request_repaint_after(GESTURE_POLL_INTERVAL);
    }
}
