use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SHORTCUTS_FILE: &str = "shortcuts.json";
pub const DEFAULT_CATEGORY: &str = "Default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortcutKind {
    Folder,
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub name: String,
    pub path: String,
    pub kind: ShortcutKind,
}

impl Shortcut {
    /// Build a shortcut for an existing path. Folders keep their full name,
    /// files drop the extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let is_dir = path.is_dir();
        let name = if is_dir {
            path.file_name()
        } else {
            path.file_stem()
        }
        .map(|n| n.to_string_lossy().into_owned())
        // Drive roots have no file name.
        .unwrap_or_else(|| path.display().to_string());

        Some(Self {
            name,
            path: path.to_string_lossy().into_owned(),
            kind: if is_dir {
                ShortcutKind::Folder
            } else {
                ShortcutKind::Application
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Shortcut>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

/// User-configured categories of shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutStore {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub selected_category: usize,
}

impl Default for ShortcutStore {
    fn default() -> Self {
        Self {
            categories: vec![Category::new(DEFAULT_CATEGORY)],
            auto_start: false,
            selected_category: 0,
        }
    }
}

impl ShortcutStore {
    /// Load from `path`. A missing or unreadable file yields the default store.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let mut store = if content.trim().is_empty() {
            Self::default()
        } else {
            match serde_json::from_str::<Self>(&content) {
                Ok(store) => store,
                Err(err) => {
                    tracing::warn!(?err, path, "invalid shortcuts file; starting empty");
                    Self::default()
                }
            }
        };
        store.normalize();
        store
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn normalize(&mut self) {
        if self.categories.is_empty() {
            self.categories.push(Category::new(DEFAULT_CATEGORY));
        }
        if self.selected_category >= self.categories.len() {
            self.selected_category = self.categories.len() - 1;
        }
    }

    pub fn selected(&self) -> Option<&Category> {
        self.categories.get(self.selected_category)
    }

    pub fn select(&mut self, idx: usize) -> bool {
        if idx < self.categories.len() {
            self.selected_category = idx;
            true
        } else {
            false
        }
    }

    pub fn add_category(&mut self, name: &str) -> usize {
        self.categories.push(Category::new(name.trim()));
        self.categories.len() - 1
    }

    /// Remove a category. The last remaining category is never removed.
    pub fn remove_category(&mut self, idx: usize) -> bool {
        if idx >= self.categories.len() || self.categories.len() <= 1 {
            return false;
        }
        self.categories.remove(idx);
        if self.selected_category >= self.categories.len() {
            self.selected_category = self.categories.len() - 1;
        }
        true
    }

    pub fn rename_category(&mut self, idx: usize, name: &str) -> bool {
        let name = name.trim();
        match self.categories.get_mut(idx) {
            Some(cat) if !name.is_empty() => {
                cat.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn add_item(&mut self, category: usize, item: Shortcut) -> bool {
        match self.categories.get_mut(category) {
            Some(cat) => {
                cat.items.push(item);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, category: usize, idx: usize) -> bool {
        match self.categories.get_mut(category) {
            Some(cat) if idx < cat.items.len() => {
                cat.items.remove(idx);
                true
            }
            _ => false,
        }
    }

    pub fn rename_item(&mut self, category: usize, idx: usize, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self
            .categories
            .get_mut(category)
            .and_then(|cat| cat.items.get_mut(idx))
        {
            Some(item) => {
                item.name = name.to_string();
                true
            }
            None => false,
        }
    }
}
