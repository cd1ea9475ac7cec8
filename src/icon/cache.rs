use crate::icon::resolver::{IconResolver, SharedIcon};
use std::collections::HashMap;
use std::path::{is_separator, Path};
use std::sync::{Arc, Mutex, MutexGuard};

/// Identity of a cached icon: absolute, case-folded, no trailing separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(path: &Path) -> Self {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let folded = absolute.to_string_lossy().to_lowercase();
        Self(trim_trailing_separators(&folded).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn trim_trailing_separators(s: &str) -> &str {
    let trimmed = s.trim_end_matches(is_separator);
    if trimmed.len() == s.len() {
        return s;
    }
    // Keep the separator that makes "/" or "c:\" a root.
    if trimmed.is_empty() || trimmed.ends_with(':') {
        &s[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Memoising front for an [`IconResolver`].
///
/// Only successful resolutions are stored, so a path that failed once is
/// retried on the next lookup. Entries live until [`clear`](Self::clear).
pub struct IconCache {
    resolver: Arc<dyn IconResolver>,
    entries: Mutex<HashMap<CacheKey, SharedIcon>>,
}

impl IconCache {
    pub fn new(resolver: Arc<dyn IconResolver>) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, SharedIcon>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_or_resolve(&self, path: impl AsRef<Path>) -> Option<SharedIcon> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return None;
        }
        let key = CacheKey::new(path);
        if let Some(hit) = self.entries().get(&key) {
            return Some(Arc::clone(hit));
        }

        // Resolve without holding the lock; the shell calls can be slow.
        let Some(icon) = self.resolver.resolve(path) else {
            tracing::debug!(path = %path.display(), "no icon for path");
            return None;
        };

        let mut entries = self.entries();
        // A concurrent caller may have won the race; hand out its entry.
        let stored = entries.entry(key).or_insert(icon);
        Some(Arc::clone(stored))
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries().contains_key(&CacheKey::new(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every entry. The next lookup for any path resolves from scratch.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        tracing::debug!(count, "icon cache cleared");
    }
}
