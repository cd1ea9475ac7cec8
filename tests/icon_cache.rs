use shortcut_panel::icon::{IconCache, IconImage, IconResolver, SharedIcon};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// Resolves any existing path to a 1x1 icon and counts calls.
#[derive(Default)]
struct CountingResolver {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl CountingResolver {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IconResolver for CountingResolver {
    fn resolve(&self, path: &Path) -> Option<SharedIcon> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) || !path.exists() {
            return None;
        }
        IconImage::from_rgba(1, 1, vec![10, 20, 30, 255]).map(Arc::new)
    }
}

fn cache() -> (Arc<CountingResolver>, IconCache) {
    let resolver = Arc::new(CountingResolver::default());
    let cache = IconCache::new(resolver.clone());
    (resolver, cache)
}

#[test]
fn second_lookup_is_a_hit() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("tool.exe");
    std::fs::write(&file, b"").unwrap();
    let (resolver, cache) = cache();

    let first = cache.get_or_resolve(&file).unwrap();
    let second = cache.get_or_resolve(&file).unwrap();

    assert_eq!(resolver.calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn missing_path_is_not_cached() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone.exe");
    let (resolver, cache) = cache();

    assert!(cache.get_or_resolve(&missing).is_none());
    assert!(cache.get_or_resolve(&missing).is_none());

    assert_eq!(resolver.calls(), 2);
    assert!(cache.is_empty());
    assert!(!cache.contains(&missing));
}

#[test]
fn failure_is_retried_later() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("locked.exe");
    std::fs::write(&file, b"").unwrap();
    let (resolver, cache) = cache();

    resolver.fail.store(true, Ordering::SeqCst);
    assert!(cache.get_or_resolve(&file).is_none());

    resolver.fail.store(false, Ordering::SeqCst);
    assert!(cache.get_or_resolve(&file).is_some());
    assert_eq!(resolver.calls(), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn clear_forces_one_more_resolution() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("app.exe");
    std::fs::write(&file, b"").unwrap();
    let (resolver, cache) = cache();

    let before = cache.get_or_resolve(&file).unwrap();
    cache.clear();
    assert!(cache.is_empty());

    let after = cache.get_or_resolve(&file).unwrap();
    cache.get_or_resolve(&file).unwrap();

    assert_eq!(resolver.calls(), 2);
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn case_and_trailing_separator_share_entry() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("projects");
    std::fs::create_dir(&folder).unwrap();
    let (resolver, cache) = cache();

    let plain = cache.get_or_resolve(&folder).unwrap();
    let with_slash = format!("{}{}", folder.display(), std::path::MAIN_SEPARATOR);
    let from_slash = cache.get_or_resolve(&with_slash).unwrap();
    let upper = folder.to_string_lossy().to_uppercase();
    let from_upper = cache.get_or_resolve(&upper).unwrap();

    assert_eq!(resolver.calls(), 1);
    assert!(Arc::ptr_eq(&plain, &from_slash));
    assert!(Arc::ptr_eq(&plain, &from_upper));
}

#[test]
fn empty_path_is_absent_without_resolving() {
    let (resolver, cache) = cache();
    assert!(cache.get_or_resolve("").is_none());
    assert_eq!(resolver.calls(), 0);
}
