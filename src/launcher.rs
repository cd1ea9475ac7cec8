use crate::shortcuts::{Shortcut, ShortcutKind};
use anyhow::bail;
use std::path::Path;

/// Open a shortcut: folders go to the file manager, everything else is
/// started with its own directory as the working directory.
pub fn launch(shortcut: &Shortcut) -> anyhow::Result<()> {
    let path = Path::new(&shortcut.path);
    if shortcut.path.trim().is_empty() || !path.exists() {
        bail!("path does not exist: {}", shortcut.path);
    }

    match shortcut.kind {
        ShortcutKind::Folder => open::that(path)?,
        ShortcutKind::Application => {
            let is_exe = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("exe"))
                .unwrap_or(false);
            if is_exe {
                let mut command = std::process::Command::new(path);
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    command.current_dir(dir);
                }
                command.spawn()?;
            } else {
                // Documents and links are handed to their associated program.
                open::that(path)?;
            }
        }
    }
    tracing::info!(name = %shortcut.name, path = %shortcut.path, "launched shortcut");
    Ok(())
}
