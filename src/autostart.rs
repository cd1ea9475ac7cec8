//! Run-at-login registration under
//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Run`.

#[cfg(windows)]
use anyhow::anyhow;

pub const APP_NAME: &str = "ShortcutPanel";

#[cfg(windows)]
const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

#[cfg(windows)]
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(windows)]
struct RunKey(windows::Win32::System::Registry::HKEY);

#[cfg(windows)]
impl RunKey {
    fn open(write: bool) -> anyhow::Result<Self> {
        use windows::core::PCWSTR;
        use windows::Win32::System::Registry::{
            RegOpenKeyExW, HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE,
        };

        let path = wide(RUN_KEY);
        let access = if write { KEY_READ | KEY_WRITE } else { KEY_READ };
        let mut key = HKEY::default();
        unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, PCWSTR(path.as_ptr()), 0, access, &mut key) }
            .ok()
            .map_err(|e| anyhow!(e))?;
        Ok(Self(key))
    }
}

#[cfg(windows)]
impl Drop for RunKey {
    fn drop(&mut self) {
        unsafe {
            let _ = windows::Win32::System::Registry::RegCloseKey(self.0);
        }
    }
}

#[cfg(windows)]
pub fn is_enabled() -> bool {
    use windows::core::PCWSTR;
    use windows::Win32::System::Registry::RegQueryValueExW;

    let Ok(key) = RunKey::open(false) else {
        return false;
    };
    let name = wide(APP_NAME);
    unsafe { RegQueryValueExW(key.0, PCWSTR(name.as_ptr()), None, None, None, None) }.is_ok()
}

#[cfg(windows)]
pub fn enable() -> anyhow::Result<()> {
    use windows::core::PCWSTR;
    use windows::Win32::System::Registry::{RegSetValueExW, REG_SZ};

    let exe = std::env::current_exe()?;
    let value = wide(&format!("\"{}\"", exe.display()));
    let bytes: Vec<u8> = value.iter().flat_map(|c| c.to_le_bytes()).collect();
    let key = RunKey::open(true)?;
    let name = wide(APP_NAME);
    unsafe { RegSetValueExW(key.0, PCWSTR(name.as_ptr()), 0, REG_SZ, Some(&bytes)) }
        .ok()
        .map_err(|e| anyhow!(e))?;
    tracing::info!(exe = %exe.display(), "autostart enabled");
    Ok(())
}

#[cfg(windows)]
pub fn disable() -> anyhow::Result<()> {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::ERROR_FILE_NOT_FOUND;
    use windows::Win32::System::Registry::RegDeleteValueW;

    let key = RunKey::open(true)?;
    let name = wide(APP_NAME);
    let status = unsafe { RegDeleteValueW(key.0, PCWSTR(name.as_ptr())) };
    if status.is_err() && status != ERROR_FILE_NOT_FOUND {
        return Err(anyhow!(status.to_hresult()));
    }
    tracing::info!("autostart disabled");
    Ok(())
}

#[cfg(not(windows))]
pub fn is_enabled() -> bool {
    false
}

#[cfg(not(windows))]
pub fn enable() -> anyhow::Result<()> {
    anyhow::bail!("autostart is only supported on Windows")
}

#[cfg(not(windows))]
pub fn disable() -> anyhow::Result<()> {
    anyhow::bail!("autostart is only supported on Windows")
}

/// Bring the registry in line with `wanted`, returning the resulting state.
pub fn set_enabled(wanted: bool) -> anyhow::Result<bool> {
    if wanted {
        enable()?;
    } else {
        disable()?;
    }
    Ok(is_enabled())
}
