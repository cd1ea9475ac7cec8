use eframe::egui;
use image::RgbaImage;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Decoded icon pixels (straight RGBA). Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pixels: RgbaImage,
}

/// Shared, immutable icon as handed out by resolvers and the cache.
pub type SharedIcon = Arc<IconImage>;

impl IconImage {
    /// Build from a tightly packed RGBA buffer. Returns `None` on a size mismatch.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        RgbaImage::from_raw(width, height, rgba).map(|pixels| Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn rgba(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.rgba(),
        )
    }
}

/// Turns a filesystem path into an icon.
///
/// Resolution failures are not errors: missing files, locked files and paths
/// the shell has no icon for all yield `None`.
pub trait IconResolver: Send + Sync {
    fn resolve(&self, path: &Path) -> Option<SharedIcon>;
}

/// Resolver backed by the Windows shell.
///
/// Tries the shell's file-info icon first and falls back to extracting the
/// first icon embedded in the file itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellIconResolver;

impl IconResolver for ShellIconResolver {
    fn resolve(&self, path: &Path) -> Option<SharedIcon> {
        if path.as_os_str().is_empty() || !path.exists() {
            return None;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| shell::resolve(path))) {
            Ok(icon) => icon.map(Arc::new),
            Err(_) => {
                tracing::warn!(path = %path.display(), "icon resolution panicked");
                None
            }
        }
    }
}

#[cfg(windows)]
mod shell {
    use super::IconImage;
    use std::ffi::c_void;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;
    use windows::core::PCWSTR;
    use windows::Win32::Graphics::Gdi::{
        CreateCompatibleDC, DeleteDC, DeleteObject, GetDIBits, GetObjectW, BITMAP, BITMAPINFO,
        BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
    };
    use windows::Win32::Storage::FileSystem::FILE_FLAGS_AND_ATTRIBUTES;
    use windows::Win32::UI::Shell::{
        ExtractIconExW, SHGetFileInfoW, SHFILEINFOW, SHGFI_ICON, SHGFI_LARGEICON,
    };
    use windows::Win32::UI::WindowsAndMessaging::{DestroyIcon, GetIconInfo, HICON, ICONINFO};

    /// Icon handle destroyed on drop, whatever path leaves the scope.
    struct OwnedIcon(HICON);

    impl Drop for OwnedIcon {
        fn drop(&mut self) {
            unsafe {
                let _ = DestroyIcon(self.0);
            }
        }
    }

    struct OwnedBitmap(HBITMAP);

    impl Drop for OwnedBitmap {
        fn drop(&mut self) {
            if !self.0 .0.is_null() {
                unsafe {
                    let _ = DeleteObject(HGDIOBJ(self.0 .0));
                }
            }
        }
    }

    struct MemoryDc(HDC);

    impl Drop for MemoryDc {
        fn drop(&mut self) {
            unsafe {
                let _ = DeleteDC(self.0);
            }
        }
    }

    fn wide(path: &Path) -> Vec<u16> {
        path.as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    pub(super) fn resolve(path: &Path) -> Option<IconImage> {
        let wide = wide(path);

        if let Some(icon) = file_info_icon(&wide) {
            if let Some(image) = icon_to_image(&icon) {
                return Some(image);
            }
        }

        if path.is_file() {
            if let Some(icon) = extracted_icon(&wide) {
                return icon_to_image(&icon);
            }
        }

        None
    }

    fn file_info_icon(wide: &[u16]) -> Option<OwnedIcon> {
        let mut info = SHFILEINFOW::default();
        let result = unsafe {
            SHGetFileInfoW(
                PCWSTR(wide.as_ptr()),
                FILE_FLAGS_AND_ATTRIBUTES(0),
                Some(&mut info as *mut SHFILEINFOW),
                std::mem::size_of::<SHFILEINFOW>() as u32,
                SHGFI_ICON | SHGFI_LARGEICON,
            )
        };
        if result == 0 || info.hIcon.0.is_null() {
            return None;
        }
        Some(OwnedIcon(info.hIcon))
    }

    fn extracted_icon(wide: &[u16]) -> Option<OwnedIcon> {
        let mut large = HICON::default();
        let count = unsafe {
            ExtractIconExW(
                PCWSTR(wide.as_ptr()),
                0,
                Some(&mut large as *mut HICON),
                None,
                1,
            )
        };
        if count == 0 || large.0.is_null() {
            return None;
        }
        Some(OwnedIcon(large))
    }

    fn icon_to_image(icon: &OwnedIcon) -> Option<IconImage> {
        let mut info = ICONINFO::default();
        unsafe { GetIconInfo(icon.0, &mut info) }.ok()?;
        // GetIconInfo hands us copies of both bitmaps; both must be deleted.
        let color = OwnedBitmap(info.hbmColor);
        let _mask = OwnedBitmap(info.hbmMask);
        if color.0 .0.is_null() {
            return None;
        }

        let mut bitmap = BITMAP::default();
        let written = unsafe {
            GetObjectW(
                HGDIOBJ(color.0 .0),
                std::mem::size_of::<BITMAP>() as i32,
                Some(&mut bitmap as *mut BITMAP as *mut c_void),
            )
        };
        if written == 0 {
            return None;
        }
        let width = bitmap.bmWidth;
        let height = bitmap.bmHeight.abs();
        if width <= 0 || height <= 0 {
            return None;
        }

        let mut header = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height requests a top-down DIB.
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let dc = MemoryDc(unsafe { CreateCompatibleDC(None) });
        if dc.0 .0.is_null() {
            return None;
        }

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        let lines = unsafe {
            GetDIBits(
                dc.0,
                color.0,
                0,
                height as u32,
                Some(pixels.as_mut_ptr() as *mut c_void),
                &mut header,
                DIB_RGB_COLORS,
            )
        };
        if lines == 0 {
            return None;
        }

        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        // Legacy icons carry no alpha channel at all.
        if pixels.chunks_exact(4).all(|px| px[3] == 0) {
            for px in pixels.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }

        IconImage::from_rgba(width as u32, height as u32, pixels)
    }
}

#[cfg(not(windows))]
mod shell {
    use super::IconImage;
    use std::path::Path;

    pub(super) fn resolve(_path: &Path) -> Option<IconImage> {
        None
    }
}
