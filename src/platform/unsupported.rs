//! Desktop backend for platforms without a wallpaper API binding.

use std::io;

use super::{DesktopBackend, PlatformError};
use crate::wallpaper::StyleMode;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDesktop;

impl DesktopBackend for UnsupportedDesktop {
    fn write_desktop_value(&self, _name: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "desktop settings are not available on this platform",
        ))
    }

    fn set_desktop_wallpaper(
        &self,
        _wide_path: &[u16],
        _style: StyleMode,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::Rejected(
            "setting the wallpaper is not supported on this platform".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_without_a_win32_code() {
        let err = UnsupportedDesktop
            .set_desktop_wallpaper(&[0], StyleMode::Fill)
            .unwrap_err();
        assert!(matches!(err, PlatformError::Rejected(_)));
        let err = UnsupportedDesktop
            .write_desktop_value("WallpaperStyle", "10")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
