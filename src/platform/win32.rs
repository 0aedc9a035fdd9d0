//! Windows backends: `HKCU` registry values and `SystemParametersInfoW`.

use std::io;

use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;
use windows::Win32::UI::WindowsAndMessaging::{
    SystemParametersInfoW, SPI_SETDESKWALLPAPER, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE,
};

use super::{win32_code_from_hresult, DesktopBackend, PlatformError, ProxySource};
use crate::wallpaper::StyleMode;

/// Per-user desktop settings key.
const DESKTOP_KEY: &str = "Control Panel\\Desktop";
/// Per-user WinINet proxy settings key.
const INTERNET_SETTINGS_KEY: &str =
    "Software\\Microsoft\\Windows\\CurrentVersion\\Internet Settings";

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Desktop;

impl DesktopBackend for Win32Desktop {
    fn write_desktop_value(&self, name: &str, value: &str) -> io::Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        // The key handle is closed when `desktop` drops.
        let desktop = hkcu.open_subkey_with_flags(DESKTOP_KEY, KEY_SET_VALUE)?;
        desktop.set_value(name, &value)
    }

    fn set_desktop_wallpaper(
        &self,
        wide_path: &[u16],
        _style: StyleMode,
    ) -> Result<(), PlatformError> {
        debug_assert_eq!(wide_path.last(), Some(&0));
        // SAFETY: `wide_path` is NUL-terminated and outlives the call; the
        // API only reads through the pointer for SPI_SETDESKWALLPAPER.
        unsafe {
            SystemParametersInfoW(
                SPI_SETDESKWALLPAPER,
                0,
                Some(wide_path.as_ptr() as *mut _),
                SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
            )
        }
        .map_err(|err| PlatformError::Win32 {
            function: "SystemParametersInfoW",
            code: win32_code_from_hresult(err.code().0),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryProxy;

impl ProxySource for RegistryProxy {
    fn proxy_server(&self) -> io::Result<Option<String>> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let settings = hkcu.open_subkey_with_flags(INTERNET_SETTINGS_KEY, KEY_QUERY_VALUE)?;
        let enabled = match settings.get_value::<u32, _>("ProxyEnable") {
            Ok(flag) => flag != 0,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => return Err(err),
        };
        if !enabled {
            return Ok(None);
        }
        match settings.get_value::<String, _>("ProxyServer") {
            Ok(server) => Ok(Some(server)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}
