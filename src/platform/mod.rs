//! OS seams used by the channel handlers.
//!
//! Handlers only talk to the traits below; `NativeDesktop` and `NativeProxy`
//! resolve to the Windows or macOS implementation, or to a portable fallback.

use std::io;

use thiserror::Error;

use crate::wallpaper::StyleMode;

#[cfg(not(windows))]
mod env_proxy;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(windows, target_os = "macos")))]
mod unsupported;
#[cfg(windows)]
mod win32;

#[cfg(not(windows))]
pub use env_proxy::EnvProxy as NativeProxy;
#[cfg(target_os = "macos")]
pub use macos::AppKitDesktop as NativeDesktop;
#[cfg(not(any(windows, target_os = "macos")))]
pub use unsupported::UnsupportedDesktop as NativeDesktop;
#[cfg(windows)]
pub use win32::{RegistryProxy as NativeProxy, Win32Desktop as NativeDesktop};

/// Why the desktop refused a wallpaper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub enum PlatformError {
    /// A Win32 call failed; `code` is the `GetLastError` value.
    #[error("{function} failed (error {code})")]
    Win32 { function: &'static str, code: i32 },
    /// There is no main screen to put the image on.
    #[error("no main screen")]
    NoScreen,
    /// The desktop rejected the request with a description.
    #[error("{0}")]
    Rejected(String),
}

/// Desktop configuration and wallpaper access.
pub trait DesktopBackend {
    /// Write a string value under the current user's desktop settings.
    fn write_desktop_value(&self, name: &str, value: &str) -> io::Result<()>;

    /// Apply a wallpaper from a NUL-terminated UTF-16 path, persisting and
    /// broadcasting the change. Backends without a settings store apply
    /// `style` with the image itself.
    fn set_desktop_wallpaper(
        &self,
        wide_path: &[u16],
        style: StyleMode,
    ) -> Result<(), PlatformError>;
}

impl<B: DesktopBackend + ?Sized> DesktopBackend for &B {
    fn write_desktop_value(&self, name: &str, value: &str) -> io::Result<()> {
        (**self).write_desktop_value(name, value)
    }

    fn set_desktop_wallpaper(
        &self,
        wide_path: &[u16],
        style: StyleMode,
    ) -> Result<(), PlatformError> {
        (**self).set_desktop_wallpaper(wide_path, style)
    }
}

/// Where the current user's proxy configuration comes from.
pub trait ProxySource {
    /// The raw proxy server setting, or `None` when no proxy is enabled.
    fn proxy_server(&self) -> io::Result<Option<String>>;
}

/// Recover the Win32 error code from an HRESULT.
///
/// `FACILITY_WIN32` results (`0x8007xxxx`) carry the code in the low word;
/// anything else is returned unchanged.
#[cfg_attr(not(windows), allow(dead_code))]
pub fn win32_code_from_hresult(hresult: i32) -> i32 {
    let bits = hresult as u32;
    if bits & 0xFFFF_0000 == 0x8007_0000 {
        (bits & 0xFFFF) as i32
    } else {
        hresult
    }
}
