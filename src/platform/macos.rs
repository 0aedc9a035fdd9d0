//! macOS backend: `NSWorkspace` desktop images on the main screen.

use std::io;

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_app_kit::{
    NSScreen, NSWorkspace, NSWorkspaceDesktopImageAllowClippingKey,
    NSWorkspaceDesktopImageScalingKey,
};
use objc2_foundation::{MainThreadMarker, NSDictionary, NSNumber, NSString, NSURL};

use super::{DesktopBackend, PlatformError};
use crate::wallpaper::StyleMode;

#[derive(Debug, Default, Clone, Copy)]
pub struct AppKitDesktop;

impl DesktopBackend for AppKitDesktop {
    fn write_desktop_value(&self, _name: &str, _value: &str) -> io::Result<()> {
        // Scaling is passed with the image options; there is no store to write.
        Ok(())
    }

    fn set_desktop_wallpaper(
        &self,
        wide_path: &[u16],
        style: StyleMode,
    ) -> Result<(), PlatformError> {
        let path = String::from_utf16_lossy(wide_path.strip_suffix(&[0]).unwrap_or(wide_path));
        let Some(mtm) = MainThreadMarker::new() else {
            return Err(PlatformError::Rejected(
                "desktop images can only be set from the main thread".to_string(),
            ));
        };
        // SAFETY: called on the main thread, as `mtm` proves.
        let Some(screen) = (unsafe { NSScreen::mainScreen(mtm) }) else {
            return Err(PlatformError::NoScreen);
        };

        let (scaling, allow_clipping) = style.appkit_options();
        let url = unsafe { NSURL::fileURLWithPath(&NSString::from_str(&path)) };
        // SAFETY: the option keys are immutable AppKit constants.
        let keys = unsafe {
            [
                NSWorkspaceDesktopImageScalingKey,
                NSWorkspaceDesktopImageAllowClippingKey,
            ]
        };
        let options = NSDictionary::from_vec(
            &keys,
            vec![
                into_object(NSNumber::new_usize(scaling as usize)),
                into_object(NSNumber::new_bool(allow_clipping)),
            ],
        );

        // SAFETY: every argument is a live, retained object and the option
        // values have the types AppKit documents for their keys.
        unsafe {
            NSWorkspace::sharedWorkspace().setDesktopImageURL_forScreen_options_error(
                &url, &screen, &options,
            )
        }
        .map_err(|err| PlatformError::Rejected(unsafe { err.localizedDescription() }.to_string()))
    }
}

fn into_object(number: Retained<NSNumber>) -> Retained<AnyObject> {
    Retained::into_super(Retained::into_super(Retained::into_super(number)))
}
