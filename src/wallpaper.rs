//! The `setWallpaper` channel method and the style codes it writes.

use std::io;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::channel::MethodHandler;
use crate::codec::{MethodCall, MethodResponse};
use crate::error::{ChannelError, InteriorNul};
use crate::platform::DesktopBackend;

/// Method name served on the wallpaper channel.
pub const SET_WALLPAPER: &str = "setWallpaper";

const WALLPAPER_STYLE_VALUE: &str = "WallpaperStyle";
const TILE_WALLPAPER_VALUE: &str = "TileWallpaper";

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StyleMode {
    Fill,
    Fit,
    Stretch,
    Tile,
    Center,
    Span,
}

impl StyleMode {
    /// `(WallpaperStyle, TileWallpaper)` registry strings for this mode.
    pub fn registry_values(self) -> (&'static str, &'static str) {
        match self {
            StyleMode::Fill => ("10", "0"),
            StyleMode::Fit => ("6", "0"),
            StyleMode::Stretch => ("2", "0"),
            StyleMode::Tile => ("0", "1"),
            StyleMode::Center => ("0", "0"),
            StyleMode::Span => ("22", "0"),
        }
    }

    /// `NSWorkspace` image scaling and whether the image may be clipped.
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub fn appkit_options(self) -> (AppKitScaling, bool) {
        match self {
            StyleMode::Fill | StyleMode::Span => (AppKitScaling::ProportionallyUpOrDown, true),
            StyleMode::Fit => (AppKitScaling::ProportionallyUpOrDown, false),
            StyleMode::Stretch => (AppKitScaling::AxesIndependently, false),
            // AppKit cannot tile a desktop image.
            StyleMode::Tile | StyleMode::Center => (AppKitScaling::None, false),
        }
    }
}

/// `NSImageScaling` raw values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub enum AppKitScaling {
    AxesIndependently = 1,
    None = 2,
    ProportionallyUpOrDown = 3,
}

#[derive(Debug, Deserialize)]
struct SetWallpaperArgs {
    path: String,
}

fn parse_args(arguments: &Value) -> Result<SetWallpaperArgs, ChannelError> {
    // A JSON array would otherwise deserialize positionally into the struct.
    if !arguments.is_object() {
        return Err(ChannelError::BadArgs);
    }
    SetWallpaperArgs::deserialize(arguments).map_err(|_| ChannelError::BadArgs)
}

/// Encode a path as a NUL-terminated UTF-16 string.
pub fn to_wide_null(path: &str) -> Result<Vec<u16>, InteriorNul> {
    if let Some(position) = path.find('\0') {
        return Err(InteriorNul { position });
    }
    Ok(path.encode_utf16().chain(std::iter::once(0)).collect())
}

/// Run a side effect whose failure is logged and otherwise ignored.
///
/// Returns whether the attempt succeeded.
pub fn attempt(what: &str, op: impl FnOnce() -> io::Result<()>) -> bool {
    match op() {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "{what} failed; continuing");
            false
        }
    }
}

/// Write the style values, then apply the wallpaper.
pub fn apply_wallpaper<B: DesktopBackend + ?Sized>(
    backend: &B,
    path: &str,
    style: StyleMode,
) -> Result<(), ChannelError> {
    let wide_path = to_wide_null(path).inspect_err(|err| {
        warn!(error = %err, "rejecting wallpaper path");
    })?;

    let (style_code, tile) = style.registry_values();
    let style_saved = attempt("writing WallpaperStyle", || {
        backend.write_desktop_value(WALLPAPER_STYLE_VALUE, style_code)
    });
    let tile_saved = attempt("writing TileWallpaper", || {
        backend.write_desktop_value(TILE_WALLPAPER_VALUE, tile)
    });

    backend
        .set_desktop_wallpaper(&wide_path, style)
        .map_err(|err| {
            warn!(error = %err, path, "wallpaper was not applied");
            ChannelError::from(err)
        })?;
    info!(
        path,
        ?style,
        style_saved = style_saved && tile_saved,
        "wallpaper applied"
    );
    Ok(())
}

/// Handler for the wallpaper channel. Always applies in Fill mode.
#[derive(Debug)]
pub struct WallpaperHandler<B> {
    backend: B,
}

impl<B: DesktopBackend> WallpaperHandler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn set_wallpaper(&self, arguments: &Value) -> Result<(), ChannelError> {
        let args = parse_args(arguments)?;
        apply_wallpaper(&self.backend, &args.path, StyleMode::Fill)
    }
}

impl<B: DesktopBackend> MethodHandler for WallpaperHandler<B> {
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            SET_WALLPAPER => match self.set_wallpaper(&call.arguments) {
                Ok(()) => MethodResponse::success(true),
                Err(err) => err.into(),
            },
            _ => MethodResponse::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::platform::PlatformError;

    #[derive(Default)]
    struct FakeDesktop {
        writes: RefCell<Vec<(String, String)>>,
        applied: RefCell<Vec<Vec<u16>>>,
        styles: RefCell<Vec<StyleMode>>,
        fail_writes: bool,
        failure: Option<PlatformError>,
    }

    impl DesktopBackend for FakeDesktop {
        fn write_desktop_value(&self, name: &str, value: &str) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            self.writes
                .borrow_mut()
                .push((name.to_string(), value.to_string()));
            Ok(())
        }

        fn set_desktop_wallpaper(
            &self,
            wide_path: &[u16],
            style: StyleMode,
        ) -> Result<(), PlatformError> {
            self.applied.borrow_mut().push(wide_path.to_vec());
            self.styles.borrow_mut().push(style);
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn set_call(arguments: Value) -> MethodCall {
        MethodCall::new(SET_WALLPAPER, arguments)
    }

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    #[test]
    fn applies_wallpaper_and_replies_true() {
        let desktop = FakeDesktop::default();
        let handler = WallpaperHandler::new(&desktop);
        let reply = handler.handle(&set_call(json!({ "path": "C:\\images\\a.jpg" })));
        assert_eq!(reply, MethodResponse::Success(json!(true)));
        assert_eq!(*desktop.applied.borrow(), vec![wide("C:\\images\\a.jpg")]);
    }

    #[test]
    fn writes_fill_style_before_applying() {
        let desktop = FakeDesktop::default();
        WallpaperHandler::new(&desktop).handle(&set_call(json!({ "path": "C:\\a.jpg" })));
        assert_eq!(
            *desktop.writes.borrow(),
            vec![
                ("WallpaperStyle".to_string(), "10".to_string()),
                ("TileWallpaper".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn missing_path_is_bad_args_without_side_effects() {
        let desktop = FakeDesktop::default();
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "file": "a.jpg" })));
        assert_eq!(reply, MethodResponse::from(ChannelError::BadArgs));
        assert!(desktop.applied.borrow().is_empty());
        assert!(desktop.writes.borrow().is_empty());
    }

    #[test]
    fn non_mapping_payload_is_bad_args() {
        let desktop = FakeDesktop::default();
        let handler = WallpaperHandler::new(&desktop);
        for arguments in [json!("C:\\a.jpg"), json!(["C:\\a.jpg"]), Value::Null, json!(42)] {
            let reply = handler.handle(&set_call(arguments));
            assert_eq!(reply, MethodResponse::from(ChannelError::BadArgs));
        }
        assert!(desktop.applied.borrow().is_empty());
    }

    #[test]
    fn non_string_path_is_bad_args() {
        let desktop = FakeDesktop::default();
        let reply = WallpaperHandler::new(&desktop).handle(&set_call(json!({ "path": 7 })));
        assert_eq!(reply, MethodResponse::from(ChannelError::BadArgs));
    }

    #[test]
    fn interior_nul_is_rejected_before_any_write() {
        let desktop = FakeDesktop::default();
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "C:\\a\u{0}.jpg" })));
        assert_eq!(
            reply,
            MethodResponse::Error {
                code: "BAD_ARGS".into(),
                message: Some("Expected {path: String}".into()),
                details: json!(4),
            }
        );
        assert!(desktop.writes.borrow().is_empty());
        assert!(desktop.applied.borrow().is_empty());
    }

    #[test]
    fn platform_failure_is_set_failed_with_code() {
        let desktop = FakeDesktop {
            failure: Some(PlatformError::Win32 {
                function: "SystemParametersInfoW",
                code: 5,
            }),
            ..Default::default()
        };
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "C:\\a.jpg" })));
        assert_eq!(
            reply,
            MethodResponse::Error {
                code: "SET_FAILED".into(),
                message: Some("SystemParametersInfoW returned FALSE".into()),
                details: json!(5),
            }
        );
    }

    #[test]
    fn registry_failures_are_swallowed() {
        let desktop = FakeDesktop {
            fail_writes: true,
            ..Default::default()
        };
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "C:\\a.jpg" })));
        assert_eq!(reply, MethodResponse::success(true));
        assert_eq!(desktop.applied.borrow().len(), 1);
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let desktop = FakeDesktop::default();
        let handler = WallpaperHandler::new(&desktop);
        for arguments in [json!({ "path": "C:\\a.jpg" }), Value::Null, json!(1)] {
            let reply = handler.handle(&MethodCall::new("getWallpaper", arguments));
            assert_eq!(reply, MethodResponse::NotImplemented);
        }
        assert!(desktop.applied.borrow().is_empty());
    }

    #[test]
    fn repeated_calls_give_the_same_result() {
        let desktop = FakeDesktop::default();
        let handler = WallpaperHandler::new(&desktop);
        let call = set_call(json!({ "path": "C:\\images\\a.jpg" }));
        let first = handler.handle(&call);
        let second = handler.handle(&call);
        assert_eq!(first, second);
        assert_eq!(first, MethodResponse::success(true));
        assert_eq!(desktop.applied.borrow().len(), 2);
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let desktop = FakeDesktop::default();
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "C:\\a.jpg", "style": "fit" })));
        assert_eq!(reply, MethodResponse::success(true));
    }

    #[test]
    fn wide_conversion_handles_non_ascii() {
        let encoded = to_wide_null("C:\\Bilder\\Straße.png").unwrap();
        assert_eq!(encoded.last(), Some(&0));
        assert_eq!(
            String::from_utf16(&encoded[..encoded.len() - 1]).unwrap(),
            "C:\\Bilder\\Straße.png"
        );
        assert_eq!(to_wide_null("").unwrap(), vec![0]);
    }

    #[test]
    fn wide_conversion_reports_nul_position() {
        assert_eq!(to_wide_null("ab\0c"), Err(InteriorNul { position: 2 }));
    }

    #[test]
    fn attempt_reports_outcome() {
        assert!(attempt("ok", || Ok(())));
        assert!(!attempt("denied", || Err(io::Error::other("denied"))));
    }

    #[test]
    fn style_codes_match_windows_values() {
        assert_eq!(StyleMode::Fill.registry_values(), ("10", "0"));
        assert_eq!(StyleMode::Fit.registry_values(), ("6", "0"));
        assert_eq!(StyleMode::Stretch.registry_values(), ("2", "0"));
        assert_eq!(StyleMode::Tile.registry_values(), ("0", "1"));
        assert_eq!(StyleMode::Center.registry_values(), ("0", "0"));
        assert_eq!(StyleMode::Span.registry_values(), ("22", "0"));
    }

    #[test]
    fn missing_screen_is_reported_as_no_screen() {
        let desktop = FakeDesktop {
            failure: Some(PlatformError::NoScreen),
            ..Default::default()
        };
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "/Users/me/Pictures/a.jpg" })));
        assert_eq!(
            reply,
            MethodResponse::Error {
                code: "NO_SCREEN".into(),
                message: Some("NSScreen.main returned nil".into()),
                details: Value::Null,
            }
        );
    }

    #[test]
    fn desktop_rejection_keeps_its_description() {
        let desktop = FakeDesktop {
            failure: Some(PlatformError::Rejected("The file doesn't exist.".into())),
            ..Default::default()
        };
        let reply = WallpaperHandler::new(&desktop)
            .handle(&set_call(json!({ "path": "/Users/me/Pictures/gone.jpg" })));
        assert_eq!(
            reply,
            MethodResponse::Error {
                code: "SET_FAILED".into(),
                message: Some("The file doesn't exist.".into()),
                details: Value::Null,
            }
        );
    }

    #[test]
    fn channel_passes_fill_to_the_backend() {
        let desktop = FakeDesktop::default();
        WallpaperHandler::new(&desktop).handle(&set_call(json!({ "path": "/tmp/a.png" })));
        assert_eq!(*desktop.styles.borrow(), vec![StyleMode::Fill]);
    }

    #[test]
    fn fill_on_appkit_scales_proportionally_with_clipping() {
        assert_eq!(
            StyleMode::Fill.appkit_options(),
            (AppKitScaling::ProportionallyUpOrDown, true)
        );
        assert_eq!(
            StyleMode::Fit.appkit_options(),
            (AppKitScaling::ProportionallyUpOrDown, false)
        );
        assert_eq!(
            StyleMode::Stretch.appkit_options(),
            (AppKitScaling::AxesIndependently, false)
        );
        assert_eq!(AppKitScaling::ProportionallyUpOrDown as usize, 3);
    }

    #[test]
    fn direct_apply_uses_requested_style() {
        let desktop = FakeDesktop::default();
        apply_wallpaper(&desktop, "C:\\a.jpg", StyleMode::Tile).unwrap();
        assert_eq!(
            *desktop.writes.borrow(),
            vec![
                ("WallpaperStyle".to_string(), "0".to_string()),
                ("TileWallpaper".to_string(), "1".to_string()),
            ]
        );
    }
}
