//! Errors reported back across a message channel.

use serde_json::Value;
use thiserror::Error;

use crate::codec::MethodResponse;
use crate::platform::PlatformError;

/// Wire code for malformed arguments.
pub const BAD_ARGS: &str = "BAD_ARGS";
/// Wire code for a failed wallpaper call.
pub const SET_FAILED: &str = "SET_FAILED";
/// Wire code when there is no screen to put a wallpaper on.
pub const NO_SCREEN: &str = "NO_SCREEN";

/// A path that cannot be handed to a wide-string Win32 API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("path contains a NUL character at byte {position}")]
pub struct InteriorNul {
    pub position: usize,
}

/// Failures a channel handler turns into an error reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Arguments were not a `{path: String}` mapping.
    #[error("Expected {{path: String}}")]
    BadArgs,
    /// The path string cannot be converted to the native encoding. The
    /// offending byte offset travels in the details.
    #[error("Expected {{path: String}}")]
    InvalidPath(#[from] InteriorNul),
    /// `SystemParametersInfoW` reported failure.
    #[error("SystemParametersInfoW returned FALSE")]
    SetFailed { code: i32 },
    /// `NSScreen.main` had no screen.
    #[error("NSScreen.main returned nil")]
    NoScreen,
    /// The desktop refused the image and said why.
    #[error("{0}")]
    Rejected(String),
}

impl From<PlatformError> for ChannelError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Win32 { code, .. } => ChannelError::SetFailed { code },
            PlatformError::NoScreen => ChannelError::NoScreen,
            PlatformError::Rejected(message) => ChannelError::Rejected(message),
        }
    }
}

impl ChannelError {
    pub fn code(&self) -> &'static str {
        match self {
            ChannelError::BadArgs | ChannelError::InvalidPath(_) => BAD_ARGS,
            ChannelError::SetFailed { .. } | ChannelError::Rejected(_) => SET_FAILED,
            ChannelError::NoScreen => NO_SCREEN,
        }
    }

    pub fn details(&self) -> Value {
        match self {
            ChannelError::SetFailed { code } => Value::from(*code),
            ChannelError::InvalidPath(nul) => Value::from(nul.position),
            _ => Value::Null,
        }
    }
}

impl From<ChannelError> for MethodResponse {
    fn from(err: ChannelError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: Some(err.to_string()),
            details: err.details(),
        }
    }
}
