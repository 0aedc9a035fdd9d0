//! Named method channels and the messenger that routes messages to them.

use std::collections::HashMap;

use tracing::{debug, debug_span, warn};

use crate::codec::{self, MethodCall, MethodResponse};

/// Default prefix shared by every channel name.
pub const DEFAULT_CHANNEL_PREFIX: &str = "com.example.yol_app";
/// Suffix of the wallpaper channel.
pub const WALLPAPER_CHANNEL: &str = "wallpaper";
/// Suffix of the system information channel.
pub const SYSTEM_CHANNEL: &str = "system";

/// Join a prefix and a channel suffix, e.g. `com.example.yol_app/wallpaper`.
pub fn channel_name(prefix: &str, suffix: &str) -> String {
    format!("{}/{suffix}", prefix.trim_end_matches('/'))
}

/// Answers every call on one channel with exactly one reply.
pub trait MethodHandler {
    fn handle(&self, call: &MethodCall) -> MethodResponse;
}

impl<F> MethodHandler for F
where
    F: Fn(&MethodCall) -> MethodResponse,
{
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        self(call)
    }
}

/// Routes encoded messages to the handler registered for their channel.
#[derive(Default)]
pub struct Messenger {
    channels: HashMap<String, Box<dyn MethodHandler>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`. Returns true if it replaced another.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl MethodHandler + 'static,
    ) -> bool {
        let name = name.into();
        debug!(channel = %name, "registering method channel");
        self.channels.insert(name, Box::new(handler)).is_some()
    }

    /// Registered channel names, sorted.
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Deliver one encoded method call.
    ///
    /// `None` means nobody listens on `channel`. A message that is not a
    /// method call gets an empty reply.
    pub fn send(&self, channel: &str, message: &[u8]) -> Option<Vec<u8>> {
        let Some(handler) = self.channels.get(channel) else {
            debug!(channel, "no handler registered");
            return None;
        };
        let call = match codec::decode_method_call(message) {
            Ok(call) => call,
            Err(err) => {
                warn!(channel, error = %err, "unable to decode method call");
                return Some(Vec::new());
            }
        };
        let _span = debug_span!("method_call", channel, method = %call.method).entered();
        let response = handler.handle(&call);
        debug!(reply = ?response, "method call answered");
        Some(codec::encode_response(&response))
    }

    /// Encode `call`, deliver it, and decode the reply.
    pub fn invoke(
        &self,
        channel: &str,
        call: &MethodCall,
    ) -> Option<Result<MethodResponse, codec::CodecError>> {
        self.send(channel, &codec::encode_method_call(call))
            .map(|reply| codec::decode_response(&reply))
    }
}
