//! The system channel: `getSystemProxy`.

use serde_json::Value;
use tracing::warn;

use crate::channel::MethodHandler;
use crate::codec::{MethodCall, MethodResponse};
use crate::platform::ProxySource;

pub const GET_SYSTEM_PROXY: &str = "getSystemProxy";

/// Reduce a proxy setting to `host:port`.
///
/// Accepts `host:port`, URLs such as `http://user@host:port/`, and the
/// per-scheme list WinINet stores (`http=host:port;https=host:port`), where
/// the `http` entry is preferred over `https`.
pub fn parse_proxy_server(raw: &str) -> Option<String> {
    let mut plain = None;
    let mut http = None;
    let mut https = None;
    for entry in raw.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry.split_once('=') {
            Some((scheme, address)) if scheme.eq_ignore_ascii_case("http") => {
                http.get_or_insert(address.trim());
            }
            Some((scheme, address)) if scheme.eq_ignore_ascii_case("https") => {
                https.get_or_insert(address.trim());
            }
            Some(_) => {}
            None => {
                plain.get_or_insert(entry);
            }
        }
    }
    http.or(https).or(plain).and_then(host_port)
}

fn host_port(address: &str) -> Option<String> {
    let address = address
        .split_once("://")
        .map_or(address, |(_, rest)| rest);
    let address = address.split('/').next().unwrap_or_default();
    let address = address.rsplit_once('@').map_or(address, |(_, rest)| rest);
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return None;
    }
    Some(format!("{host}:{port}"))
}

#[derive(Debug)]
pub struct SystemHandler<P> {
    proxy: P,
}

impl<P: ProxySource> SystemHandler<P> {
    pub fn new(proxy: P) -> Self {
        Self { proxy }
    }

    fn system_proxy(&self) -> Option<String> {
        match self.proxy.proxy_server() {
            Ok(raw) => raw.as_deref().and_then(parse_proxy_server),
            Err(err) => {
                warn!(error = %err, "cannot read proxy settings");
                None
            }
        }
    }
}

impl<P: ProxySource> MethodHandler for SystemHandler<P> {
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            GET_SYSTEM_PROXY => {
                MethodResponse::Success(self.system_proxy().map_or(Value::Null, Value::String))
            }
            _ => MethodResponse::NotImplemented,
        }
    }
}
