//! Proxy configuration from the conventional environment variables.

use std::io;

use super::ProxySource;

/// Checked in order; the first non-empty value wins.
const PROXY_VARS: [&str; 4] = ["http_proxy", "HTTP_PROXY", "https_proxy", "HTTPS_PROXY"];

#[derive(Debug, Default, Clone, Copy)]
pub struct EnvProxy;

impl ProxySource for EnvProxy {
    fn proxy_server(&self) -> io::Result<Option<String>> {
        Ok(first_proxy_var(|name| std::env::var(name).ok()))
    }
}

fn first_proxy_var(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    PROXY_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
