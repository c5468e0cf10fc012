//! Upstream proxy resolution.
//!
//! # Responsibilities
//! - Map a logical consumer (e.g., DNS traffic) to a concrete upstream
//!   proxy endpoint
//! - Apply fallback-to-default semantics when a consumer names no proxy
//! - Report unusable proxy URLs with enough context to diagnose them
//!
//! # Design Decisions
//! - Queries are read-only over an immutable root; safe to call from any
//!   number of threads without coordination
//! - Default selection scans proxy names in sorted order, so the answer is
//!   deterministic even for a root that skipped validation
//! - Resolution failures are returned to the caller, never escalated to a
//!   process abort; the caller decides whether to drop or fall back

use thiserror::Error;
use url::Url;

use crate::config::schema::{AppConfig, ProxyConfig};

/// Error type for proxy resolution queries. Returned to the caller of the
/// query; never fatal to the process.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no default proxy configured")]
    NoDefaultProxy,

    #[error("no proxy available for consumer {consumer:?}")]
    NoProxyAvailable { consumer: String },

    #[error("proxy {name:?} has unparsable url {url:?}")]
    InvalidProxyUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("proxy {name:?} url {url:?} has no host")]
    ProxyUrlMissingHost { name: String, url: String },
}

impl AppConfig {
    /// Resolve the default proxy endpoint, e.g. an entry with url
    /// `socks5://127.0.0.1:1080` resolves to `127.0.0.1:1080`.
    pub fn default_proxy(&self) -> Result<String, ResolveError> {
        match self.find_default() {
            Some((name, proxy)) => host_port(name, proxy),
            None => Err(ResolveError::NoDefaultProxy),
        }
    }

    /// Resolve the proxy endpoint a consumer should egress through.
    ///
    /// A consumer naming an existing proxy entry gets that entry; anything
    /// else falls back to the default entry.
    pub fn proxy_for(&self, consumer: &str) -> Result<String, ResolveError> {
        if let Some(proxy) = self.proxy.get(consumer) {
            return host_port(consumer, proxy);
        }

        match self.find_default() {
            Some((name, proxy)) => host_port(name, proxy),
            None => Err(ResolveError::NoProxyAvailable {
                consumer: consumer.to_string(),
            }),
        }
    }

    /// Resolve the proxy DNS traffic should egress through.
    pub fn dns_egress_proxy(&self) -> Result<String, ResolveError> {
        self.proxy_for(&self.dns.proxy)
    }

    /// First entry marked default, in sorted name order.
    fn find_default(&self) -> Option<(&str, &ProxyConfig)> {
        let mut names: Vec<&String> = self.proxy.keys().collect();
        names.sort();

        names.into_iter().find_map(|name| {
            let proxy = &self.proxy[name];
            proxy.default.then_some((name.as_str(), proxy))
        })
    }
}

/// Extract the `host[:port]` authority component of a proxy URL.
fn host_port(name: &str, proxy: &ProxyConfig) -> Result<String, ResolveError> {
    let url = Url::parse(&proxy.url).map_err(|source| {
        tracing::warn!(proxy = name, url = %proxy.url, error = %source, "unparsable proxy url");
        ResolveError::InvalidProxyUrl {
            name: name.to_string(),
            url: proxy.url.clone(),
            source,
        }
    })?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(ResolveError::ProxyUrlMissingHost {
                name: name.to_string(),
                url: proxy.url.clone(),
            })
        }
    };

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
