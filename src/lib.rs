//! Configuration core for a tun-based tunnel/proxy/DNS-redirection service.
//!
//! The tunnel engine, DNS intercept server, route matcher, and proxy dialer
//! all read their settings from one [`config::AppConfig`] root, built once
//! at startup (defaults → overlay → validate) and immutable afterwards.
//! [`resolver`] answers "which upstream proxy should this consumer use"
//! queries against that root.

pub mod config;
pub mod resolver;

pub use config::{load_config, AppConfig, ConfigError, SharedConfig};
pub use resolver::ResolveError;
