//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! redirector. All types derive Serde traits for deserialization from
//! config files, and every field has a default so a minimal (even empty)
//! config is a valid one: user values overlay the defaults, fields absent
//! from the file keep them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default DNS intercept port.
pub const DNS_DEFAULT_PORT: u16 = 53;

/// Default TTL in seconds for synthesized DNS answers.
pub const DNS_DEFAULT_TTL: u32 = 600;

/// Default maximum DNS datagram size in bytes.
pub const DNS_DEFAULT_PACKET_SIZE: u16 = 4096;

/// Default read/write timeout in seconds for backend resolver queries.
pub const DNS_DEFAULT_READ_TIMEOUT: u64 = 5;
pub const DNS_DEFAULT_WRITE_TIMEOUT: u64 = 5;

/// Upper bound on the fake-DNS IP pool (4 * 65535 addresses).
pub const DNS_IP_POOL_MAX_SPACE: u32 = 0x3ffff;

/// Backend resolvers appended when the config supplies none.
pub const FALLBACK_NAMESERVERS: [&str; 2] = ["114.114.114.114:53", "223.5.5.5:53"];

/// Root configuration for the redirector.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Virtual interface and netstack parameters.
    pub general: GeneralConfig,

    /// DNS interception behavior.
    pub dns: DnsConfig,

    /// Route specifications handed to the routing engine.
    pub route: RouteConfig,

    /// Named upstream proxy registry.
    pub proxy: HashMap<String, ProxyConfig>,

    /// Named pattern groups referenced by rules.
    pub pattern: HashMap<String, PatternConfig>,

    /// Rule evaluation order and final action.
    pub rule: RuleConfig,
}

/// Virtual interface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneralConfig {
    /// CIDR of the tun network (e.g., "10.192.0.1/16").
    pub network: String,

    /// Address the userspace netstack binds inside the tun network.
    pub netstack_addr: String,

    /// Netstack listen port.
    pub netstack_port: u16,

    /// Interface MTU.
    pub mtu: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            network: "10.192.0.1/16".to_string(),
            netstack_addr: "10.192.0.2".to_string(),
            netstack_port: 7777,
            mtu: 1500,
        }
    }
}

/// DNS interception strategy.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DnsMode {
    /// Answer intercepted queries with addresses from a fake IP pool.
    #[default]
    Fake,
    /// Forward intercepted queries to the backend resolvers unchanged.
    Redirect,
}

/// DNS interception configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct DnsConfig {
    /// Interception strategy.
    pub dns_mode: DnsMode,

    /// Name of the proxy entry DNS traffic egresses through.
    /// Empty means "use the default proxy".
    pub proxy: String,

    /// Intercept listen port.
    pub dns_port: u16,

    /// TTL in seconds for synthesized answers.
    pub dns_ttl: u32,

    /// Maximum DNS datagram size in bytes (minimum 512).
    pub dns_packet_size: u16,

    /// Read timeout in seconds for backend queries.
    pub dns_read_timeout: u64,

    /// Write timeout in seconds for backend queries.
    pub dns_write_timeout: u64,

    /// Backend resolver addresses, tried in order.
    /// Left empty, the loader fills in [`FALLBACK_NAMESERVERS`].
    pub nameserver: Vec<String>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            dns_mode: DnsMode::default(),
            proxy: String::new(),
            dns_port: DNS_DEFAULT_PORT,
            dns_ttl: DNS_DEFAULT_TTL,
            dns_packet_size: DNS_DEFAULT_PACKET_SIZE,
            dns_read_timeout: DNS_DEFAULT_READ_TIMEOUT,
            dns_write_timeout: DNS_DEFAULT_WRITE_TIMEOUT,
            nameserver: Vec::new(),
        }
    }
}

/// Route specifications, in file order. Semantics belong to the routing
/// engine; this core stores them opaquely.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    #[serde(rename = "v")]
    pub specs: Vec<String>,
}

/// A named pattern group: an ordered list of pattern strings plus the
/// proxy matched traffic should use.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct PatternConfig {
    /// Name of the proxy entry matched traffic egresses through.
    pub proxy: String,

    /// Pattern scheme (e.g., "DOMAIN", "IP-CIDR"); owned by the matcher.
    pub scheme: String,

    #[serde(rename = "v")]
    pub patterns: Vec<String>,
}

/// Rule evaluation order: pattern group names checked first to last,
/// then the final action for anything unmatched.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub pattern: Vec<String>,

    #[serde(rename = "final")]
    pub final_action: String,
}

/// An upstream proxy endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. "socks5://127.0.0.1:1080". Must carry a host.
    pub url: String,

    /// Marks this entry as the fallback for consumers with no proxy of
    /// their own. At most one entry may set this.
    pub default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fully_populated() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.general.network, "10.192.0.1/16");
        assert_eq!(cfg.general.netstack_addr, "10.192.0.2");
        assert_eq!(cfg.general.netstack_port, 7777);
        assert_eq!(cfg.general.mtu, 1500);
        assert_eq!(cfg.dns.dns_mode, DnsMode::Fake);
        assert_eq!(cfg.dns.proxy, "");
        assert_eq!(cfg.dns.dns_port, 53);
        assert_eq!(cfg.dns.dns_ttl, 600);
        assert_eq!(cfg.dns.dns_packet_size, 4096);
        assert_eq!(cfg.dns.dns_read_timeout, 5);
        assert_eq!(cfg.dns.dns_write_timeout, 5);
        assert!(cfg.dns.nameserver.is_empty());
        assert!(cfg.proxy.is_empty());
    }

    #[test]
    fn test_kebab_case_field_tags() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [general]
            netstack-addr = "10.10.0.2"
            netstack-port = 9999

            [dns]
            dns-mode = "redirect"
            dns-packet-size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(cfg.general.netstack_addr, "10.10.0.2");
        assert_eq!(cfg.general.netstack_port, 9999);
        assert_eq!(cfg.dns.dns_mode, DnsMode::Redirect);
        assert_eq!(cfg.dns.dns_packet_size, 1024);
        // fields absent from the file keep their defaults
        assert_eq!(cfg.general.mtu, 1500);
        assert_eq!(cfg.dns.dns_port, 53);
    }

    #[test]
    fn test_empty_source_equals_pure_defaults() {
        let overlaid: AppConfig = toml::from_str("").unwrap();
        assert_eq!(overlaid, AppConfig::default());
    }
}
