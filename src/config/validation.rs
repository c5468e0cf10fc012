//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (proxy and pattern references resolve)
//! - Validate value ranges (MTU, DNS packet size)
//! - Reject ambiguous default-proxy setups
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system; a root that fails
//!   here must never reach the resolver

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// Minimum legal value for `dns-packet-size`: a DNS datagram must be able
/// to carry at least the classic 512-byte UDP payload.
pub const DNS_MIN_PACKET_SIZE: u16 = 512;

/// A single semantic inconsistency found in a loaded config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("general.network {network:?} is not a valid IPv4 CIDR")]
    InvalidNetwork { network: String },

    #[error("general.netstack-addr {addr:?} is not a valid IPv4 address")]
    InvalidNetstackAddr { addr: String },

    #[error("general.netstack-addr {addr} is outside network {network}")]
    NetstackAddrOutsideNetwork { addr: String, network: String },

    #[error("general.mtu must be greater than zero")]
    ZeroMtu,

    #[error("dns.dns-packet-size {size} is below the minimum of {DNS_MIN_PACKET_SIZE}")]
    DnsPacketSizeTooSmall { size: u16 },

    #[error("{section} references unknown proxy {name:?}")]
    UnknownProxyRef { section: String, name: String },

    #[error("proxy {name:?} has unparsable url {url:?}")]
    InvalidProxyUrl { name: String, url: String },

    #[error("proxy {name:?} url {url:?} has no host")]
    ProxyUrlMissingHost { name: String, url: String },

    #[error("more than one proxy marked default: {names:?}")]
    MultipleDefaultProxies { names: Vec<String> },

    #[error("rule.pattern references unknown pattern {name:?}")]
    UnknownPatternRef { name: String },
}

/// Validate a loaded configuration, collecting every inconsistency.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_general(config, &mut errors);
    check_dns(config, &mut errors);
    check_proxies(config, &mut errors);
    check_patterns(config, &mut errors);
    check_rules(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_general(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let general = &config.general;

    let network = match general.network.parse::<Ipv4Net>() {
        Ok(net) => Some(net),
        Err(_) => {
            errors.push(ValidationError::InvalidNetwork {
                network: general.network.clone(),
            });
            None
        }
    };

    match general.netstack_addr.parse::<Ipv4Addr>() {
        Ok(addr) => {
            if let Some(net) = network {
                if !net.contains(&addr) {
                    errors.push(ValidationError::NetstackAddrOutsideNetwork {
                        addr: general.netstack_addr.clone(),
                        network: general.network.clone(),
                    });
                }
            }
        }
        Err(_) => errors.push(ValidationError::InvalidNetstackAddr {
            addr: general.netstack_addr.clone(),
        }),
    }

    if general.mtu == 0 {
        errors.push(ValidationError::ZeroMtu);
    }
}

fn check_dns(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let dns = &config.dns;

    if dns.dns_packet_size < DNS_MIN_PACKET_SIZE {
        errors.push(ValidationError::DnsPacketSizeTooSmall {
            size: dns.dns_packet_size,
        });
    }

    if !dns.proxy.is_empty() && !config.proxy.contains_key(&dns.proxy) {
        errors.push(ValidationError::UnknownProxyRef {
            section: "dns".to_string(),
            name: dns.proxy.clone(),
        });
    }
}

fn check_proxies(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    // Sorted iteration keeps error order stable across runs.
    let mut names: Vec<&String> = config.proxy.keys().collect();
    names.sort();

    let mut defaults = Vec::new();
    for name in names {
        let proxy = &config.proxy[name];
        match Url::parse(&proxy.url) {
            Ok(url) => {
                if url.host_str().map_or(true, str::is_empty) {
                    errors.push(ValidationError::ProxyUrlMissingHost {
                        name: name.clone(),
                        url: proxy.url.clone(),
                    });
                }
            }
            Err(_) => errors.push(ValidationError::InvalidProxyUrl {
                name: name.clone(),
                url: proxy.url.clone(),
            }),
        }
        if proxy.default {
            defaults.push(name.clone());
        }
    }

    if defaults.len() > 1 {
        errors.push(ValidationError::MultipleDefaultProxies { names: defaults });
    }
}

fn check_patterns(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let mut names: Vec<&String> = config.pattern.keys().collect();
    names.sort();

    for name in names {
        let pattern = &config.pattern[name];
        if !pattern.proxy.is_empty() && !config.proxy.contains_key(&pattern.proxy) {
            errors.push(ValidationError::UnknownProxyRef {
                section: format!("pattern.{}", name),
                name: pattern.proxy.clone(),
            });
        }
    }
}

fn check_rules(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    for name in &config.rule.pattern {
        if !config.pattern.contains_key(name) {
            errors.push(ValidationError::UnknownPatternRef { name: name.clone() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PatternConfig, ProxyConfig};

    fn config_with_proxy(name: &str, url: &str, default: bool) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.proxy.insert(
            name.to_string(),
            ProxyConfig {
                url: url.to_string(),
                default,
            },
        );
        cfg
    }

    #[test]
    fn test_defaults_validate_cleanly() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_network_cidr_rejected() {
        let mut cfg = AppConfig::default();
        cfg.general.network = "not-a-cidr".to_string();
        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidNetwork { .. })));
    }

    #[test]
    fn test_netstack_addr_must_be_inside_network() {
        let mut cfg = AppConfig::default();
        cfg.general.netstack_addr = "192.168.1.1".to_string();
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::NetstackAddrOutsideNetwork {
                addr: "192.168.1.1".to_string(),
                network: "10.192.0.1/16".to_string(),
            }]
        );
    }

    #[test]
    fn test_undersized_dns_packet_rejected() {
        let mut cfg = AppConfig::default();
        cfg.dns.dns_packet_size = 256;
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DnsPacketSizeTooSmall { size: 256 }]
        );
    }

    #[test]
    fn test_dangling_dns_proxy_ref_rejected() {
        let mut cfg = AppConfig::default();
        cfg.dns.proxy = "ghost".to_string();
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownProxyRef {
                section: "dns".to_string(),
                name: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_dangling_pattern_proxy_ref_rejected() {
        let mut cfg = AppConfig::default();
        cfg.pattern.insert(
            "cn".to_string(),
            PatternConfig {
                proxy: "ghost".to_string(),
                scheme: "DOMAIN".to_string(),
                patterns: vec![],
            },
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownProxyRef {
                section: "pattern.cn".to_string(),
                name: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_unparsable_proxy_url_rejected() {
        let cfg = config_with_proxy("bad", "::::", false);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidProxyUrl {
                name: "bad".to_string(),
                url: "::::".to_string(),
            }]
        );
    }

    #[test]
    fn test_hostless_proxy_url_rejected() {
        let cfg = config_with_proxy("unix", "unix:/var/run/proxy.sock", false);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ProxyUrlMissingHost {
                name: "unix".to_string(),
                url: "unix:/var/run/proxy.sock".to_string(),
            }]
        );
    }

    #[test]
    fn test_multiple_defaults_rejected() {
        let mut cfg = config_with_proxy("a", "socks5://127.0.0.1:1080", true);
        cfg.proxy.insert(
            "b".to_string(),
            ProxyConfig {
                url: "socks5://127.0.0.1:1081".to_string(),
                default: true,
            },
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MultipleDefaultProxies {
                names: vec!["a".to_string(), "b".to_string()],
            }]
        );
    }

    #[test]
    fn test_unknown_rule_pattern_rejected() {
        let mut cfg = AppConfig::default();
        cfg.rule.pattern.push("nowhere".to_string());
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownPatternRef {
                name: "nowhere".to_string(),
            }]
        );
    }

    #[test]
    fn test_all_errors_collected() {
        let mut cfg = config_with_proxy("bad", "::::", false);
        cfg.general.mtu = 0;
        cfg.dns.dns_packet_size = 100;
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
