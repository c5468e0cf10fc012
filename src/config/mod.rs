//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs Default impls)
//!     → loader.rs (overlay TOML values, fill nameserver fallback)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap via SharedConfig
//!     → subsystems observe new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal (even empty) configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A root that fails validation never reaches any consumer

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_str, ConfigError};
pub use schema::{AppConfig, DnsConfig, DnsMode, GeneralConfig, ProxyConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::{ConfigWatcher, SharedConfig};
