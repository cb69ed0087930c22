//! # qmid Configuration
//!
//! Settings for the modem daemon, layered in this order (later wins):
//!
//! 1. built-in defaults ([`DaemonConfig::default`])
//! 2. an optional TOML file
//! 3. `QMID_*` environment variables (`QMID_DEVICE=/dev/cdc-wdm1`,
//!    `QMID_MODE_PREFERENCE=gsm,lte`)
//!
//! ```rust
//! use qmid_config::DaemonConfig;
//!
//! let config = DaemonConfig::default();
//! assert_eq!(config.mode_preference_mask(), 0x04);
//! ```

pub mod daemon;

pub use daemon::DaemonConfig;
