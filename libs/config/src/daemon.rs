//! Daemon configuration loading and validation

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use qmi_types::{RadioTechnology, DEFAULT_MAX_MESSAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Smallest buffer that holds a QMUX header and a generic service header
const MIN_MESSAGE_SIZE: usize = 13;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DaemonConfig {
    /// QMI character device
    pub device: PathBuf,
    /// Network interface toggled on attach/detach
    pub interface: String,
    /// NAS client id already allocated through the control service
    pub nas_client_id: u8,
    /// Technologies folded into the system selection mode preference
    pub mode_preference: Vec<RadioTechnology>,
    /// Resend interval while a request is unanswered
    pub retry_interval_ms: u64,
    /// Encode buffer capacity
    pub max_message_size: usize,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Trace every frame sent and received
    pub dump_frames: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/cdc-wdm0"),
            interface: "wwan0".to_string(),
            nas_client_id: 1,
            mode_preference: vec![RadioTechnology::Gsm],
            retry_interval_ms: 5000,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            log_level: "info".to_string(),
            dump_frames: false,
        }
    }
}

impl DaemonConfig {
    /// Load defaults, then `path` (if given), then `QMID_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to serialize defaults")?,
        );

        if let Some(path) = path {
            info!("Loading config file: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("QMID")
                .prefix_separator("_")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("mode_preference"),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nas_client_id == 0 {
            bail!("nas_client_id must be non-zero");
        }
        if self.mode_preference.is_empty() {
            bail!("mode_preference must name at least one technology");
        }
        if self.max_message_size < MIN_MESSAGE_SIZE {
            bail!(
                "max_message_size {} cannot hold a message header ({} bytes)",
                self.max_message_size,
                MIN_MESSAGE_SIZE
            );
        }
        if self.retry_interval_ms == 0 {
            bail!("retry_interval_ms must be non-zero");
        }
        Ok(())
    }

    /// Wire bitmask for the mode preference TLV
    pub fn mode_preference_mask(&self) -> u16 {
        RadioTechnology::mode_mask(&self.mode_preference)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}
