//! Path resolution for the plugin file and the manifest
//!
//! # Environment Variables
//!
//! - `NEUTRON_PLUGIN_OVS_CONFIG_DIR` - Override the config directory
//! - `NEUTRON_PLUGIN_OVS_MANIFEST` - Override the manifest path (read by the CLI)
//! - `NEUTRON_PLUGIN_OVS_FILE` - Override the managed INI file (read by the CLI)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `NEUTRON_PLUGIN_OVS_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/neutron-plugin-ovs` (if set)
//! 3. `~/.config/neutron-plugin-ovs`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "NEUTRON_PLUGIN_OVS_CONFIG_DIR";

/// Where the Open vSwitch plugin keeps its configuration
pub const DEFAULT_PLUGIN_FILE: &str = "/etc/neutron/plugins/openvswitch/ovs_neutron_plugin.ini";

const APP_DIR: &str = "neutron-plugin-ovs";
const MANIFEST_FILE: &str = "manifest.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default manifest location inside the config directory
pub fn default_manifest() -> Result<PathBuf> {
    Ok(config_dir()?.join(MANIFEST_FILE))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables leave the path unchanged.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
