//! Manifest schema - TOML declarations of plugin settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::resource::normalize;

/// A manifest file: the target file, services to restart, and settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Managed INI file, `~` and `$VAR` expanded
    #[serde(default)]
    pub path: Option<String>,

    /// Services restarted after a run that changed something
    #[serde(default)]
    pub restart: Vec<String>,

    #[serde(default, rename = "setting")]
    pub settings: Vec<Declaration>,
}

/// One `[[setting]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    /// `<section>/<setting>`
    #[serde(alias = "identity")]
    pub name: String,

    /// `present` or `absent`; defaults to `present`
    #[serde(default)]
    pub ensure: Option<String>,

    /// Any TOML value; rendered to a string before normalization
    #[serde(default)]
    pub value: Option<toml::Value>,
}

impl Declaration {
    pub fn declared_value(&self) -> Option<DeclaredValue<'_>> {
        self.value.as_ref().map(DeclaredValue)
    }
}

impl Manifest {
    /// Load a manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid TOML format in manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Target file declared in the manifest, expanded
    pub fn target_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(paths::expand)
    }
}

/// Canonical string form of a declared TOML value
///
/// Strings render as-is, arrays as their normalized elements joined with
/// `,`, everything else in TOML inline notation.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredValue<'a>(pub &'a toml::Value);

impl fmt::Display for DeclaredValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            toml::Value::String(s) => f.write_str(s),
            toml::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| normalize(Some(&DeclaredValue(item))))
                    .collect();
                f.write_str(&parts.join(","))
            }
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::parse(
            r#"
path = "/etc/neutron/plugins/openvswitch/ovs_neutron_plugin.ini"
restart = ["neutron-openvswitch-agent"]

[[setting]]
name = "ovs/bridge_mappings"
value = " physnet1:br-eth1 "

[[setting]]
identity = "ovs/enable_tunneling"
ensure = "absent"
"#,
        )
        .unwrap();

        assert_eq!(
            manifest.target_path(),
            Some(PathBuf::from(paths::DEFAULT_PLUGIN_FILE))
        );
        assert_eq!(manifest.restart, vec!["neutron-openvswitch-agent"]);
        assert_eq!(manifest.settings.len(), 2);
        assert_eq!(manifest.settings[0].name, "ovs/bridge_mappings");
        assert_eq!(manifest.settings[0].ensure, None);
        assert_eq!(manifest.settings[1].name, "ovs/enable_tunneling");
        assert_eq!(manifest.settings[1].ensure.as_deref(), Some("absent"));
        assert_eq!(manifest.settings[1].value, None);
    }

    #[test]
    fn test_empty_manifest_defaults() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest, Manifest::default());
        assert_eq!(manifest.target_path(), None);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = Manifest::parse("[[setting]]\nname = \"a/b\"\nvalu = \"x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("valu"));
    }

    #[test]
    fn test_declared_values_render_canonically() {
        let manifest = Manifest::parse(
            r#"
[[setting]]
name = "agent/polling_interval"
value = 2

[[setting]]
name = "ovs/enable_tunneling"
value = true

[[setting]]
name = "ovs/bridge_mappings"
value = [" physnet1:br-eth1", "physnet2:br-eth2 "]

[[setting]]
name = "agent/ratio"
value = 0.5
"#,
        )
        .unwrap();

        let rendered: Vec<String> = manifest
            .settings
            .iter()
            .map(|d| normalize(d.declared_value().as_ref()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "2",
                "true",
                "physnet1:br-eth1,physnet2:br-eth2",
                "0.5"
            ]
        );
    }

    #[test]
    fn test_load_reports_path() {
        let err = Manifest::load(Path::new("/nonexistent/manifest.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/manifest.toml"));
    }
}
