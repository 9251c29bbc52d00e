//! Plugin setting resource - converge one `section/setting` of the plugin file

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

use super::descriptor::{DesiredState, Ensure, ResourceDescriptor, normalize};
use super::{ApplyContext, ApplyResult, Resource, ResourceState};
use crate::error::ProviderError;
use crate::provider::FileProvider;

/// Resource type reported for every plugin setting
pub const RESOURCE_TYPE: &str = "neutron_plugin_ovs";

/// What a reconciliation did to the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Created { value: String },
    Changed { from: String, to: String },
    Removed { value: String },
}

impl Outcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl From<Outcome> for ApplyResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Unchanged => Self::NoChange,
            Outcome::Created { value } => Self::Created {
                details: Some(value),
            },
            Outcome::Changed { from, to } => Self::Modified { from, to },
            Outcome::Removed { value } => Self::Removed {
                details: Some(value),
            },
        }
    }
}

/// Converge the provider's file to `descriptor`
///
/// Reads the actual value once. When it is not in sync, performs exactly
/// one write or remove. Reported values are normalized.
pub fn reconcile(
    descriptor: &ResourceDescriptor,
    provider: &dyn FileProvider,
) -> Result<Outcome, ProviderError> {
    let (section, setting) = (descriptor.section(), descriptor.setting());
    let actual = provider.read(section, setting)?;

    if descriptor.is_in_sync(actual.as_deref()) {
        debug!("{descriptor} is in sync");
        return Ok(Outcome::Unchanged);
    }

    let DesiredState { ensure, value } = descriptor.desired_state();
    let outcome = match (ensure, value, actual) {
        (Ensure::Present, Some(value), None) => {
            provider.write(section, setting, &value)?;
            Outcome::Created { value }
        }
        (Ensure::Present, Some(value), Some(old)) => {
            provider.write(section, setting, &value)?;
            Outcome::Changed {
                from: normalize(Some(old.as_str())),
                to: value,
            }
        }
        (Ensure::Absent, _, Some(old)) => {
            provider.remove(section, setting)?;
            Outcome::Removed {
                value: normalize(Some(old.as_str())),
            }
        }
        (Ensure::Present, None, _) | (Ensure::Absent, _, None) => Outcome::Unchanged,
    };

    if outcome.is_change() {
        info!("{descriptor}: {outcome:?}");
    }
    Ok(outcome)
}

/// A declared setting bound to the provider of the file it lives in
#[derive(Debug, Clone)]
pub struct PluginSetting {
    descriptor: ResourceDescriptor,
    provider: Arc<dyn FileProvider>,
}

impl PluginSetting {
    pub fn new(descriptor: ResourceDescriptor, provider: Arc<dyn FileProvider>) -> Self {
        Self {
            descriptor,
            provider,
        }
    }

    fn read_actual(&self) -> Result<Option<String>> {
        self.provider
            .read(self.descriptor.section(), self.descriptor.setting())
            .with_context(|| format!("Failed to read {}", self.descriptor))
    }
}

impl Resource for PluginSetting {
    fn id(&self) -> String {
        self.descriptor.identity().to_string()
    }

    fn description(&self) -> String {
        match self.descriptor.value() {
            Some(value) => format!(
                "Set {} = {value} in {}",
                self.descriptor,
                self.provider.location()
            ),
            None => format!(
                "Remove {} from {}",
                self.descriptor,
                self.provider.location()
            ),
        }
    }

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn current_state(&self) -> Result<ResourceState> {
        let actual = self.read_actual()?;
        let in_sync = self.descriptor.is_in_sync(actual.as_deref());

        Ok(match (actual, self.descriptor.value()) {
            (None, _) => ResourceState::Absent,
            (Some(actual), Some(desired)) if !in_sync => ResourceState::Modified {
                from: normalize(Some(actual.as_str())),
                to: desired.to_string(),
            },
            (Some(actual), _) => ResourceState::Present {
                details: Some(normalize(Some(actual.as_str()))),
            },
        })
    }

    fn desired_state(&self) -> ResourceState {
        match self.descriptor.ensure() {
            Ensure::Present => ResourceState::Present {
                details: self.descriptor.value().map(str::to_string),
            },
            Ensure::Absent => ResourceState::Absent,
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let outcome = reconcile(&self.descriptor, self.provider.as_ref())
            .with_context(|| format!("Failed to reconcile {}", self.descriptor))?;
        Ok(outcome.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::IniFileProvider;
    use crate::provider::memory::MemoryProvider;

    fn present(identity: &str, value: &str) -> ResourceDescriptor {
        ResourceDescriptor::present(identity, value).unwrap()
    }

    #[test]
    fn test_creates_missing_setting() {
        let provider = MemoryProvider::new();
        let d = present("ovs/bridge_mappings", " physnet1:br-eth1 ");

        let outcome = reconcile(&d, &provider).unwrap();

        assert_eq!(
            outcome,
            Outcome::Created {
                value: "physnet1:br-eth1".into()
            }
        );
        assert_eq!(
            provider.get("ovs", "bridge_mappings").as_deref(),
            Some("physnet1:br-eth1")
        );
    }

    #[test]
    fn test_whitespace_difference_is_in_sync() {
        let provider = MemoryProvider::new().with("ovs", "local_ip", "10.0.0.1   ");
        let d = present("ovs/local_ip", "10.0.0.1");

        assert_eq!(reconcile(&d, &provider).unwrap(), Outcome::Unchanged);
        assert_eq!(provider.mutations(), 0);
    }

    #[test]
    fn test_changes_differing_value() {
        let provider = MemoryProvider::new().with("ovs", "local_ip", " 10.0.0.1");
        let d = present("ovs/local_ip", "10.0.0.2");

        let outcome = reconcile(&d, &provider).unwrap();

        assert_eq!(
            outcome,
            Outcome::Changed {
                from: "10.0.0.1".into(),
                to: "10.0.0.2".into()
            }
        );
        assert_eq!(provider.get("ovs", "local_ip").as_deref(), Some("10.0.0.2"));
        assert_eq!(provider.mutations(), 1);
    }

    #[test]
    fn test_removes_present_setting() {
        let provider = MemoryProvider::new().with("ovs", "enable_tunneling", "True");
        let d = ResourceDescriptor::absent("ovs/enable_tunneling").unwrap();

        let outcome = reconcile(&d, &provider).unwrap();

        assert_eq!(
            outcome,
            Outcome::Removed {
                value: "True".into()
            }
        );
        assert_eq!(provider.get("ovs", "enable_tunneling"), None);
    }

    #[test]
    fn test_absent_stays_absent() {
        let provider = MemoryProvider::new();
        let d = ResourceDescriptor::absent("ovs/enable_tunneling").unwrap();

        assert_eq!(reconcile(&d, &provider).unwrap(), Outcome::Unchanged);
        assert_eq!(provider.mutations(), 0);
    }

    #[test]
    fn test_second_reconcile_is_unchanged() {
        let provider = MemoryProvider::new().with("ovs", "local_ip", "10.0.0.1");
        for d in [
            present("ovs/local_ip", "10.0.0.9"),
            present("ovs/tenant_network_type", "vlan"),
            ResourceDescriptor::absent("ovs/local_ip").unwrap(),
        ] {
            assert!(reconcile(&d, &provider).unwrap().is_change());
            assert_eq!(reconcile(&d, &provider).unwrap(), Outcome::Unchanged);
        }
    }

    #[test]
    fn test_provider_error_prevents_writes() {
        let provider = MemoryProvider::missing();
        let d = present("ovs/local_ip", "10.0.0.1");

        let err = reconcile(&d, &provider).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(provider.mutations(), 0);
    }

    #[test]
    fn test_unreadable_key_fails_without_touching_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ovs_neutron_plugin.ini");
        std::fs::write(&path, "[ovs]\nlocal_ip = 1\n").unwrap();
        let provider = IniFileProvider::new(path.clone());

        for identity in ["ovs/[x", "ovs/a=b", "ovs/#k"] {
            for _ in 0..2 {
                let err = reconcile(&present(identity, "1"), &provider).unwrap_err();
                assert!(matches!(err, ProviderError::Unwritable { .. }), "{identity}");
            }
        }

        assert_eq!(
            reconcile(&present("ovs/local_ip", "2"), &provider).unwrap(),
            Outcome::Changed {
                from: "1".into(),
                to: "2".into()
            }
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[ovs]\nlocal_ip = 2\n"
        );
    }

    #[test]
    fn test_resource_states() {
        let provider: Arc<dyn FileProvider> = Arc::new(
            MemoryProvider::new()
                .with("ovs", "local_ip", "10.0.0.1 ")
                .with("ovs", "enable_tunneling", "True"),
        );

        let synced = PluginSetting::new(present("ovs/local_ip", "10.0.0.1"), provider.clone());
        assert_eq!(synced.current_state().unwrap(), synced.desired_state());
        assert!(!synced.needs_apply().unwrap());

        let drifted = PluginSetting::new(present("ovs/local_ip", "10.0.0.2"), provider.clone());
        assert_eq!(
            drifted.current_state().unwrap(),
            ResourceState::Modified {
                from: "10.0.0.1".into(),
                to: "10.0.0.2".into()
            }
        );

        let missing = PluginSetting::new(present("ovs/bridge_mappings", "x"), provider.clone());
        assert_eq!(missing.current_state().unwrap(), ResourceState::Absent);

        let unwanted = PluginSetting::new(
            ResourceDescriptor::absent("ovs/enable_tunneling").unwrap(),
            provider,
        );
        assert_eq!(unwanted.desired_state(), ResourceState::Absent);
        assert_eq!(
            unwanted.current_state().unwrap(),
            ResourceState::Present {
                details: Some("True".into())
            }
        );
    }

    #[test]
    fn test_apply_maps_outcomes() {
        let memory = Arc::new(MemoryProvider::new().with("ovs", "local_ip", "10.0.0.1"));
        let resource = PluginSetting::new(present("ovs/local_ip", "10.0.0.2"), memory.clone());

        let mut dry = ApplyContext::new(true, false);
        assert!(matches!(
            resource.apply(&mut dry).unwrap(),
            ApplyResult::Skipped { .. }
        ));
        assert_eq!(memory.mutations(), 0);

        let mut ctx = ApplyContext::default();
        assert_eq!(
            resource.apply(&mut ctx).unwrap(),
            ApplyResult::Modified {
                from: "10.0.0.1".into(),
                to: "10.0.0.2".into()
            }
        );
        assert_eq!(resource.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
    }

    #[test]
    fn test_apply_reports_ambiguous_identity() {
        let memory = Arc::new(MemoryProvider::new().ambiguous("ovs", "local_ip"));
        let resource = PluginSetting::new(present("ovs/local_ip", "10.0.0.2"), memory);

        let err = resource.apply(&mut ApplyContext::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("ovs/local_ip"));
        assert!(message.contains("not addressable"));
    }

    #[test]
    fn test_description_names_location() {
        let memory = Arc::new(MemoryProvider::new());
        let set = PluginSetting::new(present("ovs/local_ip", "10.0.0.2"), memory.clone());
        assert_eq!(set.description(), "Set ovs/local_ip = 10.0.0.2 in memory");

        let unset = PluginSetting::new(ResourceDescriptor::absent("ovs/local_ip").unwrap(), memory);
        assert_eq!(unset.description(), "Remove ovs/local_ip from memory");
        assert_eq!(unset.resource_type(), RESOURCE_TYPE);
        assert_eq!(unset.id(), "ovs/local_ip");
    }
}
