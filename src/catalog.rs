//! Catalog - the validated set of descriptors for one run

use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::config::Manifest;
use crate::error::ValidationError;
use crate::resource::ResourceDescriptor;

/// Descriptors in declaration order, each `(section, setting)` at most once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    descriptors: Vec<ResourceDescriptor>,
    seen: HashSet<(String, String)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, rejecting a second one for the same setting
    pub fn add(&mut self, descriptor: ResourceDescriptor) -> Result<(), ValidationError> {
        let key = (
            descriptor.section().to_string(),
            descriptor.setting().to_string(),
        );
        if !self.seen.insert(key) {
            return Err(ValidationError::DuplicateIdentity(
                descriptor.identity().to_string(),
            ));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Compile every declaration of a manifest
    ///
    /// The first invalid declaration aborts compilation.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let mut catalog = Self::new();
        for (index, declaration) in manifest.settings.iter().enumerate() {
            let descriptor = ResourceDescriptor::declare(
                &declaration.name,
                declaration.ensure.as_deref(),
                declaration.declared_value().as_ref(),
            )
            .with_context(|| format!("Invalid setting #{} '{}'", index + 1, declaration.name))?;

            catalog
                .add(descriptor)
                .with_context(|| format!("Invalid setting #{} '{}'", index + 1, declaration.name))?;
        }
        log::debug!("Compiled {} setting(s) from manifest", catalog.len());
        Ok(catalog)
    }

    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl IntoIterator for Catalog {
    type Item = ResourceDescriptor;
    type IntoIter = std::vec::IntoIter<ResourceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl From<ResourceDescriptor> for Catalog {
    fn from(descriptor: ResourceDescriptor) -> Self {
        let mut catalog = Self::new();
        // a single descriptor cannot collide
        let _ = catalog.add(descriptor);
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::descriptor::Ensure;

    #[test]
    fn test_from_manifest_keeps_order() {
        let manifest = Manifest::parse(
            r#"
[[setting]]
name = "ovs/local_ip"
value = "10.0.0.1"

[[setting]]
name = "agent/polling_interval"
value = 2

[[setting]]
name = "ovs/enable_tunneling"
ensure = "absent"
"#,
        )
        .unwrap();

        let catalog = Catalog::from_manifest(&manifest).unwrap();
        let ids: Vec<_> = catalog.descriptors().iter().map(|d| d.identity()).collect();
        assert_eq!(
            ids,
            vec!["ovs/local_ip", "agent/polling_interval", "ovs/enable_tunneling"]
        );
        assert_eq!(catalog.descriptors()[1].value(), Some("2"));
        assert_eq!(catalog.descriptors()[2].ensure(), Ensure::Absent);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut catalog = Catalog::new();
        catalog
            .add(ResourceDescriptor::present("ovs/local_ip", "1").unwrap())
            .unwrap();

        let err = catalog
            .add(ResourceDescriptor::absent("ovs/local_ip").unwrap())
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateIdentity("ovs/local_ip".into()));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_manifest_with_duplicates_fails() {
        let manifest = Manifest::parse(
            "[[setting]]\nname = \"ovs/a\"\nvalue = \"1\"\n[[setting]]\nname = \"ovs/a\"\nvalue = \"2\"\n",
        )
        .unwrap();

        let err = Catalog::from_manifest(&manifest).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("#2"));
        assert!(message.contains("duplicate identity"));
    }

    #[test]
    fn test_manifest_with_invalid_declarations_fails() {
        let bad_identity = Manifest::parse("[[setting]]\nname = \"badsection\"\n").unwrap();
        let message = format!("{:#}", Catalog::from_manifest(&bad_identity).unwrap_err());
        assert!(message.contains("invalid identity"));

        let bad_ensure =
            Manifest::parse("[[setting]]\nname = \"ovs/a\"\nensure = \"maybe\"\n").unwrap();
        let message = format!("{:#}", Catalog::from_manifest(&bad_ensure).unwrap_err());
        assert!(message.contains("invalid ensure state"));
        assert!(message.contains("ovs/a"));
    }

    #[test]
    fn test_same_setting_in_different_sections() {
        let mut catalog = Catalog::new();
        catalog
            .add(ResourceDescriptor::present("ovs/enabled", "1").unwrap())
            .unwrap();
        catalog
            .add(ResourceDescriptor::present("agent/enabled", "1").unwrap())
            .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_single_descriptor_catalog() {
        let catalog = Catalog::from(ResourceDescriptor::absent("ovs/local_ip").unwrap());
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }
}
