//! Diff computation for resources

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state()?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
        }))
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Present { .. }, ResourceState::Absent)
        )
    }

    /// Check if this diff represents a modification
    pub fn is_modification(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Modified { .. }, _)
                | (_, ResourceState::Modified { .. })
                | (
                    ResourceState::Present { details: Some(_) },
                    ResourceState::Present { details: Some(_) }
                )
        )
    }
}

/// A resource whose current state could not be detected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFailure {
    pub resource_id: String,
    pub resource_type: String,
    pub error: String,
}

/// Diffs for a set of resources, plus the resources that could not be inspected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffSet {
    pub diffs: Vec<ResourceDiff>,
    pub failures: Vec<DiffFailure>,
}

impl DiffSet {
    /// True when every resource was inspected and none needs changes
    pub fn is_clean(&self) -> bool {
        self.diffs.is_empty() && self.failures.is_empty()
    }

    /// Whether the resource with this id has a pending diff
    pub fn contains(&self, resource_id: &str) -> bool {
        self.diffs.iter().any(|d| d.resource_id == resource_id)
    }

    /// Error message recorded for this resource, if detection failed
    pub fn failure_for(&self, resource_id: &str) -> Option<&str> {
        self.failures
            .iter()
            .find(|f| f.resource_id == resource_id)
            .map(|f| f.error.as_str())
    }
}

/// Compute diffs for a list of resources
///
/// Resources already in their desired state are omitted. A resource whose
/// state cannot be detected is recorded as a failure and does not affect
/// the others.
pub fn compute_diffs(resources: &[Box<dyn Resource>]) -> DiffSet {
    let mut set = DiffSet::default();
    for resource in resources {
        match ResourceDiff::from_resource(resource.as_ref()) {
            Ok(Some(diff)) => set.diffs.push(diff),
            Ok(None) => {}
            Err(e) => set.failures.push(DiffFailure {
                resource_id: resource.id(),
                resource_type: resource.resource_type().to_string(),
                error: format!("{e:#}"),
            }),
        }
    }
    set
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
    /// Number of resources to modify
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> HashMap<String, Vec<&ResourceDiff>> {
    let mut groups: HashMap<String, Vec<&ResourceDiff>> = HashMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::ApplyResult;

    #[derive(Debug)]
    struct Fixed {
        id: &'static str,
        current: Option<ResourceState>,
        desired: ResourceState,
    }

    impl Resource for Fixed {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn description(&self) -> String {
            format!("fixed {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "fixed"
        }

        fn current_state(&self) -> Result<ResourceState> {
            self.current
                .clone()
                .ok_or_else(|| anyhow::anyhow!("cannot read {}", self.id))
        }

        fn desired_state(&self) -> ResourceState {
            self.desired.clone()
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            Ok(ApplyResult::NoChange)
        }
    }

    fn present(v: &str) -> ResourceState {
        ResourceState::Present {
            details: Some(v.to_string()),
        }
    }

    #[test]
    fn test_compute_diffs_separates_failures() {
        let resources: Vec<Box<dyn Resource>> = vec![
            Box::new(Fixed {
                id: "a",
                current: Some(ResourceState::Absent),
                desired: present("1"),
            }),
            Box::new(Fixed {
                id: "b",
                current: Some(present("1")),
                desired: present("1"),
            }),
            Box::new(Fixed {
                id: "c",
                current: None,
                desired: ResourceState::Absent,
            }),
        ];

        let set = compute_diffs(&resources);
        assert_eq!(set.diffs.len(), 1);
        assert!(set.contains("a"));
        assert!(!set.contains("b"));
        assert_eq!(set.failure_for("c"), Some("cannot read c"));
        assert!(!set.is_clean());
    }

    #[test]
    fn test_diff_summary_classification() {
        let resources: Vec<Box<dyn Resource>> = vec![
            Box::new(Fixed {
                id: "add",
                current: Some(ResourceState::Absent),
                desired: present("x"),
            }),
            Box::new(Fixed {
                id: "remove",
                current: Some(present("x")),
                desired: ResourceState::Absent,
            }),
            Box::new(Fixed {
                id: "modify",
                current: Some(ResourceState::Modified {
                    from: "x".into(),
                    to: "y".into(),
                }),
                desired: present("y"),
            }),
        ];

        let set = compute_diffs(&resources);
        let summary = DiffSummary::from_diffs(&set.diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.modifications, 1);
        assert!(summary.has_changes());
        assert_eq!(group_by_type(&set.diffs)["fixed"].len(), 3);
    }
}
