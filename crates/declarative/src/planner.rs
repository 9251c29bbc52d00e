//! Execution planner - builds resource execution plans

use crate::resource::{BoxedResource, Resource};

/// An ordered execution plan
pub struct ExecutionPlan {
    /// Resources in declaration order
    pub resources: Vec<BoxedResource>,
    /// Post-apply actions (e.g., services to restart)
    pub post_actions: Vec<String>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            post_actions: Vec::new(),
        }
    }

    /// Add a resource to the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Add a post-apply action
    pub fn add_post_action(&mut self, action: String) {
        if !self.post_actions.contains(&action) {
            self.post_actions.push(action);
        }
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
            post_actions: self.post_actions,
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type.name", or a single term matched against both
    /// the resource type and the resource id.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "type.name" into (type, name)
///
/// A single term yields `(None, Some(term))` and is matched loosely.
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        Some((rt, name)) if !rt.is_empty() && !name.is_empty() => {
            (Some(rt.to_string()), Some(name.to_string()))
        }
        _ => (None, Some(target.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(
    resource: &dyn Resource,
    resource_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    match (resource_type, name) {
        (Some(rt), Some(n)) => resource.resource_type() == rt && resource.id().contains(n),
        (Some(rt), None) => resource.resource_type() == rt,
        (None, Some(n)) => resource.resource_type() == n || resource.id().contains(n),
        (None, None) => true,
    }
}
