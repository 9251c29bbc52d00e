//! Resource trait for declarative state management
//!
//! A Resource represents something that can be in a certain state,
//! and can be changed to reach a desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// A resource knows who it is (`id`, `description`, `resource_type`),
/// can observe itself (`current_state`), knows its target
/// (`desired_state`) and can converge (`apply`).
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
/// use std::collections::HashMap;
/// use std::sync::Mutex;
///
/// #[derive(Debug)]
/// struct Entry {
///     key: String,
///     value: String,
///     store: Mutex<HashMap<String, String>>,
/// }
///
/// impl Resource for Entry {
///     fn id(&self) -> String { self.key.clone() }
///     fn description(&self) -> String { format!("Set {} = {}", self.key, self.value) }
///     fn resource_type(&self) -> &'static str { "entry" }
///
///     fn current_state(&self) -> anyhow::Result<ResourceState> {
///         let store = self.store.lock().unwrap();
///         Ok(match store.get(&self.key) {
///             Some(v) => ResourceState::Present { details: Some(v.clone()) },
///             None => ResourceState::Absent,
///         })
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present { details: Some(self.value.clone()) }
///     }
///
///     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "Dry run".into() });
///         }
///         let mut store = self.store.lock().unwrap();
///         match store.insert(self.key.clone(), self.value.clone()) {
///             Some(from) if from == self.value => Ok(ApplyResult::NoChange),
///             Some(from) => Ok(ApplyResult::Modified { from, to: self.value.clone() }),
///             None => Ok(ApplyResult::Created { details: Some(self.value.clone()) }),
///         }
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// This should be stable and uniquely identify the resource
    /// within its type, e.g. "ovs/bridge_mappings" for a plugin setting.
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, used for grouping and filtering
    fn resource_type(&self) -> &'static str;

    /// Detect the current state of this resource
    fn current_state(&self) -> Result<ResourceState>;

    /// Get the desired state for this resource
    ///
    /// This is typically derived from configuration.
    fn desired_state(&self) -> ResourceState;

    /// Check if the resource needs changes to reach desired state
    ///
    /// Default implementation compares current and desired states.
    fn needs_apply(&self) -> Result<bool> {
        let current = self.current_state()?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Apply changes to reach the desired state
    ///
    /// Returns `NoChange` when already converged and `Skipped` under
    /// `ctx.dry_run`. Errors are turned into `Failed` by the executor.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;

    /// Whether this resource can be applied in parallel with others
    ///
    /// Resources returning false run sequentially after the parallel batch.
    fn can_parallelize(&self) -> bool {
        true
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
