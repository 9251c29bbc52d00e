//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match the desired state.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be managed (files, settings)
//! - **ResourceState**: The current or desired state of a resource
//! - **ExecutionPlan**: An ordered set of resources plus post-apply actions
//! - **Executor**: Applies resources, optionally in parallel, and reports
//!   one outcome per resource
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecuteOptions, ExecutionPlan, execute_simple};
//!
//! let mut plan = ExecutionPlan::new();
//! for resource in resources {
//!     plan.add_resource(Box::new(resource));
//! }
//!
//! let report = execute_simple(&plan, &ExecuteOptions { jobs: 4, ..Default::default() })?;
//! for failure in report.failures() {
//!     eprintln!("{}: {:?}", failure.resource_id, failure.result);
//! }
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{DiffFailure, DiffSet, DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource};
pub use types::{
    ApplyResult, ExecuteOptions, ExecuteReport, ExecuteSummary, ResourceReport, ResourceState,
};
