//! Execution engine for plugin settings
//!
//! The engine orchestrates:
//! 1. Planning - Turn a catalog into resources bound to the target file
//! 2. Diffing - Compute and display current vs desired state
//! 3. Executing - Apply changes, report outcomes, restart services

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{RunOptions, run};
pub use planner::build_plan;
