//! Plugin setting resources
//!
//! Each declared setting becomes a [`PluginSetting`] with:
//! - A validated descriptor (identity, ensure, normalized value)
//! - State detection through a [`FileProvider`](crate::provider::FileProvider)
//! - An apply function converging the file to the descriptor

// Re-export core types from the declarative crate
pub use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};

pub mod descriptor;
pub mod plugin_setting;

pub use descriptor::{ResourceDescriptor, normalize, parse_identity};
pub use plugin_setting::{PluginSetting, reconcile};
