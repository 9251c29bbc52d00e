//! File providers - read and mutate a single `section/setting` of a file
//!
//! Reconciliation only talks to the [`FileProvider`] trait; how the file is
//! located, parsed, and written back is up to the implementation.

pub mod ini;
#[cfg(test)]
pub mod memory;

pub use ini::IniFileProvider;

use crate::error::ProviderError;
use std::fmt;

/// Reader/writer for one setting of a sectioned key/value file
///
/// Every operation either completes or leaves the file untouched.
pub trait FileProvider: Send + Sync + fmt::Debug {
    /// Current raw value, `None` when the setting does not exist
    fn read(&self, section: &str, setting: &str) -> Result<Option<String>, ProviderError>;

    /// Create or overwrite the setting, creating the section if missing
    fn write(&self, section: &str, setting: &str, value: &str) -> Result<(), ProviderError>;

    /// Delete the setting; removing a missing setting is a no-op
    fn remove(&self, section: &str, setting: &str) -> Result<(), ProviderError>;

    /// Where the settings live, for display
    fn location(&self) -> String;
}
