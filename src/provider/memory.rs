//! In-memory provider for tests

use super::FileProvider;
use crate::error::ProviderError;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryProvider {
    values: Mutex<BTreeMap<(String, String), String>>,
    /// Settings that report an ambiguous location
    ambiguous: Vec<(String, String)>,
    /// Every operation fails as if the file were missing
    missing: bool,
    mutations: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, section: &str, setting: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert((section.into(), setting.into()), value.into());
        self
    }

    pub fn ambiguous(mut self, section: &str, setting: &str) -> Self {
        self.ambiguous.push((section.into(), setting.into()));
        self
    }

    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    pub fn get(&self, section: &str, setting: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(&(section.to_string(), setting.to_string()))
            .cloned()
    }

    /// Number of successful writes and removals
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check(&self, section: &str, setting: &str) -> Result<(), ProviderError> {
        if self.missing {
            return Err(ProviderError::NotFound("memory".into()));
        }
        if self
            .ambiguous
            .iter()
            .any(|(s, k)| s == section && k == setting)
        {
            return Err(ProviderError::Ambiguous {
                section: section.into(),
                setting: setting.into(),
                reason: "defined twice".into(),
            });
        }
        Ok(())
    }
}

impl FileProvider for MemoryProvider {
    fn read(&self, section: &str, setting: &str) -> Result<Option<String>, ProviderError> {
        self.check(section, setting)?;
        Ok(self.get(section, setting))
    }

    fn write(&self, section: &str, setting: &str, value: &str) -> Result<(), ProviderError> {
        self.check(section, setting)?;
        self.values
            .lock()
            .unwrap()
            .insert((section.into(), setting.into()), value.into());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, section: &str, setting: &str) -> Result<(), ProviderError> {
        self.check(section, setting)?;
        self.values
            .lock()
            .unwrap()
            .remove(&(section.to_string(), setting.to_string()));
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
