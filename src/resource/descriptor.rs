//! Plugin setting descriptor - identity validation and value normalization
//!
//! A descriptor is the validated form of one declaration: which
//! `section/setting` it targets, whether the setting must exist, and the
//! normalized value it must have. Descriptors are immutable once built.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::ValidationError;

/// `<section>/<setting>`, both halves non-empty and free of whitespace
static IDENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+/\S+$").expect("identity pattern is valid"));

/// Whether a setting must exist or must be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl FromStr for Ensure {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(ValidationError::InvalidEnsure(other.to_string())),
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Normalize a raw value: render it as a string and strip surrounding whitespace
///
/// Never fails; a missing value normalizes to the empty string. Applying
/// it to an already normalized value returns that value unchanged.
pub fn normalize<V: fmt::Display + ?Sized>(raw: Option<&V>) -> String {
    raw.map(|v| v.to_string().trim().to_string())
        .unwrap_or_default()
}

/// What the descriptor wants the file to contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub ensure: Ensure,
    /// Normalized value; `None` when `ensure` is absent
    pub value: Option<String>,
}

/// A validated declaration for one setting of the plugin INI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    identity: String,
    section: String,
    setting: String,
    ensure: Ensure,
    value: Option<String>,
}

impl ResourceDescriptor {
    /// Build a descriptor, validating the identity and normalizing the value
    ///
    /// The value is ignored when `ensure` is [`Ensure::Absent`].
    pub fn new<V>(
        identity: &str,
        ensure: Ensure,
        raw_value: Option<&V>,
    ) -> Result<Self, ValidationError>
    where
        V: fmt::Display + ?Sized,
    {
        let (section, setting) = parse_identity(identity)?;
        let value = match ensure {
            Ensure::Present => Some(normalize(raw_value)),
            Ensure::Absent => None,
        };

        Ok(Self {
            identity: identity.to_string(),
            section: section.to_string(),
            setting: setting.to_string(),
            ensure,
            value,
        })
    }

    /// Build a descriptor from textual declaration fields
    ///
    /// `ensure` defaults to `present` when not given.
    pub fn declare<V>(
        identity: &str,
        ensure: Option<&str>,
        raw_value: Option<&V>,
    ) -> Result<Self, ValidationError>
    where
        V: fmt::Display + ?Sized,
    {
        parse_identity(identity)?;
        let ensure = ensure.map(str::parse).transpose()?.unwrap_or_default();
        Self::new(identity, ensure, raw_value)
    }

    /// Shorthand for a setting that must exist with `value`
    pub fn present(identity: &str, value: &str) -> Result<Self, ValidationError> {
        Self::new(identity, Ensure::Present, Some(value))
    }

    /// Shorthand for a setting that must not exist
    pub fn absent(identity: &str) -> Result<Self, ValidationError> {
        Self::new::<str>(identity, Ensure::Absent, None)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn ensure(&self) -> Ensure {
        self.ensure
    }

    /// Normalized desired value, only when `ensure` is present
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Desired ensure state and normalized value
    pub fn desired_state(&self) -> DesiredState {
        DesiredState {
            ensure: self.ensure,
            value: self.value.clone(),
        }
    }

    /// Whether the file's actual value already satisfies this descriptor
    ///
    /// `actual` goes through the same normalization as the declared value,
    /// so whitespace left behind by earlier writers never counts as drift.
    pub fn is_in_sync(&self, actual: Option<&str>) -> bool {
        match (self.ensure, actual) {
            (Ensure::Absent, None) => true,
            (Ensure::Absent, Some(_)) | (Ensure::Present, None) => false,
            (Ensure::Present, Some(actual)) => {
                self.value.as_deref() == Some(normalize(Some(actual)).as_str())
            }
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

/// Validate an identity and split it into `(section, setting)` at the first `/`
pub fn parse_identity(identity: &str) -> Result<(&str, &str), ValidationError> {
    if !IDENTITY_PATTERN.is_match(identity) {
        return Err(ValidationError::InvalidIdentity(identity.to_string()));
    }
    identity
        .split_once('/')
        .ok_or_else(|| ValidationError::InvalidIdentity(identity.to_string()))
}
