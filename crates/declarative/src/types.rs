//! Core types for declarative resource management

use serde::{Deserialize, Serialize};

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
}

impl ResourceState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Result of applying a resource
///
/// Mutating variants carry the values involved so callers can report
/// what changed, not only that something did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyResult {
    /// Already in the desired state
    NoChange,
    /// Resource was created
    Created { details: Option<String> },
    /// Resource was changed from one value to another
    Modified { from: String, to: String },
    /// Resource was removed
    Removed { details: Option<String> },
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Modified { .. } | Self::Removed { .. }
        )
    }

    /// Short label used in user-facing reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "unchanged",
            Self::Created { .. } | Self::Modified { .. } | Self::Removed { .. } => "changed",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.modified + self.removed + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created { .. } => self.created += 1,
            ApplyResult::Modified { .. } => self.modified += 1,
            ApplyResult::Removed { .. } => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Outcome for a single resource within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub resource_id: String,
    pub resource_type: String,
    pub result: ApplyResult,
}

/// Per-resource outcomes of a run, in plan order, plus totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteReport {
    pub entries: Vec<ResourceReport>,
    pub summary: ExecuteSummary,
}

impl ExecuteReport {
    /// Record one resource outcome
    pub fn push(&mut self, resource_id: String, resource_type: String, result: ApplyResult) {
        self.summary.add_result(&result);
        self.entries.push(ResourceReport {
            resource_id,
            resource_type,
            result,
        });
    }

    /// Entries that failed
    pub fn failures(&self) -> impl Iterator<Item = &ResourceReport> {
        self.entries.iter().filter(|e| !e.result.is_success())
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_changes() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created { details: None });
        summary.add_result(&ApplyResult::Modified {
            from: "a".into(),
            to: "b".into(),
        });
        summary.add_result(&ApplyResult::NoChange);
        summary.add_result(&ApplyResult::Failed {
            error: "boom".into(),
        });

        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let mut report = ExecuteReport::default();
        report.push(
            "ovs/bridge_mappings".into(),
            "test".into(),
            ApplyResult::Modified {
                from: "old".into(),
                to: "new".into(),
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["result"]["status"], "modified");
        assert_eq!(json["entries"][0]["result"]["from"], "old");
        assert_eq!(json["summary"]["modified"], 1);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ApplyResult::NoChange.label(), "unchanged");
        assert_eq!(ApplyResult::Removed { details: None }.label(), "changed");
        assert_eq!(
            ApplyResult::Skipped {
                reason: "dry run".into()
            }
            .label(),
            "skipped"
        );
    }
}
