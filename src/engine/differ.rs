//! Diff display and file previews

use colored::Colorize;
use declarative::{DiffSet, DiffSummary, ResourceDiff, ResourceState};

use crate::provider::{FileProvider, IniFileProvider};
use crate::resource::{ResourceDescriptor, reconcile};
use crate::ui;

/// Display pending changes and detection failures
pub fn display_diff(diffs: &DiffSet) {
    if diffs.is_clean() {
        println!();
        println!("  {} All settings in sync", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Plugin Settings Diff".bold()
    );
    println!("│");

    for diff in &diffs.diffs {
        println!(
            "│   {} {:<36} {}",
            diff_symbol(diff),
            diff.resource_id,
            describe_change(diff).dimmed()
        );
    }

    for failure in &diffs.failures {
        println!(
            "│   {} {:<36} {}",
            "✗".red(),
            failure.resource_id,
            failure.error.red()
        );
    }

    let summary = DiffSummary::from_diffs(&diffs.diffs);
    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to add, {} to change, {} to remove, {} failed",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red(),
        diffs.failures.len().to_string().bold()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn diff_symbol(diff: &ResourceDiff) -> colored::ColoredString {
    if diff.is_addition() {
        "+".green()
    } else if diff.is_removal() {
        "-".red()
    } else if diff.is_modification() {
        "~".yellow()
    } else {
        "?".dimmed()
    }
}

/// Old and new value of a pending change
pub fn describe_change(diff: &ResourceDiff) -> String {
    match (&diff.current, &diff.desired) {
        (ResourceState::Absent, ResourceState::Present { details }) => {
            format!("(absent) → {}", ui::display_value(details.as_deref()))
        }
        (ResourceState::Modified { from, to }, _) => format!(
            "{} → {}",
            ui::display_value(Some(from)),
            ui::display_value(Some(to))
        ),
        (ResourceState::Present { details: from }, ResourceState::Present { details: to }) => {
            format!(
                "{} → {}",
                ui::display_value(from.as_deref()),
                ui::display_value(to.as_deref())
            )
        }
        (ResourceState::Present { details }, ResourceState::Absent) => {
            format!("{} → (absent)", ui::display_value(details.as_deref()))
        }
        _ => String::new(),
    }
}

/// Render the file before and after reconciling `descriptors`, without writing
///
/// Settings that cannot be reconciled are left out of the preview.
pub fn preview(
    provider: &IniFileProvider,
    descriptors: &[ResourceDescriptor],
) -> anyhow::Result<(String, String)> {
    let staged = provider.stage()?;
    for descriptor in descriptors {
        if let Err(e) = reconcile(descriptor, &staged) {
            log::debug!("Leaving {descriptor} out of preview: {e}");
        }
    }
    log::trace!("Previewed {} against {}", descriptors.len(), staged.location());
    Ok((staged.original().to_string(), staged.render()))
}

/// Print a line diff between two versions of a file
pub fn show_text_diff(old: &str, new: &str) {
    let diff = similar::TextDiff::from_lines(old, new);
    let mut has_changes = false;

    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                has_changes = true;
                print!("    {}", format!("- {change}").red());
            }
            similar::ChangeTag::Insert => {
                has_changes = true;
                print!("    {}", format!("+ {change}").green());
            }
            similar::ChangeTag::Equal => {}
        }
        if change.missing_newline() {
            println!();
        }
    }

    if !has_changes {
        println!("    {}", "(file unchanged)".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_preview_renders_pending_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.ini");
        let original = "[ovs]\nlocal_ip = 10.0.0.1\nenable_tunneling = True\n";
        fs::write(&path, original).unwrap();
        let provider = IniFileProvider::new(&path);

        let descriptors = vec![
            ResourceDescriptor::present("ovs/local_ip", "10.0.0.2").unwrap(),
            ResourceDescriptor::absent("ovs/enable_tunneling").unwrap(),
            ResourceDescriptor::present("agent/polling_interval", "2").unwrap(),
        ];

        let (before, after) = preview(&provider, &descriptors).unwrap();
        assert_eq!(before, original);
        assert_eq!(
            after,
            "[ovs]\nlocal_ip = 10.0.0.2\n\n[agent]\npolling_interval = 2\n"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_preview_skips_ambiguous_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.ini");
        let original = "[ovs]\na = 1\na = 2\nb = 1\n";
        fs::write(&path, original).unwrap();
        let provider = IniFileProvider::new(&path);

        let descriptors = vec![
            ResourceDescriptor::present("ovs/a", "3").unwrap(),
            ResourceDescriptor::present("ovs/b", "2").unwrap(),
        ];

        let (_, after) = preview(&provider, &descriptors).unwrap();
        assert_eq!(after, "[ovs]\na = 1\na = 2\nb = 2\n");
    }

    #[test]
    fn test_describe_change() {
        let diff = ResourceDiff {
            resource_id: "ovs/local_ip".into(),
            resource_type: "neutron_plugin_ovs".into(),
            description: String::new(),
            current: ResourceState::Modified {
                from: "10.0.0.1".into(),
                to: "10.0.0.2".into(),
            },
            desired: ResourceState::Present {
                details: Some("10.0.0.2".into()),
            },
        };
        assert_eq!(describe_change(&diff), "10.0.0.1 → 10.0.0.2");
    }
}
