//! Execution engine - plugin setting executor with UI integration

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::{
    ApplyResult, AutoConfirm, ConfirmCallback, ExecuteOptions, ExecuteReport, ExecuteSummary,
    ExecutionPlan, compute_diffs, execute,
};
use std::process::Command;

use super::differ::display_diff;
use crate::progress::BarProgress;
use crate::ui;

/// Options for a run (adds confirmation and output control to [`ExecuteOptions`])
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
    /// Suppress the diff and progress bar
    pub quiet: bool,
    /// Print the report as JSON instead of text
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
            verbose: false,
            quiet: false,
            json: false,
        }
    }
}

impl RunOptions {
    fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            dry_run: self.dry_run,
            jobs: self.jobs.max(1),
            verbose: self.verbose,
        }
    }

    fn human(&self) -> bool {
        !self.json
    }
}

/// Confirmation through an interactive dialoguer prompt
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;

        Ok(confirmed)
    }
}

/// Execute the plan with diff display, confirmation, and reporting
pub fn run(plan: &ExecutionPlan, opts: &RunOptions) -> Result<ExecuteReport> {
    if opts.human() && !opts.quiet {
        display_diff(&compute_diffs(&plan.resources));
    }

    let mut progress = BarProgress::new(opts.quiet || opts.json);
    let exec_opts = opts.execute_options();
    let report = if opts.yes {
        execute(plan, &exec_opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(plan, &exec_opts, &mut progress, &mut PromptConfirm)?
    };

    let restarts = if report.summary.total_changes() > 0 {
        restart_services(&plan.post_actions, opts.human())
    } else {
        Vec::new()
    };

    if opts.json {
        print_json(&report, &restarts)?;
    } else {
        print_report(&report, opts);
        print_summary(&report.summary, opts.dry_run);
    }

    Ok(report)
}

/// Outcome of restarting one service
#[derive(Debug, serde::Serialize)]
struct Restart {
    service: String,
    restarted: bool,
}

/// Restart services after changes; failures are warnings
fn restart_services(services: &[String], human: bool) -> Vec<Restart> {
    if services.is_empty() {
        return Vec::new();
    }
    if human {
        println!();
        println!("  {} Restarting services...", "→".cyan());
    }

    services
        .iter()
        .map(|service| {
            let restarted = restart_service(service);
            if human {
                if restarted {
                    println!("    {} Restarted {}", "✓".green(), service);
                } else {
                    println!("    {} Could not restart {}", "⚠".yellow(), service);
                }
            }
            Restart {
                service: service.clone(),
                restarted,
            }
        })
        .collect()
}

fn restart_service(service: &str) -> bool {
    match Command::new("systemctl").args(["restart", service]).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            log::warn!("systemctl restart {service} exited with {status}");
            false
        }
        Err(e) => {
            log::warn!("Failed to run systemctl restart {service}: {e}");
            false
        }
    }
}

fn print_json(report: &ExecuteReport, restarts: &[Restart]) -> Result<()> {
    let output = serde_json::json!({
        "entries": report.entries,
        "summary": report.summary,
        "restarts": restarts,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize report")?
    );
    Ok(())
}

/// Print one line per setting
fn print_report(report: &ExecuteReport, opts: &RunOptions) {
    if report.entries.is_empty() {
        return;
    }
    println!();
    for entry in &report.entries {
        if opts.quiet && entry.result.is_success() {
            continue;
        }
        let label = match &entry.result {
            ApplyResult::Failed { .. } => entry.result.label().red(),
            r if r.is_change() => r.label().green(),
            r => r.label().dimmed(),
        };
        let detail = ui::result_detail(&entry.result);
        println!(
            "  {} {:<36} {:<9} {}",
            ui::result_symbol(&entry.result),
            entry.resource_id,
            label,
            detail.dimmed()
        );
    }
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, dry_run: bool) {
    println!();
    if dry_run {
        ui::info("Dry run - no changes made");
    } else if summary.is_success() {
        println!("  {} Plugin settings applied", "✓".green().bold());
    } else {
        println!("  {} Plugin settings applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} settings created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} settings changed", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} settings removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} settings unchanged", summary.no_change);
    }
    if summary.skipped > 0 {
        println!("    • {} settings skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "settings".red());
    }
}
