//! Manifest-driven commands
//!
//! - `apply` - Make the plugin file match the manifest
//! - `diff` - Preview what apply would change
//! - `status` - Show each declared setting as in sync, drifted, or failing

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::{DiffSet, ExecutionPlan, compute_diffs};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Context;
use crate::catalog::Catalog;
use crate::cli::{ApplyArgs, ManifestArgs};
use crate::config::Manifest;
use crate::engine::differ::{describe_change, display_diff, preview, show_text_diff};
use crate::engine::{RunOptions, build_plan, run};
use crate::paths;
use crate::provider::{FileProvider, IniFileProvider};
use crate::resource::ResourceDescriptor;
use crate::ui;

/// Everything a manifest-driven command works on
struct Session {
    manifest_path: PathBuf,
    provider: Arc<IniFileProvider>,
    /// Descriptors selected by the target filter
    descriptors: Vec<ResourceDescriptor>,
    plan: ExecutionPlan,
}

impl Session {
    fn load(ctx: &Context, args: &ManifestArgs) -> Result<Self> {
        let manifest_path = match &args.manifest {
            Some(path) => paths::expand(path),
            None => paths::default_manifest()?,
        };
        let manifest = Manifest::load(&manifest_path)?;
        let catalog = Catalog::from_manifest(&manifest)
            .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;
        if catalog.is_empty() {
            log::warn!("{} declares no settings", manifest_path.display());
        }

        let provider = Arc::new(super::open_provider(ctx, Some(&manifest)));
        let shared: Arc<dyn FileProvider> = provider.clone();
        let plan = build_plan(catalog.clone(), &shared, &manifest.restart)
            .filter_by_target(args.target.as_deref());

        let selected: HashSet<String> = plan.resources.iter().map(|r| r.id()).collect();
        let descriptors = catalog
            .descriptors()
            .iter()
            .filter(|d| selected.contains(d.identity()))
            .cloned()
            .collect();

        Ok(Self {
            manifest_path,
            provider,
            descriptors,
            plan,
        })
    }

    fn print_header(&self, title: &str) {
        ui::header(title);
        ui::kv("File", &self.provider.path().display().to_string());
        ui::kv("Manifest", &self.manifest_path.display().to_string());
    }
}

/// Converge the plugin file to the manifest
pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<bool> {
    let session = Session::load(ctx, &args.source)?;
    let human = !ctx.quiet && !args.json;

    if session.plan.is_empty() {
        if human {
            ui::warn("No settings match");
        }
        return Ok(true);
    }

    if human {
        session.print_header("Apply Plugin Settings");
    }

    let opts = RunOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs),
        yes: args.yes,
        verbose: ctx.verbose > 0,
        quiet: ctx.quiet,
        json: args.json,
    };
    let report = run(&session.plan, &opts)?;

    Ok(report.summary.is_success())
}

/// Show pending changes and a preview of the resulting file
pub fn diff(ctx: &Context, args: &ManifestArgs) -> Result<bool> {
    let session = Session::load(ctx, args)?;
    session.print_header("Plugin Settings Diff");

    let diffs = compute_diffs(&session.plan.resources);
    display_diff(&diffs);

    if !diffs.diffs.is_empty() {
        println!();
        println!("  {}", "File preview".bold());
        match preview(&session.provider, &session.descriptors) {
            Ok((old, new)) => show_text_diff(&old, &new),
            Err(e) => ui::warn(&format!("Cannot preview file: {e:#}")),
        }
    }

    Ok(diffs.failures.is_empty())
}

/// Show the state of every declared setting
pub fn status(ctx: &Context, args: &ManifestArgs) -> Result<bool> {
    let session = Session::load(ctx, args)?;
    session.print_header("Plugin Settings Status");

    let diffs = compute_diffs(&session.plan.resources);
    println!();
    for resource in &session.plan.resources {
        print_status_line(&resource.id(), &diffs);
    }

    let total = session.plan.total_resources();
    let in_sync = total - diffs.diffs.len() - diffs.failures.len();
    println!();
    println!(
        "  {} in sync, {} drifted, {} failed",
        in_sync.to_string().green(),
        diffs.diffs.len().to_string().yellow(),
        diffs.failures.len().to_string().red()
    );

    Ok(diffs.failures.is_empty())
}

fn print_status_line(id: &str, diffs: &DiffSet) {
    if let Some(error) = diffs.failure_for(id) {
        println!(
            "  {} {:<36} {:<8} {}",
            "✗".red(),
            id,
            "failed".red(),
            error.dimmed()
        );
    } else if let Some(diff) = diffs.diffs.iter().find(|d| d.resource_id == id) {
        println!(
            "  {} {:<36} {:<8} {}",
            "~".yellow(),
            id,
            "drifted".yellow(),
            describe_change(diff).dimmed()
        );
    } else {
        println!("  {} {:<36} {}", "✓".green(), id, "in sync".dimmed());
    }
}
