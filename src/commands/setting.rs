//! One-off commands on a single setting: `get`, `set`, `unset`

use anyhow::{Context as AnyhowContext, Result};
use std::sync::Arc;

use crate::Context;
use crate::catalog::Catalog;
use crate::engine::{RunOptions, build_plan, run};
use crate::provider::FileProvider;
use crate::resource::{ResourceDescriptor, normalize, parse_identity};
use crate::ui;

/// Print the normalized value, `false` when the setting is absent
pub fn get(ctx: &Context, identity: &str) -> Result<bool> {
    let (section, setting) = parse_identity(identity)?;
    let provider = super::open_provider(ctx, None);

    let value = provider
        .read(section, setting)
        .with_context(|| format!("Failed to read {identity}"))?;

    match value {
        Some(value) => {
            println!("{}", normalize(Some(value.as_str())));
            Ok(true)
        }
        None => {
            if !ctx.quiet {
                ui::warn(&format!(
                    "{identity} is not set in {}",
                    provider.path().display()
                ));
            }
            Ok(false)
        }
    }
}

/// Ensure a setting has `value`
pub fn set(ctx: &Context, identity: &str, value: &str, dry_run: bool) -> Result<bool> {
    let descriptor = ResourceDescriptor::present(identity, value)?;
    converge(ctx, descriptor, dry_run)
}

/// Ensure a setting is absent
pub fn unset(ctx: &Context, identity: &str, dry_run: bool) -> Result<bool> {
    let descriptor = ResourceDescriptor::absent(identity)?;
    converge(ctx, descriptor, dry_run)
}

fn converge(ctx: &Context, descriptor: ResourceDescriptor, dry_run: bool) -> Result<bool> {
    let provider: Arc<dyn FileProvider> = Arc::new(super::open_provider(ctx, None));
    let plan = build_plan(Catalog::from(descriptor), &provider, &[]);

    let opts = RunOptions {
        dry_run,
        jobs: 1,
        yes: true,
        verbose: ctx.verbose > 0,
        quiet: ctx.quiet,
        json: false,
    };
    let report = run(&plan, &opts)?;

    Ok(report.summary.is_success())
}
