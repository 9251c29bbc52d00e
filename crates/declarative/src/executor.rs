//! Execution engine - applies resources with optional parallelism

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::{DiffSet, compute_diffs};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteReport};
use anyhow::Result;
use rayon::prelude::*;

/// Execute a plan with the given options and callbacks
///
/// Every resource in the plan gets exactly one entry in the returned
/// report, in plan order. A resource that fails (while detecting state or
/// while applying) is reported as `Failed` without affecting the others.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs, verbose)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked once before any mutation
pub fn execute<P, C>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(&plan.resources);

    if diffs.diffs.is_empty() {
        return Ok(report_without_apply(&plan.resources, &diffs, "nothing to do"));
    }

    if opts.dry_run {
        return Ok(report_without_apply(&plan.resources, &diffs, "dry run"));
    }

    if !confirm.confirm("Apply changes?")? {
        return Ok(report_without_apply(
            &plan.resources,
            &diffs,
            "declined by user",
        ));
    }

    progress.on_batch_start(plan.resources.len());
    let results = execute_batch(&plan.resources, opts.jobs, opts.verbose, progress)?;
    progress.on_batch_complete();

    let mut report = ExecuteReport::default();
    for (resource, result) in plan.resources.iter().zip(results) {
        report.push(
            resource.id(),
            resource.resource_type().to_string(),
            result,
        );
    }
    Ok(report)
}

/// Build a report for a run that performs no mutation
///
/// Pending diffs become `Skipped` with the given reason, detection
/// failures become `Failed`, everything else is `NoChange`.
fn report_without_apply(
    resources: &[Box<dyn Resource>],
    diffs: &DiffSet,
    reason: &str,
) -> ExecuteReport {
    let mut report = ExecuteReport::default();
    for resource in resources {
        let id = resource.id();
        let result = if let Some(error) = diffs.failure_for(&id) {
            ApplyResult::Failed {
                error: error.to_string(),
            }
        } else if diffs.contains(&id) {
            ApplyResult::Skipped {
                reason: reason.to_string(),
            }
        } else {
            ApplyResult::NoChange
        };
        report.push(id, resource.resource_type().to_string(), result);
    }
    report
}

/// Execute a batch of resources, returning results in input order
fn execute_batch<P: ProgressCallback>(
    resources: &[Box<dyn Resource>],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<ApplyResult>> {
    if jobs <= 1 || resources.len() <= 1 {
        return Ok(execute_sequential(resources.iter(), verbose, progress));
    }

    let (parallel, sequential): (Vec<(usize, &Box<dyn Resource>)>, Vec<_>) = resources
        .iter()
        .enumerate()
        .partition(|(_, r)| r.can_parallelize());

    let mut slots: Vec<Option<ApplyResult>> = vec![None; resources.len()];

    for (index, result) in execute_parallel(&parallel, jobs, verbose, progress)? {
        slots[index] = Some(result);
    }

    let sequential_results =
        execute_sequential(sequential.iter().map(|(_, r)| *r), verbose, progress);
    for ((index, _), result) in sequential.iter().zip(sequential_results) {
        slots[*index] = Some(result);
    }

    Ok(slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or(ApplyResult::Failed {
                error: "resource was not applied".to_string(),
            })
        })
        .collect())
}

fn execute_sequential<'a, P: ProgressCallback>(
    resources: impl Iterator<Item = &'a Box<dyn Resource>>,
    verbose: bool,
    progress: &mut P,
) -> Vec<ApplyResult> {
    let mut results = Vec::new();
    for resource in resources {
        let id = resource.id();
        progress.on_resource_start(&id, &resource.description());
        let result = apply_resource(resource.as_ref(), verbose);
        progress.on_resource_complete(&id, &result);
        results.push(result);
    }
    results
}

/// Execute resources in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    resources: &[(usize, &Box<dyn Resource>)],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<(usize, ApplyResult)>> {
    // The progress callback is not shared across threads; results are
    // reported once the pool finishes.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

    let results: Vec<(usize, String, ApplyResult)> = pool.install(|| {
        resources
            .par_iter()
            .map(|&(index, resource)| {
                (
                    index,
                    resource.id(),
                    apply_resource(resource.as_ref(), verbose),
                )
            })
            .collect()
    });

    for (_, id, result) in &results {
        progress.on_resource_complete(id, result);
    }

    Ok(results
        .into_iter()
        .map(|(index, _, result)| (index, result))
        .collect())
}

/// Apply a single resource, converting errors into `Failed`
fn apply_resource(resource: &dyn Resource, verbose: bool) -> ApplyResult {
    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: &ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}
