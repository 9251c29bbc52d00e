//! Execution planner - binds catalog descriptors to a file provider

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::provider::FileProvider;
use crate::resource::PluginSetting;
use declarative::ExecutionPlan;

/// Build an execution plan from a catalog
///
/// Every descriptor becomes one [`PluginSetting`] sharing `provider`, in
/// declaration order. `restart` lists services restarted after changes.
pub fn build_plan(
    catalog: Catalog,
    provider: &Arc<dyn FileProvider>,
    restart: &[String],
) -> ExecutionPlan {
    let mut plan = ExecutionPlan::new();

    for descriptor in catalog {
        plan.add_resource(Box::new(PluginSetting::new(
            descriptor,
            Arc::clone(provider),
        )));
    }

    for service in restart {
        plan.add_post_action(service.clone());
    }

    log::debug!(
        "Planned {} setting(s), {} post action(s)",
        plan.total_resources(),
        plan.post_actions.len()
    );
    plan
}
