use anyhow::{Result, bail};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::Path;

use super::Selection;
use super::list::write_status_table;
use crate::manager::{ExecMode, PackageManager, shell_quote};
use crate::package::PackageRequest;
use crate::planner::{InstallPlan, prepare_install};
use crate::runtime::Runtime;

/// Bring one manager's packages up to date: standard packages first, then
/// the packages provided by custom actions.
#[tracing::instrument(skip_all, fields(manager = %selection.manager.name()))]
pub fn install_selection(runtime: &dyn Runtime, selection: Selection, mode: ExecMode) -> Result<()> {
    let Selection {
        manager,
        records,
        missing,
        custom,
    } = selection;

    if !missing.is_empty() {
        warn!(
            "{}: cannot resolve packages {}",
            manager.name(),
            request_names(&missing)
        );
    }

    let plan = prepare_install(records)?;
    if plan.is_settled() {
        println!("Packages up to date - no action required");
    } else {
        reconcile(
            manager.as_ref(),
            plan,
            mode,
            "unable to satisfy all package constraints",
        )?;
    }

    install_custom(runtime, manager.as_ref(), &custom, mode)
}

/// Install packages provided by custom actions.
///
/// When any of them is unknown to the manager or needs a newer version,
/// the actions of the unsatisfied ones are run. Packages that were unknown
/// get one more query and install round afterwards, since an action
/// usually adds the source that provides them.
#[tracing::instrument(skip_all, fields(manager = %manager.name()))]
pub fn install_custom(
    runtime: &dyn Runtime,
    manager: &dyn PackageManager,
    custom: &[PackageRequest],
    mode: ExecMode,
) -> Result<()> {
    if custom.is_empty() {
        return Ok(());
    }

    let info = manager.get_package_info(custom, mode.dry_run)?;
    let plan = prepare_install(info.records)?;

    if !info.missing.is_empty() || !plan.needs_update.is_empty() {
        let unsatisfied: HashSet<&str> = info
            .missing
            .iter()
            .map(|r| r.name.as_str())
            .chain(plan.needs_update.iter().map(|r| r.name.as_str()))
            .chain(plan.to_install.iter().map(|r| r.name.as_str()))
            .collect();
        let pending = custom
            .iter()
            .filter(|request| unsatisfied.contains(request.name.as_str()));
        run_custom_actions(runtime, manager, pending, mode)?;
    } else if plan.to_install.is_empty() {
        println!("Custom packages up to date - no action required");
    } else {
        reconcile(
            manager,
            plan,
            mode,
            "unable to satisfy all package constraints for custom actions",
        )?;
    }

    if !info.missing.is_empty() {
        let retry = manager.get_package_info(custom, mode.dry_run)?;
        let plan = prepare_install(retry.records)?;
        manager.install_packages(&plan.to_install, true, mode)?;

        let last = manager.get_package_info(custom, mode.dry_run)?;
        if !last.missing.is_empty() {
            warn!("cannot resolve missing packages {}", request_names(&last.missing));
        }
    }
    Ok(())
}

/// Install what is ready, refresh candidates for the rest and install what
/// became ready. Whatever still cannot be satisfied is reported.
fn reconcile(
    manager: &dyn PackageManager,
    plan: InstallPlan,
    mode: ExecMode,
    unsatisfied_message: &str,
) -> Result<()> {
    let InstallPlan {
        to_install,
        mut needs_update,
        ..
    } = plan;

    manager.install_packages(&to_install, !needs_update.is_empty(), mode)?;
    manager.refresh_package_candidates(&mut needs_update, mode)?;

    let retry = prepare_install(needs_update)?;
    manager.install_packages(&retry.to_install, false, mode)?;

    if !retry.needs_update.is_empty() {
        warn!("{}", unsatisfied_message);
        let stdout = std::io::stdout();
        write_status_table(&mut stdout.lock(), &retry.needs_update)?;
    }
    Ok(())
}

/// Run each distinct action executable once, in configuration order.
fn run_custom_actions<'a>(
    runtime: &dyn Runtime,
    manager: &dyn PackageManager,
    requests: impl IntoIterator<Item = &'a PackageRequest>,
    mode: ExecMode,
) -> Result<()> {
    let mut seen: HashSet<&Path> = HashSet::new();
    for request in requests {
        let Some(action) = &request.custom_action else {
            continue;
        };
        if !seen.insert(action.run.as_path()) {
            continue;
        }
        if !runtime.is_file(&action.run) {
            bail!("cannot locate custom action {}", action.run.display());
        }
        debug!("Running custom action {:?} for {}", action.run, request.name);
        let command = shell_quote(&action.run.to_string_lossy());
        if !manager.execute_as_root(&command, mode)? {
            bail!("execution failed {}", action.run.display());
        }
    }
    Ok(())
}

fn request_names(requests: &[PackageRequest]) -> String {
    requests
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
