//! Reconciliation planning.
//!
//! Splits package records into those that can be installed right away and
//! those whose candidate version is unknown or too old. The second group
//! exists because freshly added package sources may not report a candidate
//! until the package index has been refreshed; callers refresh candidates
//! for that group and plan it once more.

use anyhow::Result;
use log::warn;

use crate::package::{LATEST, PackageRecord, version_less};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallPlan {
    /// Ready to install with the manager's normal install command.
    pub to_install: Vec<PackageRecord>,
    /// Need candidate refresh (or a manager-wide update) first.
    pub needs_update: Vec<PackageRecord>,
    /// Satisfied or held.
    pub skipped: Vec<PackageRecord>,
}

impl InstallPlan {
    /// Nothing to install and nothing waiting on an update.
    pub fn is_settled(&self) -> bool {
        self.to_install.is_empty() && self.needs_update.is_empty()
    }
}

/// Classify records. Each record ends up in exactly one list:
///
/// 1. not installed, any version required → install
/// 2. not installed, candidate known and newer than required → install
/// 3. not installed otherwise → needs update
/// 4. installed and held → skipped with a warning
/// 5. installed, pinned, installed version older than required → needs update
/// 6. anything else → skipped
#[tracing::instrument(skip(records))]
pub fn prepare_install(records: Vec<PackageRecord>) -> Result<InstallPlan> {
    let mut plan = InstallPlan::default();
    for record in records {
        if !record.is_installed() {
            if record.requires_latest() {
                plan.to_install.push(record);
            } else if record.candidate_version() != LATEST
                && version_less(record.required_version(), record.candidate_version())?
            {
                plan.to_install.push(record);
            } else {
                plan.needs_update.push(record);
            }
        } else if record.is_on_hold() {
            warn!("{} is on hold, ignoring install request", record.name);
            plan.skipped.push(record);
        } else if !record.requires_latest() && installed_older(&record)? {
            plan.needs_update.push(record);
        } else {
            plan.skipped.push(record);
        }
    }
    Ok(plan)
}

fn installed_older(record: &PackageRecord) -> Result<bool> {
    match &record.version {
        Some(version) => version_less(version, record.required_version()),
        // Installed but the version could not be determined
        None => Ok(true),
    }
}
