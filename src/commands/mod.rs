//! Orchestration of a run: load configuration, pick the managers for this
//! platform, query them, then list and/or install.

mod install;
mod list;

use anyhow::{Result, bail};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::manager::{ExecMode, ManagerRegistry, PackageManager};
use crate::package::{PackageRecord, PackageRequest};
use crate::platform::Selector;
use crate::runtime::Runtime;

pub use install::{install_custom, install_selection};
pub use list::{print_selections, write_status_table};

/// Command line switches that shape a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Print the selected packages.
    pub list: bool,
    pub verbose: bool,
    /// Install what is missing or outdated.
    pub install: bool,
    /// Never prefix commands with sudo.
    pub no_root: bool,
    /// Print commands instead of running them.
    pub debug: bool,
}

impl Options {
    pub fn mode(&self) -> ExecMode {
        ExecMode {
            dry_run: self.debug,
            verbose: self.verbose,
        }
    }
}

/// One manager with what it reported for its configured packages.
pub struct Selection {
    pub manager: Box<dyn PackageManager>,
    pub records: Vec<PackageRecord>,
    pub missing: Vec<PackageRequest>,
    pub custom: Vec<PackageRequest>,
}

/// Instantiate the managers named in `package-managers` and drop the ones
/// whose `package-selector` entry does not match this platform.
///
/// Sections belonging to dropped or unknown managers are removed from
/// `config`. Managers come back in configuration order.
#[tracing::instrument(skip_all)]
pub fn select_managers(
    config: &mut Config,
    registry: &ManagerRegistry,
    runtime: &Arc<dyn Runtime>,
    no_root: bool,
) -> Result<Vec<Box<dyn PackageManager>>> {
    let mut managers: Vec<Box<dyn PackageManager>> = Vec::new();
    for (key, backend) in config.package_managers()? {
        match registry.create(&backend, &key, Arc::clone(runtime), no_root) {
            Some(manager) => managers.push(manager),
            None => warn!("{} package-manager class not found", backend),
        }
    }
    if managers.is_empty() {
        bail!("no package-managers map to classes");
    }

    let Some(selectors) = config.selectors() else {
        return Ok(managers);
    };

    let platform = runtime.platform();
    debug!("Platform descriptor: {}", platform);
    for (key, selector) in selectors {
        let Some(index) = managers.iter().position(|m| m.name() == key) else {
            config.remove_section(&key);
            continue;
        };
        if !Selector::parse(&selector)?.matches(&platform) {
            info!("{} does not apply to {}", key, platform);
            managers.remove(index);
            config.remove_section(&key);
        }
    }
    if managers.is_empty() {
        bail!("no package-managers after processing package-selector section");
    }
    Ok(managers)
}

/// Query every selected manager for the state of its configured packages.
/// Managers without a package section are skipped.
#[tracing::instrument(skip_all)]
pub fn load_selections(
    config: &Config,
    managers: Vec<Box<dyn PackageManager>>,
    dry_run: bool,
) -> Result<Vec<Selection>> {
    let mut selections = Vec::new();
    for manager in managers {
        let Some(requests) = config.manager_requests(manager.name())? else {
            debug!("no [{}] section, skipping", manager.name());
            continue;
        };
        let info = manager.get_package_info(&requests.packages, dry_run)?;
        selections.push(Selection {
            manager,
            records: info.records,
            missing: info.missing,
            custom: requests.custom,
        });
    }
    Ok(selections)
}

/// Run the whole pipeline for the given configuration files.
#[tracing::instrument(skip(runtime, registry))]
pub fn run(
    runtime: Arc<dyn Runtime>,
    registry: &ManagerRegistry,
    paths: &[PathBuf],
    options: &Options,
) -> Result<()> {
    let mut config = Config::load(runtime.as_ref(), paths)?;
    let managers = select_managers(&mut config, registry, &runtime, options.no_root)?;
    let selections = load_selections(&config, managers, options.debug)?;

    if options.list {
        let stdout = std::io::stdout();
        print_selections(&mut stdout.lock(), &selections, options.verbose)?;
    }

    if options.install {
        for selection in selections {
            install_selection(runtime.as_ref(), selection, options.mode())?;
        }
    }
    Ok(())
}
