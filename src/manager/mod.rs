//! Package manager abstraction.
//!
//! Each backend (apt, pip) implements [`PackageManager`] on top of a
//! [`CommandShell`], which owns the runtime and knows how to print, echo or
//! run a command line and when to escalate privileges.

mod apt;
mod pip;
mod registry;

use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;

use crate::package::{PackageRecord, PackageRequest};
use crate::runtime::Runtime;

pub use apt::{AptPackageManager, BULK_QUERY_THRESHOLD, MAX_INSTALL_ARGS, batch_names};
pub use pip::PipPackageManager;
pub use registry::{ManagerFactory, ManagerRegistry};

/// Privilege-escalation prefix.
pub const SUDO: &str = "sudo";

/// How commands that change the system are carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecMode {
    /// Print commands instead of running them.
    pub dry_run: bool,
    /// Print commands before running them.
    pub verbose: bool,
}

/// Result of querying a manager for a list of requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageInfo {
    /// Resolved records, in request order.
    pub records: Vec<PackageRecord>,
    /// Requests no query could resolve, in request order.
    pub missing: Vec<PackageRequest>,
}

impl PackageInfo {
    /// Assemble from per-request lookups, keeping request order.
    pub fn from_lookups(
        requests: &[PackageRequest],
        lookups: Vec<Option<PackageRecord>>,
    ) -> Self {
        let mut info = PackageInfo::default();
        for (request, lookup) in requests.iter().zip(lookups) {
            match lookup {
                Some(record) => info.records.push(record),
                None => info.missing.push(request.clone()),
            }
        }
        info
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageManager {
    /// Local manager key from the configuration.
    fn name(&self) -> &str;

    /// Query installed and candidate state for `requests`.
    ///
    /// Records come back in request order; requests that could not be
    /// resolved are reported separately.
    fn get_package_info(&self, requests: &[PackageRequest], dry_run: bool) -> Result<PackageInfo>;

    /// Install `records`, optionally refreshing and upgrading the whole
    /// system first. A failing install command is logged, not returned.
    fn install_packages(
        &self,
        records: &[PackageRecord],
        update_first: bool,
        mode: ExecMode,
    ) -> Result<()>;

    /// Re-read installed and candidate versions for `records` in place.
    fn refresh_package_candidates(&self, records: &mut [PackageRecord], mode: ExecMode)
    -> Result<()>;

    /// Run `command` with privilege escalation when needed.
    fn execute_as_root(&self, command: &str, mode: ExecMode) -> Result<bool>;
}

/// Runs backend commands through the runtime.
#[derive(Clone)]
pub struct CommandShell {
    runtime: Arc<dyn Runtime>,
    no_root: bool,
}

impl CommandShell {
    pub fn new(runtime: Arc<dyn Runtime>, no_root: bool) -> Self {
        Self { runtime, no_root }
    }

    /// Print, echo or run a command line according to `mode`.
    pub fn execute(&self, command: &str, mode: ExecMode) -> Result<bool> {
        if mode.dry_run {
            self.runtime.print_line(command);
            return Ok(true);
        }
        if mode.verbose {
            self.runtime.print_line(command);
        }
        let success = self.runtime.run_shell(command)?;
        if !success {
            warn!("command failed: {}", command);
        }
        Ok(success)
    }

    /// The command line as it would be run as root.
    pub fn root_command(&self, command: &str) -> String {
        if self.no_root || self.runtime.is_privileged() {
            command.to_string()
        } else {
            format!("{} {}", SUDO, command)
        }
    }

    pub fn execute_as_root(&self, command: &str, mode: ExecMode) -> Result<bool> {
        self.execute(&self.root_command(command), mode)
    }

    /// Capture the output of a query command. Queries run in every mode.
    pub fn read(&self, program: &str, args: &[String]) -> Result<String> {
        debug!("Running {} {}", program, args.join(" "));
        self.runtime.read_command(program, args)
    }
}

/// Quote a path or argument for `sh -c` when it contains anything beyond
/// plain word characters.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ':' | '=' | ','));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
