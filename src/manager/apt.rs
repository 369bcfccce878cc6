//! apt/dpkg backend.

use anyhow::Result;
use log::{debug, warn};
use std::collections::HashMap;

use super::{CommandShell, ExecMode, PackageInfo, PackageManager};
use crate::package::{PackageRecord, PackageRequest};
use crate::parser::{AptPolicy, DPKG_QUERY_FORMAT, parse_apt_policy, parse_dpkg_listing};

/// Above this many requested names one bulk `dpkg-query` listing is cheaper
/// than a query per name.
pub const BULK_QUERY_THRESHOLD: usize = 500;

/// Maximum width of the package list passed to one install invocation.
pub const MAX_INSTALL_ARGS: usize = 80;

const APT_GET: &str = "apt-get";

pub struct AptPackageManager {
    name: String,
    shell: CommandShell,
    threshold: usize,
}

impl AptPackageManager {
    pub fn new(name: impl Into<String>, shell: CommandShell) -> Self {
        Self {
            name: name.into(),
            shell,
            threshold: BULK_QUERY_THRESHOLD,
        }
    }

    #[cfg(test)]
    /// Override the bulk-listing threshold.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    fn dpkg_query(&self, target: &str) -> Result<Vec<PackageRecord>> {
        let output = self.shell.read(
            "dpkg-query",
            &[
                format!("-f={}", DPKG_QUERY_FORMAT),
                "-W".to_string(),
                target.to_string(),
            ],
        )?;
        debug!("dpkg-query {} result={:?}", target, output.trim_end());
        Ok(parse_dpkg_listing(&output))
    }

    fn query_policy(&self, name: &str) -> Result<AptPolicy> {
        let output = self
            .shell
            .read("apt-cache", &["policy".to_string(), name.to_string()])?;
        let policy = parse_apt_policy(&output);
        if policy.is_empty() {
            debug!("apt-cache policy {}: no results\n{}", name, output);
        } else {
            debug!(
                "apt-cache policy {}: installed={:?} candidate={:?}",
                name, policy.installed, policy.candidate
            );
        }
        Ok(policy)
    }

    /// Complete a request from a dpkg-query record, falling back to
    /// apt-cache when dpkg-query knew nothing.
    fn resolve(
        &self,
        request: &PackageRequest,
        found: Option<PackageRecord>,
    ) -> Result<Option<PackageRecord>> {
        if let Some(mut record) = found {
            record.name = request.name.clone();
            record.apply_request(request);
            if !record.requires_latest() {
                record.candidate_version = self.query_policy(&request.name)?.candidate;
            }
            return Ok(Some(record));
        }

        let policy = self.query_policy(&request.name)?;
        let mut record = match (policy.installed, policy.candidate) {
            (Some(installed), candidate) => {
                warn!(
                    "dpkg-query parse failure for {} - check the dpkg-query pattern",
                    request.name
                );
                let mut record = PackageRecord::new(&request.name).installed(installed);
                record.candidate_version = candidate;
                record
            }
            (None, Some(candidate)) => PackageRecord::new(&request.name).candidate(candidate),
            // Unknown to every configured source; an index update may help
            (None, None) => return Ok(None),
        };

        record.apply_request(request);
        Ok(Some(record))
    }
}

impl PackageManager for AptPackageManager {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self, requests), fields(manager = %self.name, count = requests.len()))]
    fn get_package_info(&self, requests: &[PackageRequest], dry_run: bool) -> Result<PackageInfo> {
        let mut lookups = Vec::with_capacity(requests.len());

        if requests.len() > self.threshold && !dry_run {
            let mut installed: HashMap<String, PackageRecord> = self
                .dpkg_query("*")?
                .into_iter()
                .map(|record| (record.name.clone(), record))
                .collect();
            debug!("dpkg-query listed {} package(s)", installed.len());

            for request in requests {
                let found = installed.remove(&request.name);
                lookups.push(self.resolve(request, found)?);
            }
        } else {
            for request in requests {
                let found = self.dpkg_query(&request.name)?.into_iter().next();
                lookups.push(self.resolve(request, found)?);
            }
        }

        Ok(PackageInfo::from_lookups(requests, lookups))
    }

    #[tracing::instrument(skip(self, records), fields(manager = %self.name))]
    fn install_packages(
        &self,
        records: &[PackageRecord],
        update_first: bool,
        mode: ExecMode,
    ) -> Result<()> {
        if update_first {
            self.execute_as_root(&format!("{} update", APT_GET), mode)?;
            self.execute_as_root(&format!("{} -y upgrade", APT_GET), mode)?;
        }

        let names = records.iter().map(|r| r.name.as_str());
        for batch in batch_names(names, MAX_INSTALL_ARGS) {
            self.execute_as_root(&format!("{} -y install {}", APT_GET, batch), mode)?;
        }
        Ok(())
    }

    fn refresh_package_candidates(
        &self,
        records: &mut [PackageRecord],
        _mode: ExecMode,
    ) -> Result<()> {
        for record in records.iter_mut() {
            let policy = self.query_policy(&record.name)?;
            record.version = policy.installed;
            record.candidate_version = policy.candidate;
        }
        Ok(())
    }

    fn execute_as_root(&self, command: &str, mode: ExecMode) -> Result<bool> {
        self.shell.execute_as_root(command, mode)
    }
}

/// Group names into space-separated argument strings.
///
/// Each name costs its length plus one separator; a batch is closed before
/// the name that would take it past `limit`. A single name longer than the
/// limit gets a batch of its own.
pub fn batch_names<'a>(names: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut batches = Vec::new();
    let mut batch: Vec<&str> = Vec::new();
    let mut width = 0;

    for name in names {
        if !batch.is_empty() && width + name.len() + 1 > limit {
            batches.push(batch.join(" "));
            batch.clear();
            width = 0;
        }
        width += name.len() + 1;
        batch.push(name);
    }
    if !batch.is_empty() {
        batches.push(batch.join(" "));
    }
    batches
}
