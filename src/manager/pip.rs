//! pip backend.

use anyhow::Result;
use log::debug;
use std::collections::HashMap;

use super::{CommandShell, ExecMode, PackageInfo, PackageManager};
use crate::package::{PackageRecord, PackageRequest};
use crate::parser::{parse_pip_list, parse_pip_search, search_term};

const PIP: &str = "pip";

pub struct PipPackageManager {
    name: String,
    shell: CommandShell,
}

impl PipPackageManager {
    pub fn new(name: impl Into<String>, shell: CommandShell) -> Self {
        Self {
            name: name.into(),
            shell,
        }
    }

    fn list_installed(&self) -> Result<HashMap<String, PackageRecord>> {
        let output = self.shell.read(PIP, &["list".to_string()])?;
        Ok(parse_pip_list(&output)
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect())
    }

    /// `pip search` only does substring matching on a prefix of the name,
    /// so the results are filtered for an exact match.
    fn search(&self, name: &str) -> Result<Option<PackageRecord>> {
        let term = search_term(name);
        if term.is_empty() {
            debug!("no usable search term for {}", name);
            return Ok(None);
        }
        let output = self
            .shell
            .read(PIP, &["search".to_string(), term.to_string()])?;
        debug!("pip search {}:\n{}", term, output);
        Ok(parse_pip_search(name, &output))
    }
}

impl PackageManager for PipPackageManager {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self, requests), fields(manager = %self.name, count = requests.len()))]
    fn get_package_info(&self, requests: &[PackageRequest], _dry_run: bool) -> Result<PackageInfo> {
        let mut installed = self.list_installed()?;

        let mut lookups = Vec::with_capacity(requests.len());
        for request in requests {
            let found = match installed.remove(&request.name) {
                Some(record) => Some(record),
                None => self.search(&request.name)?,
            };
            lookups.push(found.map(|mut record| {
                record.apply_request(request);
                record
            }));
        }

        Ok(PackageInfo::from_lookups(requests, lookups))
    }

    #[tracing::instrument(skip(self, records), fields(manager = %self.name))]
    fn install_packages(
        &self,
        records: &[PackageRecord],
        _update_first: bool,
        mode: ExecMode,
    ) -> Result<()> {
        for record in records {
            let command = if record.requires_latest() {
                format!("{} install {}", PIP, record.name)
            } else {
                format!("{} install {}=={}", PIP, record.name, record.required_version())
            };
            self.execute_as_root(&command, mode)?;
        }
        Ok(())
    }

    fn refresh_package_candidates(
        &self,
        _records: &mut [PackageRecord],
        _mode: ExecMode,
    ) -> Result<()> {
        Ok(())
    }

    fn execute_as_root(&self, command: &str, mode: ExecMode) -> Result<bool> {
        self.shell.execute_as_root(command, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::sync::Arc;

    const LISTING: &str = "Package    Version\n---------- -------\nnumpy      1.26.2\nscipy      1.11.4\n";

    const SEARCH: &str = "requests-oauthlib (1.3.1)  - OAuthlib authentication support for Requests.
requests (2.31.0)           - Python HTTP for Humans.
  INSTALLED: 2.28.1
requests-mock (1.11.0)      - Mock out responses from the requests package
";

    fn pip(runtime: MockRuntime) -> PipPackageManager {
        PipPackageManager::new("pip", CommandShell::new(Arc::new(runtime), true))
    }

    fn expect_list(runtime: &mut MockRuntime) {
        runtime
            .expect_read_command()
            .withf(|program, args| program == "pip" && args == ["list".to_string()])
            .times(1)
            .returning(|_, _| Ok(LISTING.to_string()));
    }

    #[test]
    fn test_get_package_info_from_list() {
        let mut runtime = MockRuntime::new();
        expect_list(&mut runtime);
        let pip = pip(runtime);

        let requests = vec![
            PackageRequest::new("scipy").with_version("1.10"),
            PackageRequest::new("numpy"),
        ];
        let info = pip.get_package_info(&requests, false).unwrap();
        let names: Vec<&str> = info.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["scipy", "numpy"]);
        assert_eq!(info.records[0].required_version(), "1.10");
        assert_eq!(info.records[0].version(), "1.11.4");
        assert!(info.missing.is_empty());
    }

    #[test]
    fn test_get_package_info_falls_back_to_search() {
        let mut runtime = MockRuntime::new();
        expect_list(&mut runtime);
        runtime
            .expect_read_command()
            .withf(|program, args| {
                program == "pip" && args == ["search".to_string(), "requests".to_string()]
            })
            .returning(|_, _| Ok(SEARCH.to_string()));
        runtime
            .expect_read_command()
            .withf(|program, args| {
                program == "pip" && args == ["search".to_string(), "flask".to_string()]
            })
            .returning(|_, _| Ok(String::new()));
        let pip = pip(runtime);

        let requests = vec![
            PackageRequest::new("flask"),
            PackageRequest::new("requests").with_version("2.30"),
        ];
        let info = pip.get_package_info(&requests, false).unwrap();

        assert_eq!(info.records.len(), 1);
        let record = &info.records[0];
        assert_eq!(record.name, "requests");
        assert!(record.is_installed());
        assert_eq!(record.version(), "2.28.1");
        assert_eq!(record.candidate_version(), "2.31.0");
        assert_eq!(info.missing, vec![PackageRequest::new("flask")]);
    }

    #[test]
    fn test_unsearchable_name_is_missing() {
        let mut runtime = MockRuntime::new();
        expect_list(&mut runtime);
        let pip = pip(runtime);

        let info = pip
            .get_package_info(&[PackageRequest::new("3to2")], false)
            .unwrap();
        assert!(info.records.is_empty());
        assert_eq!(info.missing.len(), 1);
    }

    #[test]
    fn test_install_packages_formats_pins() {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();
        for command in ["pip install numpy", "pip install scipy==1.11.4"] {
            runtime
                .expect_run_shell()
                .with(eq(command))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(true));
        }
        let pip = pip(runtime);

        let records = vec![
            PackageRecord::new("numpy"),
            PackageRecord::new("scipy").requires("1.11.4"),
        ];
        pip.install_packages(&records, true, ExecMode::default())
            .unwrap();
    }

    #[test]
    fn test_refresh_is_a_no_op() {
        let pip = pip(MockRuntime::new());
        let mut records = vec![PackageRecord::new("numpy").requires("2.0")];
        pip.refresh_package_candidates(&mut records, ExecMode::default())
            .unwrap();
        assert_eq!(records[0].candidate_version_raw(), "none");
    }
}
