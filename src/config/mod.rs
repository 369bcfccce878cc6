//! Configuration loading.
//!
//! One or more INI files are merged into a single document. The
//! `package-managers` section maps local manager keys to backend names,
//! the optional `package-selector` section maps manager keys to platform
//! selectors, and every manager key has a section of requested packages.
//! A package whose value names another section is provided by a custom
//! action described in that section.

mod ini;
mod multimap;

use anyhow::{Result, bail};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::package::{CustomAction, LATEST, PackageRequest};
use crate::runtime::{Runtime, resolve_relative_path};

pub use ini::{Ini, Section};
pub use multimap::MultiMap;

pub const PACKAGE_MANAGERS: &str = "package-managers";
pub const PACKAGE_SELECTOR: &str = "package-selector";

/// Packages requested for one manager, split into standard packages and
/// packages provided by custom actions, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagerRequests {
    pub packages: Vec<PackageRequest>,
    pub custom: Vec<PackageRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    ini: Ini,
}

impl Config {
    /// Read and merge the configuration files. Missing files are skipped
    /// with a warning; it is an error if none can be read.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            bail!("no configuration file so nothing to do");
        }

        let mut ini = Ini::new();
        let mut read = 0;
        for path in paths {
            if !runtime.exists(path) {
                warn!("configuration file {:?} not found, skipping", path);
                continue;
            }
            let absolute = runtime.canonicalize(path)?;
            let base_dir = absolute
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            let text = runtime.read_to_string(path)?;
            debug!("Parsing configuration {:?}", absolute);
            ini.merge(Ini::parse(&text, path, &base_dir)?);
            read += 1;
        }

        if read == 0 {
            bail!("no configuration file could be read");
        }
        Ok(Self { ini })
    }

    /// Parse a single configuration document.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self> {
        Ok(Self {
            ini: Ini::parse(text, Path::new("<config>"), base_dir)?,
        })
    }

    /// Manager key → backend name pairs in configuration order.
    pub fn package_managers(&self) -> Result<Vec<(String, String)>> {
        let Some(section) = self.ini.section(PACKAGE_MANAGERS) else {
            bail!("no package-managers in configuration file(s)");
        };
        Ok(section
            .values
            .iter()
            .filter_map(|(key, values)| {
                let backend = values.last()?;
                if values.len() > 1 {
                    warn!(
                        "package-manager {} mapped more than once, using {}",
                        key, backend
                    );
                }
                Some((key.to_string(), backend.clone()))
            })
            .collect())
    }

    /// Manager key → selector pairs, or `None` when there is no
    /// `package-selector` section.
    pub fn selectors(&self) -> Option<Vec<(String, String)>> {
        let section = self.ini.section(PACKAGE_SELECTOR)?;
        Some(
            section
                .values
                .iter()
                .filter_map(|(key, values)| Some((key.to_string(), values.last()?.clone())))
                .collect(),
        )
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.ini.has_section(name)
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        self.ini.remove_section(name)
    }

    /// Requests from the section named after a manager key, or `None` when
    /// the section does not exist.
    ///
    /// Fails when a package is assigned more than one version or refers to
    /// a custom-action section without a `run` entry.
    pub fn manager_requests(&self, key: &str) -> Result<Option<ManagerRequests>> {
        let Some(section) = self.ini.section(key) else {
            return Ok(None);
        };

        let mut requests = ManagerRequests::default();
        for (name, values) in section.values.iter() {
            if values.len() > 1 {
                bail!("requested multiple versions for package {}: {:?}", name, values);
            }
            let value = values.first().map(String::as_str).unwrap_or_default();

            match self.custom_action(value)? {
                Some(action) => {
                    requests
                        .custom
                        .push(PackageRequest::new(name).with_custom_action(action));
                }
                None if self.ini.has_section(value) => {
                    bail!("incomplete custom action {} = {}", name, value);
                }
                None => requests
                    .packages
                    .push(PackageRequest::new(name).with_version(value)),
            }
        }
        Ok(Some(requests))
    }

    /// Build the custom action described by section `name`. `None` when no
    /// such section exists or it lacks a `run` entry.
    fn custom_action(&self, name: &str) -> Result<Option<CustomAction>> {
        if name.is_empty() {
            return Ok(None);
        }
        let Some(section) = self.ini.section(name) else {
            return Ok(None);
        };
        let Some(run) = section.values.get("run").filter(|r| !r.is_empty()) else {
            return Ok(None);
        };
        let version = match section.values.get("version") {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => LATEST.to_string(),
        };
        Ok(Some(CustomAction {
            version,
            run: resolve_relative_path(&section.base_dir, Path::new(run)),
        }))
    }
}
