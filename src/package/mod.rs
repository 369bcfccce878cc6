//! Package records and requests
//!
//! A [`PackageRequest`] is what the configuration asks for; a
//! [`PackageRecord`] is what a package manager reported back for it.

mod version;

use std::fmt;
use std::path::PathBuf;

pub use version::{LATEST, NONE, compare_versions, version_less};

/// Installed/held state bitset as reported by the package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageState(u8);

impl PackageState {
    pub const NOT_INSTALLED: PackageState = PackageState(0);
    pub const INSTALLED: PackageState = PackageState(0x1);
    pub const HELD: PackageState = PackageState(0x2);

    pub fn contains(self, other: PackageState) -> bool {
        self.0 & other.0 == other.0
    }

    #[cfg(test)]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for PackageState {
    type Output = PackageState;

    fn bitor(self, rhs: Self) -> Self::Output {
        PackageState(self.0 | rhs.0)
    }
}

/// An executable run instead of a normal package install.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAction {
    /// Version the action is expected to provide ("latest" when unset).
    pub version: String,
    /// Absolute path of the executable.
    pub run: PathBuf,
}

/// A package asked for by the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRequest {
    pub name: String,
    pub required_version: Option<String>,
    pub custom_action: Option<CustomAction>,
}

impl PackageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_version: None,
            custom_action: None,
        }
    }

    /// Request a specific version. An empty string or "latest" means any version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.required_version = if version.is_empty() || version == LATEST {
            None
        } else {
            Some(version)
        };
        self
    }

    /// Request a package provided by a custom action. The action's version
    /// becomes the required version.
    pub fn with_custom_action(self, action: CustomAction) -> Self {
        let mut request = self.with_version(action.version.clone());
        request.custom_action = Some(action);
        request
    }

    pub fn required_version(&self) -> &str {
        self.required_version.as_deref().unwrap_or(LATEST)
    }
}

impl fmt::Display for PackageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.required_version {
            Some(v) => write!(f, "{}={}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// State of one package as reported by a package manager.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageRecord {
    pub name: String,
    pub state: PackageState,
    pub version: Option<String>,
    pub required_version: Option<String>,
    pub candidate_version: Option<String>,
    pub custom_action: Option<CustomAction>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn installed(mut self, version: impl Into<String>) -> Self {
        self.state = self.state | PackageState::INSTALLED;
        self.version = Some(version.into());
        self
    }

    pub fn held(mut self) -> Self {
        self.state = self.state | PackageState::INSTALLED | PackageState::HELD;
        self
    }

    pub fn candidate(mut self, version: impl Into<String>) -> Self {
        self.candidate_version = Some(version.into());
        self
    }

    pub fn requires(mut self, version: impl Into<String>) -> Self {
        self.required_version = Some(version.into());
        self
    }

    /// Copy the required version and custom action from the request this
    /// record answers.
    pub fn apply_request(&mut self, request: &PackageRequest) {
        self.required_version = request.required_version.clone();
        self.custom_action = request.custom_action.clone();
    }

    pub fn is_installed(&self) -> bool {
        self.state.contains(PackageState::INSTALLED)
    }

    pub fn is_on_hold(&self) -> bool {
        self.state
            .contains(PackageState::INSTALLED | PackageState::HELD)
    }

    /// Installed version, "latest" when unknown.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(LATEST)
    }

    /// Installed version, "none" when unknown.
    pub fn version_raw(&self) -> &str {
        self.version.as_deref().unwrap_or(NONE)
    }

    pub fn required_version(&self) -> &str {
        self.required_version.as_deref().unwrap_or(LATEST)
    }

    pub fn required_version_raw(&self) -> &str {
        self.required_version.as_deref().unwrap_or(NONE)
    }

    pub fn requires_latest(&self) -> bool {
        self.required_version() == LATEST
    }

    /// Candidate version. Always "latest" when no specific version is
    /// required, and "latest" when the candidate is unknown.
    pub fn candidate_version(&self) -> &str {
        if self.requires_latest() {
            return LATEST;
        }
        self.candidate_version.as_deref().unwrap_or(LATEST)
    }

    pub fn candidate_version_raw(&self) -> &str {
        self.candidate_version.as_deref().unwrap_or(NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_bits() {
        let state = PackageState::INSTALLED | PackageState::HELD;
        assert!(state.contains(PackageState::INSTALLED));
        assert!(state.contains(PackageState::HELD));
        assert_eq!(state.bits(), 0x3);
        assert!(!PackageState::NOT_INSTALLED.contains(PackageState::INSTALLED));
    }

    #[test]
    fn test_held_requires_installed() {
        let record = PackageRecord {
            state: PackageState::HELD,
            ..PackageRecord::new("git")
        };
        assert!(!record.is_installed());
        assert!(!record.is_on_hold());

        let record = PackageRecord::new("git").installed("2.34.1").held();
        assert!(record.is_installed());
        assert!(record.is_on_hold());
    }

    #[test]
    fn test_version_sentinels() {
        let record = PackageRecord::new("git");
        assert_eq!(record.version(), "latest");
        assert_eq!(record.version_raw(), "none");
        assert_eq!(record.required_version(), "latest");
        assert_eq!(record.required_version_raw(), "none");
        assert_eq!(record.candidate_version(), "latest");
        assert_eq!(record.candidate_version_raw(), "none");
    }

    #[test]
    fn test_candidate_is_latest_unless_pinned() {
        let record = PackageRecord::new("cmake").candidate("3.22.1");
        assert_eq!(record.candidate_version(), "latest");
        assert_eq!(record.candidate_version_raw(), "3.22.1");

        let record = record.requires("3.20");
        assert_eq!(record.candidate_version(), "3.22.1");
    }

    #[test]
    fn test_request_with_version() {
        assert_eq!(PackageRequest::new("git").with_version("").required_version, None);
        assert_eq!(
            PackageRequest::new("git").with_version("latest").required_version,
            None
        );
        let request = PackageRequest::new("git").with_version("2.30");
        assert_eq!(request.required_version(), "2.30");
        assert_eq!(request.to_string(), "git=2.30");
    }

    #[test]
    fn test_request_with_custom_action() {
        let action = CustomAction {
            version: "11.8".into(),
            run: PathBuf::from("/opt/scripts/install-cuda.sh"),
        };
        let request = PackageRequest::new("cuda").with_custom_action(action.clone());
        assert_eq!(request.required_version(), "11.8");
        assert_eq!(request.custom_action, Some(action));
    }

    #[test]
    fn test_apply_request() {
        let request = PackageRequest::new("cmake").with_version("3.2");
        let mut record = PackageRecord::new("cmake").installed("3.2.2");
        record.apply_request(&request);
        assert_eq!(record.required_version(), "3.2");
        assert!(record.custom_action.is_none());
    }
}
