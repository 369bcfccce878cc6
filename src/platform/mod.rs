//! Platform detection and package-selector matching.
//!
//! The host is summarised as a single descriptor string (kernel name,
//! release, machine and distribution) and each manager in the
//! `package-selector` section carries a `/regex/flags` selector that is
//! searched for in that descriptor.

use anyhow::{Result, bail};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Kernel identification as reported by `uname`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnameInfo {
    pub sysname: String,
    pub release: String,
    pub machine: String,
}

impl UnameInfo {
    /// Fallback when `uname` is unavailable: compile-time target information.
    pub fn from_build_target() -> Self {
        let sysname = match std::env::consts::OS {
            "linux" => "Linux".to_string(),
            "macos" => "Darwin".to_string(),
            other => other.to_string(),
        };
        Self {
            sysname,
            release: String::new(),
            machine: std::env::consts::ARCH.to_string(),
        }
    }
}

/// The subset of `/etc/os-release` used in the platform descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub version_id: Option<String>,
    pub codename: Option<String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines, stripping optional quotes.
    pub fn parse(text: &str) -> Self {
        let fields: HashMap<&str, String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                (key.trim(), value.to_string())
            })
            .collect();

        let get = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            id: get("ID"),
            version_id: get("VERSION_ID"),
            codename: get("VERSION_CODENAME").or_else(|| get("UBUNTU_CODENAME")),
        }
    }
}

/// Build the platform descriptor, e.g.
/// `Linux-5.15.0-91-generic-x86_64-with-ubuntu-22.04-jammy`.
pub fn platform_descriptor(uname: &UnameInfo, os_release: Option<&OsRelease>) -> String {
    let mut parts: Vec<&str> = [&uname.sysname, &uname.release, &uname.machine]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(release) = os_release {
        let distro: Vec<&str> = [&release.id, &release.version_id, &release.codename]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .collect();
        if !distro.is_empty() {
            parts.push("with");
            parts.extend(distro);
        }
    }

    parts.join("-")
}

/// A compiled `/regex/flags` selector from the `package-selector` section.
#[derive(Debug, Clone)]
pub struct Selector {
    regex: Regex,
}

impl Selector {
    /// Parse a selector of the form `/pattern/flags`.
    ///
    /// Supported flags: `i` (case-insensitive). The pattern itself cannot
    /// contain a `/`.
    pub fn parse(selector: &str) -> Result<Self> {
        let parts: Vec<&str> = selector.trim().split('/').collect();
        if parts.len() != 3 || !parts[0].is_empty() {
            bail!("bad regex {} in package-selector section", selector);
        }

        let (pattern, flags) = (parts[1], parts[2]);
        if let Some(flag) = flags.chars().find(|c| *c != 'i') {
            bail!(
                "bad regex {} in package-selector section (unknown flag '{}')",
                selector,
                flag
            );
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .build()
            .map_err(|e| {
                anyhow::anyhow!("bad regex {} in package-selector section: {}", selector, e)
            })?;
        Ok(Self { regex })
    }

    /// Whether the selector matches anywhere in the platform descriptor.
    pub fn matches(&self, platform: &str) -> bool {
        self.regex.is_match(platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBUNTU_OS_RELEASE: &str = r#"NAME="Ubuntu"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
ID=ubuntu
ID_LIKE=debian
VERSION_ID="22.04"
VERSION_CODENAME=jammy
UBUNTU_CODENAME=jammy
"#;

    fn linux_uname() -> UnameInfo {
        UnameInfo {
            sysname: "Linux".into(),
            release: "5.15.0-91-generic".into(),
            machine: "x86_64".into(),
        }
    }

    #[test]
    fn test_parse_os_release() {
        let release = OsRelease::parse(UBUNTU_OS_RELEASE);
        assert_eq!(release.id.as_deref(), Some("ubuntu"));
        assert_eq!(release.version_id.as_deref(), Some("22.04"));
        assert_eq!(release.codename.as_deref(), Some("jammy"));
    }

    #[test]
    fn test_parse_os_release_without_codename() {
        let release = OsRelease::parse("ID=arch\nBUILD_ID=rolling\n");
        assert_eq!(release.id.as_deref(), Some("arch"));
        assert_eq!(release.version_id, None);
        assert_eq!(release.codename, None);
    }

    #[test]
    fn test_platform_descriptor_with_distro() {
        let release = OsRelease::parse(UBUNTU_OS_RELEASE);
        assert_eq!(
            platform_descriptor(&linux_uname(), Some(&release)),
            "Linux-5.15.0-91-generic-x86_64-with-ubuntu-22.04-jammy"
        );
    }

    #[test]
    fn test_platform_descriptor_without_distro() {
        assert_eq!(
            platform_descriptor(&linux_uname(), None),
            "Linux-5.15.0-91-generic-x86_64"
        );
        assert_eq!(
            platform_descriptor(&linux_uname(), Some(&OsRelease::default())),
            "Linux-5.15.0-91-generic-x86_64"
        );
    }

    #[test]
    fn test_selector_matches() {
        let selector = Selector::parse("/ubuntu/").unwrap();
        assert!(selector.matches("Linux-5.15.0-x86_64-with-ubuntu-22.04-jammy"));
        assert!(!selector.matches("Linux-5.15.0-x86_64-with-Ubuntu-22.04-jammy"));
    }

    #[test]
    fn test_selector_case_insensitive() {
        let selector = Selector::parse("/ubuntu/i").unwrap();
        assert!(selector.matches("Linux-4.4.0-x86_64-with-Ubuntu-16.04-xenial"));
    }

    #[test]
    fn test_selector_anchored_pattern() {
        let selector = Selector::parse("/^Linux-.*x86_64/").unwrap();
        assert!(selector.matches("Linux-5.15.0-x86_64"));
        assert!(!selector.matches("Darwin-23.1.0-arm64"));
    }

    #[test]
    fn test_selector_rejects_bad_syntax() {
        assert!(Selector::parse("ubuntu").is_err());
        assert!(Selector::parse("/ubuntu").is_err());
        assert!(Selector::parse("x/ubuntu/i").is_err());
        assert!(Selector::parse("/a/b/c/").is_err());
        assert!(Selector::parse("/ubuntu/x").is_err());
        assert!(Selector::parse("/(unclosed/").is_err());
    }

    #[test]
    fn test_selector_error_message() {
        let err = Selector::parse("ubuntu").unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad regex ubuntu in package-selector section"
        );
    }
}
