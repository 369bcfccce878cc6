//! Parsers for `dpkg-query` and `apt-cache policy` output.

use regex::Regex;
use std::sync::LazyLock;

use crate::package::{PackageRecord, PackageState};

/// Format passed to `dpkg-query -f`.
pub const DPKG_QUERY_FORMAT: &str = "${db:Status-Abbrev} ${binary:Package} ${Version}\n";

// ii  x11-common 1:7.7+1ubuntu8.1
// hi  cmake 3.2.2-2~ubuntu14.04.1~ppa1
// ii  zlib1g-dev:amd64 1:1.2.8.dfsg-1ubuntu1
static DPKG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z ]{3})\s([+.\w-]+)(?::\w+)?\s(?:\d+:)?(\d(?:[.\d-]*\d)?)[~+.\w-]*\s*$")
        .expect("dpkg-query pattern is valid")
});

// git:
//   Installed: 1:1.9.1-1ubuntu0.3
//   Candidate: 1:1.9.1-1ubuntu0.3
static POLICY_INSTALLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*installed:\s*(?:\d+:)?(\d(?:[.\d-]*\d)?)")
        .expect("apt-cache installed pattern is valid")
});

static POLICY_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*candidate:\s*(?:\d+:)?(\d(?:[.\d-]*\d)?)")
        .expect("apt-cache candidate pattern is valid")
});

/// Parse one line of `dpkg-query` output.
///
/// The first letter of the status abbreviation decides the state: `i` is
/// installed, `h` is installed and held, anything else is not installed.
/// Epochs and distribution suffixes are stripped from the version.
pub fn parse_dpkg_line(line: &str) -> Option<PackageRecord> {
    let caps = DPKG_LINE.captures(line)?;
    let state = match caps[1].chars().next() {
        Some('i') => PackageState::INSTALLED,
        Some('h') => PackageState::INSTALLED | PackageState::HELD,
        _ => PackageState::NOT_INSTALLED,
    };
    Some(PackageRecord {
        name: caps[2].to_string(),
        state,
        version: Some(caps[3].to_string()),
        ..Default::default()
    })
}

/// Parse every line of a bulk `dpkg-query -W '*'` listing, skipping lines
/// that do not match.
pub fn parse_dpkg_listing(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_dpkg_line)
        .collect()
}

/// Installed and candidate versions from `apt-cache policy <name>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AptPolicy {
    pub installed: Option<String>,
    pub candidate: Option<String>,
}

impl AptPolicy {
    pub fn is_empty(&self) -> bool {
        self.installed.is_none() && self.candidate.is_none()
    }
}

/// Parse `apt-cache policy` output. `(none)` entries yield `None`.
pub fn parse_apt_policy(output: &str) -> AptPolicy {
    let mut policy = AptPolicy::default();
    for line in output.lines() {
        if policy.installed.is_none() {
            if let Some(caps) = POLICY_INSTALLED.captures(line) {
                policy.installed = Some(caps[1].to_string());
                continue;
            }
        }
        if policy.candidate.is_none() {
            if let Some(caps) = POLICY_CANDIDATE.captures(line) {
                policy.candidate = Some(caps[1].to_string());
            }
        }
    }
    policy
}
