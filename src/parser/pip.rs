//! Parsers for `pip list` and `pip search` output.

use regex::Regex;
use std::sync::LazyLock;

use crate::package::PackageRecord;

// scikit-image (0.12.3)
static LIST_LEGACY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pkgname>[\w.~-]+)\s*\((?P<installed>\d+[.\d-]*)\)")
        .expect("pip list pattern is valid")
});

// scikit-image       0.12.3
static LIST_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pkgname>[\w.~-]+)\s+(?P<installed>\d+[.\d-]*)")
        .expect("pip list column pattern is valid")
});

// numpy (1.26.4)  - Fundamental package for array computing in Python
static SEARCH_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pkgname>[\w.~-]+)\s*\((?P<candidate>\d+[.\d-]*)\)")
        .expect("pip search pattern is valid")
});

//   INSTALLED: 1.26.2
static SEARCH_INSTALLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*INSTALLED:\s*(?P<installed>\d+[.\d-]*)")
        .expect("pip search installed pattern is valid")
});

fn clean_version(version: &str) -> String {
    version.trim_end_matches(['.', '-']).to_string()
}

/// Parse one line of `pip list` output in either the legacy
/// `name (version)` or the columnar `name   version` format.
pub fn parse_pip_list_line(line: &str) -> Option<PackageRecord> {
    let caps = LIST_LEGACY
        .captures(line)
        .or_else(|| LIST_COLUMNS.captures(line))?;
    Some(PackageRecord::new(&caps["pkgname"]).installed(clean_version(&caps["installed"])))
}

/// Parse a full `pip list` listing. Header and separator lines are skipped.
pub fn parse_pip_list(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_pip_list_line)
        .collect()
}

/// The term passed to `pip search` for a package name: everything before
/// the first digit, comma, dot, tilde or dash.
pub fn search_term(name: &str) -> &str {
    name.split(|c: char| c.is_ascii_digit() || matches!(c, ',' | '.' | '~' | '-'))
        .next()
        .unwrap_or(name)
}

/// Find the exact match for `name` in `pip search` output.
///
/// The first result line that starts with `name` and whose package name is
/// exactly `name` is accepted; its version becomes the candidate. The line
/// following it may report an installed version.
pub fn parse_pip_search(name: &str, output: &str) -> Option<PackageRecord> {
    let mut lines = output.lines();
    while let Some(line) = lines.next() {
        if !line.starts_with(name) {
            continue;
        }
        let Some(caps) = SEARCH_RESULT.captures(line) else {
            continue;
        };
        if &caps["pkgname"] != name {
            continue;
        }

        let mut record =
            PackageRecord::new(name).candidate(clean_version(&caps["candidate"]));
        if let Some(next) = lines.next() {
            if let Some(caps) = SEARCH_INSTALLED.captures(next) {
                record = record.installed(clean_version(&caps["installed"]));
            }
        }
        return Some(record);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_OUTPUT: &str = "numpy-quaternion (2022.4.3)  - Add built-in support for quaternions to numpy
numpy (1.26.4)                  - Fundamental package for array computing in Python
  INSTALLED: 1.26.2
  LATEST:    1.26.4
numpydoc (1.6.0)                - Sphinx extension to support docstrings in Numpy format
";

    #[test]
    fn test_parse_pip_list_legacy() {
        let record = parse_pip_list_line("scikit-image (0.12.3)").unwrap();
        assert_eq!(record.name, "scikit-image");
        assert_eq!(record.version.as_deref(), Some("0.12.3"));
        assert!(record.is_installed());
    }

    #[test]
    fn test_parse_pip_list_columns() {
        let listing = "Package    Version\n---------- -------\npip        23.3.1\nscipy      1.11.4\n";
        let records = parse_pip_list(listing);
        let names: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.version()))
            .collect();
        assert_eq!(names, vec![("pip", "23.3.1"), ("scipy", "1.11.4")]);
    }

    #[test]
    fn test_parse_pip_list_ignores_noise() {
        assert!(parse_pip_list_line("Package    Version").is_none());
        assert!(parse_pip_list_line("---------- -------").is_none());
        assert!(parse_pip_list_line("").is_none());
    }

    #[test]
    fn test_search_term_strips_version_like_suffix() {
        assert_eq!(search_term("numpy"), "numpy");
        assert_eq!(search_term("py3-foo"), "py");
        assert_eq!(search_term("scikit-learn"), "scikit");
        assert_eq!(search_term("backports.ssl"), "backports");
    }

    #[test]
    fn test_parse_pip_search_exact_match_with_installed() {
        let record = parse_pip_search("numpy", SEARCH_OUTPUT).unwrap();
        assert_eq!(record.name, "numpy");
        assert_eq!(record.candidate_version_raw(), "1.26.4");
        assert_eq!(record.version.as_deref(), Some("1.26.2"));
        assert!(record.is_installed());
    }

    #[test]
    fn test_parse_pip_search_exact_match_not_installed() {
        let record = parse_pip_search("numpydoc", SEARCH_OUTPUT).unwrap();
        assert_eq!(record.candidate_version_raw(), "1.6.0");
        assert!(!record.is_installed());
    }

    #[test]
    fn test_parse_pip_search_no_exact_match() {
        assert!(parse_pip_search("numpy-stl", SEARCH_OUTPUT).is_none());
        assert!(parse_pip_search("numpy", "").is_none());
    }
}
