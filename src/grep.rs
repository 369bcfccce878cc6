//! Single-shot regex search used by the `regrep` binary.

use anyhow::{Context, Result};
use regex::RegexBuilder;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub ignore_case: bool,
    /// `^` and `$` match at line boundaries. Without it `$` still matches
    /// just before a final newline.
    pub multiline: bool,
}

/// The first match of a search and its capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub matched: String,
    /// One entry per capture group; `None` for groups that did not take part.
    pub groups: Vec<Option<String>>,
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Match: {:?}, groups=[", self.matched)?;
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match group {
                Some(text) => write!(f, "{:?}", text)?,
                None => f.write_str("None")?,
            }
        }
        f.write_str("]>")
    }
}

/// Search `text` for the first match of `pattern`.
pub fn search(pattern: &str, text: &str, options: SearchOptions) -> Result<Option<MatchReport>> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.ignore_case)
        .multi_line(options.multiline)
        .build()
        .with_context(|| format!("invalid regex {:?}", pattern))?;

    let mut caps = regex.captures(text);
    if caps.is_none()
        && !options.multiline
        && let Some(body) = text.strip_suffix('\n')
    {
        caps = regex.captures(body);
    }

    Ok(caps.map(|caps| MatchReport {
        matched: caps[0].to_string(),
        groups: caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OS_RELEASE: &str = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nVERSION_CODENAME=jammy\n";

    #[test]
    fn test_search_with_groups() {
        let report = search(r#"VERSION_ID="(\d+)\.(\d+)""#, OS_RELEASE, SearchOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.groups, vec![Some("22".to_string()), Some("04".to_string())]);
        assert_eq!(
            report.to_string(),
            r#"<Match: "VERSION_ID=\"22.04\"", groups=["22", "04"]>"#
        );
    }

    #[test]
    fn test_search_no_match() {
        assert_eq!(search("fedora", OS_RELEASE, SearchOptions::default()).unwrap(), None);
    }

    #[test]
    fn test_search_ignore_case() {
        let options = SearchOptions {
            ignore_case: true,
            ..Default::default()
        };
        let report = search("ubuntu", OS_RELEASE, options).unwrap().unwrap();
        assert_eq!(report.to_string(), r#"<Match: "Ubuntu", groups=[]>"#);
    }

    #[test]
    fn test_search_multiline_anchors() {
        assert_eq!(search("^VERSION_CODENAME=(\\w+)$", OS_RELEASE, SearchOptions::default()).unwrap(), None);

        let options = SearchOptions {
            multiline: true,
            ..Default::default()
        };
        let report = search("^VERSION_CODENAME=(\\w+)$", OS_RELEASE, options)
            .unwrap()
            .unwrap();
        assert_eq!(report.groups, vec![Some("jammy".to_string())]);
    }

    #[test]
    fn test_end_anchor_before_final_newline() {
        let report = search("ubuntu$", "ID=ubuntu\n", SearchOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.matched, "ubuntu");

        let report = search("=(\\w+)$", OS_RELEASE, SearchOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.groups, vec![Some("jammy".to_string())]);

        // Only the last line ends before the final newline.
        assert_eq!(search("ubuntu$", "ID=ubuntu\nNAME=x\n", SearchOptions::default()).unwrap(), None);
        assert_eq!(search("ubuntu$", "ID=ubuntu\n\n", SearchOptions::default()).unwrap(), None);
    }

    #[test]
    fn test_flags_combine() {
        let options = SearchOptions {
            ignore_case: true,
            multiline: true,
        };
        let report = search("^name=(.*)$", OS_RELEASE, options).unwrap().unwrap();
        assert_eq!(report.groups, vec![Some("\"Ubuntu\"".to_string())]);
    }

    #[test]
    fn test_unmatched_group_is_none() {
        let report = search("(jammy)|(focal)", OS_RELEASE, SearchOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.to_string(), r#"<Match: "jammy", groups=["jammy", None]>"#);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(search("(unclosed", OS_RELEASE, SearchOptions::default()).is_err());
    }
}
