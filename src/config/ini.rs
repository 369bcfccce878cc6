//! INI parsing with duplicate-key preservation.
//!
//! Syntax accepted:
//!
//! - `[section]` headers, optionally followed by a `;` or `#` comment; a
//!   header seen twice continues the same section
//! - `key = value` or `key: value` options, split at the first `=` or `:`
//! - whole-line comments starting with `#` or `;`
//! - inline comments starting at a `;` preceded by whitespace
//! - indented lines continue the previous option with one more value
//!
//! Keys are case-preserving. Every value assigned to a key is kept in
//! order, so callers can detect conflicting assignments.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use super::multimap::MultiMap;

/// One `[section]` with its options and the directory of the file that
/// first defined it.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub values: MultiMap,
    pub base_dir: PathBuf,
}

/// A parsed (and possibly merged) INI document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ini {
    sections: Vec<Section>,
}

impl Ini {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text. `origin` names the source in error messages and
    /// `base_dir` is recorded on every section defined here.
    pub fn parse(text: &str, origin: &Path, base_dir: &Path) -> Result<Self> {
        let mut ini = Ini::new();
        let mut current: Option<usize> = None;
        let mut last_key: Option<String> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous option
            if line.starts_with(char::is_whitespace) {
                if let (Some(i), Some(key)) = (current, &last_key) {
                    let value = strip_inline_comment(trimmed);
                    if !value.is_empty() {
                        ini.sections[i].values.insert(key.clone(), value);
                    }
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let Some((name, rest)) = header.split_once(']') else {
                    bail!("{}:{}: unterminated section header", origin.display(), number + 1);
                };
                let rest = rest.trim_start();
                if !(rest.is_empty() || rest.starts_with(';') || rest.starts_with('#')) {
                    bail!(
                        "{}:{}: unexpected text after section header: '{}'",
                        origin.display(),
                        number + 1,
                        rest
                    );
                }
                let name = name.trim();
                if name.is_empty() {
                    bail!("{}:{}: empty section header", origin.display(), number + 1);
                }
                current = Some(ini.section_index_or_insert(name, base_dir));
                last_key = None;
                continue;
            }

            let Some(i) = current else {
                bail!(
                    "{}:{}: option '{}' appears before any [section] header",
                    origin.display(),
                    number + 1,
                    trimmed
                );
            };

            let Some(split) = trimmed.find(['=', ':']) else {
                bail!("{}:{}: cannot parse line '{}'", origin.display(), number + 1, trimmed);
            };
            let key = trimmed[..split].trim_end();
            if key.is_empty() {
                bail!("{}:{}: option without a name", origin.display(), number + 1);
            }
            let value = strip_inline_comment(trimmed[split + 1..].trim());
            let value = if value == "\"\"" { "" } else { value };

            ini.sections[i].values.insert(key, value);
            last_key = Some(key.to_string());
        }

        Ok(ini)
    }

    fn section_index_or_insert(&mut self, name: &str, base_dir: &Path) -> usize {
        if let Some(i) = self.sections.iter().position(|s| s.name == name) {
            return i;
        }
        self.sections.push(Section {
            name: name.to_string(),
            values: MultiMap::new(),
            base_dir: base_dir.to_path_buf(),
        });
        self.sections.len() - 1
    }

    /// Merge another document into this one. Sections already present keep
    /// their base directory and accumulate the other document's values.
    pub fn merge(&mut self, other: Ini) {
        for section in other.sections {
            match self.sections.iter_mut().find(|s| s.name == section.name) {
                Some(existing) => existing.values.extend(section.values),
                None => self.sections.push(section),
            }
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Remove a section. Returns whether it existed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        before != self.sections.len()
    }

    #[cfg(test)]
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }
}

fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}
