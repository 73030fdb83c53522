//! Pattern set loading.
//!
//! A pattern set is the named, ordered list of labeled patterns a run
//! matches against. Order matters: it encodes resolution precedence. Two
//! sources are supported, a force-field parameter file in TOML and a plain
//! `SMARTS NAME` line format.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::smarts::{LabeledPattern, Pattern, SmartsError};

#[derive(Debug, Error)]
pub enum PatternSetError {
    #[error("Failed to read pattern file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse pattern file '{path}': {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid pattern `{id}`: {source}")]
    Pattern { id: String, source: SmartsError },

    #[error("Malformed line {line} in '{path}' (expected `SMARTS NAME`)")]
    Malformed { path: PathBuf, line: usize },
}

#[derive(Debug, Deserialize)]
struct ParamFile {
    name: String,
    #[serde(default)]
    torsions: Vec<ParamEntry>,
}

#[derive(Debug, Deserialize)]
struct ParamEntry {
    id: String,
    smirks: String,
}

/// An ordered, named collection of patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    name: String,
    patterns: Vec<LabeledPattern>,
}

impl PatternSet {
    /// Loads a force-field parameter file:
    ///
    /// ```toml
    /// name = "openff-2.1"
    ///
    /// [[torsions]]
    /// id = "t1"
    /// smirks = "[*:1]~[#6X4:2]-[#6X4:3]~[*:4]"
    /// ```
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, PatternSetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PatternSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ParamFile = toml::from_str(&text).map_err(|source| PatternSetError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let patterns = file
            .torsions
            .into_iter()
            .map(|entry| compile(entry.id, &entry.smirks))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: file.name,
            patterns,
        })
    }

    /// Loads a plain pattern list, one `SMARTS NAME` pair per line. Blank
    /// lines and `#` comments are skipped; the set is named after the file
    /// stem.
    pub fn from_smarts_file(path: impl AsRef<Path>) -> Result<Self, PatternSetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PatternSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut patterns = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((smarts, id)) = line.split_once(char::is_whitespace) else {
                return Err(PatternSetError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                });
            };
            patterns.push(compile(id.trim().to_string(), smarts)?);
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "patterns".to_string());
        Ok(Self { name, patterns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[LabeledPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn display_text(&self, id: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.pattern.text())
    }
}

fn compile(id: String, smarts: &str) -> Result<LabeledPattern, PatternSetError> {
    let pattern =
        Pattern::parse(smarts).map_err(|source| PatternSetError::Pattern {
            id: id.clone(),
            source,
        })?;
    Ok(LabeledPattern::new(id, pattern))
}

/// Reads a want list: one pattern identifier per line, blank lines and `#`
/// comments skipped.
pub fn load_want(path: impl AsRef<Path>) -> Result<HashSet<String>, PatternSetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PatternSetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    #[test]
    fn loads_parameter_toml_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "ff.toml",
            r#"
name = "openff-2.1"

[[torsions]]
id = "t1"
smirks = "[*:1]~[#6X4:2]-[#6X4:3]~[*:4]"

[[torsions]]
id = "t2"
smirks = "[#6:1]-[#6X4:2]-[#6X4:3]-[#6:4]"
"#,
        );
        let set = PatternSet::from_toml(&path).unwrap();
        assert_eq!(set.name(), "openff-2.1");
        let ids: Vec<&str> = set.patterns().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(set.display_text("t1"), Some("[*:1]~[#6X4:2]-[#6X4:3]~[*:4]"));
    }

    #[test]
    fn bad_smirks_names_the_offending_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "ff.toml",
            "name = \"x\"\n[[torsions]]\nid = \"t9\"\nsmirks = \"[r5]\"\n",
        );
        match PatternSet::from_toml(&path) {
            Err(PatternSetError::Pattern { id, .. }) => assert_eq!(id, "t9"),
            other => panic!("expected pattern error, got {other:?}"),
        }
    }

    #[test]
    fn loads_smarts_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "probes.smarts",
            "# functional groups\n[#6:1][#8:2] ether\n\n[#6:1]=[#8:2] carbonyl\n",
        );
        let set = PatternSet::from_smarts_file(&path).unwrap();
        assert_eq!(set.name(), "probes");
        assert_eq!(set.len(), 2);
        assert_eq!(set.patterns()[1].id, "carbonyl");
    }

    #[test]
    fn smarts_line_without_name_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.smarts", "[#6:1][#8:2]\n");
        assert!(matches!(
            PatternSet::from_smarts_file(&path),
            Err(PatternSetError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn want_list_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "want.txt", "t1\n\n# a comment\nt4\n");
        let want = load_want(&path).unwrap();
        assert_eq!(want.len(), 2);
        assert!(want.contains("t1") && want.contains("t4"));
    }
}
