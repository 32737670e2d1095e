//! Target-process list and the record of the latest termination pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GhostError;

/// Ordered list of process names to terminate on activation.
///
/// Loaded once at startup; replaced only by an explicit reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProcessSet {
    names: Vec<String>,
}

impl TargetProcessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses newline-delimited content.
    ///
    /// Lines are trimmed; blank lines and lines starting with `#` are skipped.
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Reads and parses a target-process file.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::ConfigLoadFailure`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, GhostError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| GhostError::ConfigLoadFailure {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&content))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn matches(&self, process_name: &str) -> bool {
        let wanted = process_name.to_lowercase();
        self.names
            .iter()
            .any(|target| target.to_lowercase() == wanted)
    }
}

/// Termination outcome per process name for the most recent activation.
///
/// Keys are the names as reported by the OS (`"Zoom.EXE"`), not the target
/// spelling, kept in the order they were first terminated.  When several
/// processes share a name the entry is `true` only if every one of them was
/// terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KilledProcessRecord {
    entries: Vec<(String, bool)>,
}

impl KilledProcessRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn record(&mut self, name: impl Into<String>, terminated: bool) {
        let name = name.into();
        match self.entries.iter_mut().find(|(known, _)| *known == name) {
            Some((_, all)) => *all = *all && terminated,
            None => self.entries.push((name, terminated)),
        }
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, ok)| *ok)
    }

    /// Names that were terminated successfully, in termination order.
    pub fn terminated(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, ok)| *ok)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// `(name, terminated)` pairs in termination order.
    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, bool)> for KilledProcessRecord {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (name, ok) in iter {
            record.record(name, ok);
        }
        record
    }
}
