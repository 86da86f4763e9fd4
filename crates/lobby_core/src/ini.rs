//! Ordered INI documents.
//!
//! The game engine reads its launch configuration (`spawn.ini`) and the
//! patched map (`spawnmap.ini`) as INI files. Section and key order is
//! preserved so written files are stable and diffable between launches.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LobbyError, Result};

/// A single `[section]` with its keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniSection {
    /// Section name, without brackets.
    pub name: String,
    /// Key/value pairs in insertion order.
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    /// Create an empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove a key, returning its old value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate over keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// An ordered INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniDocument {
    /// Sections in file order.
    pub sections: Vec<IniSection>,
}

/// Parse an INI boolean the way the engine does.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Render a boolean for INI output.
#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl IniDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text.
    ///
    /// Lines starting with `;` or `#` are comments. Keys before the first
    /// section header are an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| LobbyError::IniParse {
                    line: i + 1,
                    message: format!("unterminated section header '{line}'"),
                })?;
                current = Some(doc.section_index_or_insert(name.trim()));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(LobbyError::IniParse {
                    line: i + 1,
                    message: format!("expected key=value, found '{line}'"),
                });
            };
            let Some(idx) = current else {
                return Err(LobbyError::IniParse {
                    line: i + 1,
                    message: "key outside of any section".to_string(),
                });
            };
            // Trailing comments are not stripped; map data can contain ';'.
            doc.sections[idx].set(key.trim(), value.trim());
        }

        Ok(doc)
    }

    /// Read and parse an INI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| LobbyError::io(path, e))?;
        Self::parse(&text)
    }

    /// Write the document to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).map_err(|e| LobbyError::io(path, e))
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.sections.iter().position(|s| s.name == name) {
            return idx;
        }
        self.sections.push(IniSection::new(name));
        self.sections.len() - 1
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Look up a section mutably.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut IniSection> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Get a section, appending it if missing.
    pub fn section_or_insert(&mut self, name: &str) -> &mut IniSection {
        let idx = self.section_index_or_insert(name);
        &mut self.sections[idx]
    }

    /// Whether the document has a section with this name.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Look up a string value.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Look up an integer value. Unparseable values read as `None`.
    #[must_use]
    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key).and_then(|v| v.trim().parse().ok())
    }

    /// Look up a boolean value.
    #[must_use]
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get(section, key).and_then(parse_bool)
    }

    /// Set a string value, creating the section if needed.
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.section_or_insert(section).set(key, value);
    }

    /// Set an integer value.
    pub fn set_int(&mut self, section: &str, key: impl Into<String>, value: impl fmt::Display) {
        self.set(section, key, value.to_string());
    }

    /// Set a boolean value.
    pub fn set_bool(&mut self, section: &str, key: impl Into<String>, value: bool) {
        self.set(section, key, format_bool(value));
    }

    /// Remove a key from a section.
    pub fn remove_key(&mut self, section: &str, key: &str) -> Option<String> {
        self.section_mut(section).and_then(|s| s.remove(key))
    }

    /// Move a section to the top of the document, if present.
    pub fn move_section_to_first(&mut self, name: &str) {
        if let Some(idx) = self.sections.iter().position(|s| s.name == name) {
            let section = self.sections.remove(idx);
            self.sections.insert(0, section);
        }
    }

    /// Merge another document into this one. Keys from `other` override.
    pub fn merge(&mut self, other: &IniDocument) {
        for section in &other.sections {
            let target = self.section_or_insert(&section.name);
            for (key, value) in &section.entries {
                target.set(key.clone(), value.clone());
            }
        }
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_keys() {
        let doc = IniDocument::parse(
            "; comment\n[Basic]\nName=Twin Peaks\n\n[Waypoints]\n0=50123\n1 = 80111\n",
        )
        .unwrap();

        assert_eq!(doc.get("Basic", "Name"), Some("Twin Peaks"));
        assert_eq!(doc.get_int("Waypoints", "0"), Some(50123));
        assert_eq!(doc.get_int("Waypoints", "1"), Some(80111));
        assert_eq!(doc.get("Waypoints", "2"), None);
    }

    #[test]
    fn test_parse_rejects_key_outside_section() {
        let err = IniDocument::parse("Name=Orphan\n").unwrap_err();
        assert!(matches!(err, LobbyError::IniParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_garbage_line() {
        let err = IniDocument::parse("[A]\nnot a pair\n").unwrap_err();
        assert!(matches!(err, LobbyError::IniParse { line: 2, .. }));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut doc = IniDocument::new();
        doc.set("Settings", "A", "1");
        doc.set("Settings", "B", "2");
        doc.set("Settings", "A", "3");

        let keys: Vec<_> = doc.section("Settings").unwrap().keys().collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(doc.get("Settings", "A"), Some("3"));
    }

    #[test]
    fn test_bool_formatting() {
        let mut doc = IniDocument::new();
        doc.set_bool("S", "On", true);
        doc.set("S", "Legacy", "yes");

        assert_eq!(doc.get("S", "On"), Some("True"));
        assert_eq!(doc.get_bool("S", "On"), Some(true));
        assert_eq!(doc.get_bool("S", "Legacy"), Some(true));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = IniDocument::parse("[Basic]\nA=1\nB=2\n").unwrap();
        let patch = IniDocument::parse("[Basic]\nB=20\n[Extra]\nC=3\n").unwrap();
        base.merge(&patch);

        assert_eq!(base.get("Basic", "A"), Some("1"));
        assert_eq!(base.get("Basic", "B"), Some("20"));
        assert_eq!(base.get("Extra", "C"), Some("3"));
    }

    #[test]
    fn test_move_section_to_first_and_render() {
        let mut doc = IniDocument::parse("[A]\nx=1\n[MultiplayerDialogSettings]\ny=2\n").unwrap();
        doc.move_section_to_first("MultiplayerDialogSettings");

        assert_eq!(doc.to_string(), "[MultiplayerDialogSettings]\ny=2\n\n[A]\nx=1\n");
    }

    #[test]
    fn test_rendered_text_parses_back() {
        let mut doc = IniDocument::new();
        doc.set_int("SpawnLocations", "Multi1", 3);
        doc.set_bool("IsSpectator", "Multi2", true);

        let reparsed = IniDocument::parse(&doc.to_string()).unwrap();
        assert_eq!(reparsed, doc);
    }
}
