//! Ordered, immutable preference sets
//!
//! A [`PreferenceSet`] keeps entries in file order. Keys may repeat; the
//! consuming application applies statements top to bottom, so the last entry
//! for a key is the effective one.

use crate::error::Result;
use crate::parser::{parse_prefs_js, parse_prefs_js_file};
use crate::types::{PrefEntry, PrefValue};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Ordered sequence of preference entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    entries: Vec<PrefEntry>,
}

/// A key that is set more than once, with every position it appears at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverriddenKey {
    pub key: String,
    /// Indexes into the set, in order; the last one wins
    pub positions: Vec<usize>,
    /// Source lines, when the entries were parsed from text
    pub lines: Vec<usize>,
    pub effective: PrefValue,
}

impl PreferenceSet {
    pub fn new(entries: Vec<PrefEntry>) -> Self {
        Self { entries }
    }

    /// Parse a set from preference text
    ///
    /// ```rust
    /// use ffskel::{PreferenceSet, PrefValue};
    ///
    /// let set = PreferenceSet::parse(r#"
    ///     user_pref("browser.startup.homepage", "about:home");
    ///     user_pref("browser.startup.homepage", "about:blank");
    /// "#)?;
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(
    ///     set.get("browser.startup.homepage"),
    ///     Some(&PrefValue::String("about:blank".to_string()))
    /// );
    /// # Ok::<(), ffskel::Error>(())
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self::new(parse_prefs_js(content)?))
    }

    /// Load a set from a preference file
    pub fn load(path: &Path) -> Result<Self> {
        let entries = parse_prefs_js_file(path)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded preference set");
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[PrefEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrefEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective value for `key`: the value of its last entry
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// One entry per key carrying the last value, in order of first appearance
    pub fn effective(&self) -> Vec<&PrefEntry> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut out: Vec<&PrefEntry> = Vec::new();
        for entry in &self.entries {
            match slots.get(entry.key.as_str()) {
                Some(&slot) => out[slot] = entry,
                None => {
                    slots.insert(entry.key.as_str(), out.len());
                    out.push(entry);
                }
            }
        }
        out
    }

    /// Keys set more than once, in order of first appearance
    pub fn overridden(&self) -> Vec<OverriddenKey> {
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            let slot = positions.entry(entry.key.as_str()).or_insert_with(|| {
                order.push(entry.key.as_str());
                Vec::new()
            });
            slot.push(idx);
        }

        order
            .into_iter()
            .filter_map(|key| {
                let idxs = positions.remove(key)?;
                if idxs.len() < 2 {
                    return None;
                }
                let last = *idxs.last()?;
                Some(OverriddenKey {
                    key: key.to_string(),
                    lines: idxs.iter().filter_map(|&i| self.entries[i].line).collect(),
                    effective: self.entries[last].value.clone(),
                    positions: idxs,
                })
            })
            .collect()
    }
}

impl From<Vec<PrefEntry>> for PreferenceSet {
    fn from(entries: Vec<PrefEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<PrefEntry> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = PrefEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PreferenceSet {
    type Item = &'a PrefEntry;
    type IntoIter = std::slice::Iter<'a, PrefEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
