//! Merging a preference set into an existing preference file
//!
//! The existing file keeps precedence: its text is preserved byte for byte
//! and only source entries whose keys it never sets are appended after it.

use crate::error::Result;
use crate::parser::parse_prefs_js;
use crate::render::{render_entries, RenderOptions};
use crate::set::PreferenceSet;
use crate::types::PrefEntry;
use std::collections::HashSet;

/// Result of planning a merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// Full text the destination should hold
    pub content: String,
    /// Number of source entries appended
    pub appended: usize,
    /// Number of statements already present in the destination
    pub kept: usize,
}

impl MergePlan {
    pub fn is_noop(&self) -> bool {
        self.appended == 0
    }
}

/// Plan the merge of `set` into the `existing` destination text
///
/// Source duplicates of a missing key are all appended, in order, so the
/// last one still wins when the file is loaded.
///
/// ```rust
/// use ffskel::{plan_merge, PrefEntry, PreferenceSet, RenderOptions};
///
/// let existing = "user_pref(\"browser.startup.homepage\", \"https://intranet\");\n";
/// let set = PreferenceSet::new(vec![
///     PrefEntry::new("browser.startup.homepage", "about:blank"),
///     PrefEntry::new("app.update.auto", false),
/// ]);
/// let plan = plan_merge(existing, &set, &RenderOptions::default())?;
/// assert_eq!(plan.appended, 1);
/// assert!(plan.content.starts_with(existing));
/// assert!(plan.content.ends_with("user_pref(\"app.update.auto\", false);\n"));
/// # Ok::<(), ffskel::Error>(())
/// ```
pub fn plan_merge(
    existing: &str,
    set: &PreferenceSet,
    options: &RenderOptions,
) -> Result<MergePlan> {
    let existing_entries = parse_prefs_js(existing)?;
    let present: HashSet<&str> = existing_entries.iter().map(|e| e.key.as_str()).collect();

    let missing: Vec<PrefEntry> = set
        .iter()
        .filter(|entry| !present.contains(entry.key.as_str()))
        .cloned()
        .collect();

    let kept = existing_entries.len();
    if missing.is_empty() {
        return Ok(MergePlan {
            content: existing.to_string(),
            appended: 0,
            kept,
        });
    }

    let mut content = existing.to_string();
    if !content.trim().is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        if !content.ends_with("\n\n") {
            content.push('\n');
        }
    }
    // the separator above already provides the blank line before a comment
    content.push_str(&render_entries(&missing, options, true)?);

    tracing::debug!(appended = missing.len(), kept, "Planned merge");

    Ok(MergePlan {
        content,
        appended: missing.len(),
        kept,
    })
}
