use crate::error::{Error, Result};
use crate::set::PreferenceSet;
use glob::Pattern;

/// Query a preference set by glob patterns over keys (OR logic)
///
/// Returns a new set with the entries matching any of the patterns, in their
/// original order. Duplicate keys stay duplicated.
pub fn query_preferences(set: &PreferenceSet, patterns: &[&str]) -> Result<PreferenceSet> {
    // Compile all patterns first to fail fast on invalid patterns
    let compiled_patterns: Vec<Pattern> = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidGlobPattern(format!("'{}': {}", p, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(set
        .iter()
        .filter(|entry| {
            compiled_patterns
                .iter()
                .any(|pattern| pattern.matches(&entry.key))
        })
        .cloned()
        .collect())
}
