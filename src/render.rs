//! Rendering preference sets back into `user.js` text
//!
//! Each entry becomes one `user_pref("<key>", <value>);` line (or the
//! statement function matching its type). Output depends only on the input,
//! so rendering the same set twice yields identical bytes.

use crate::error::{Error, Result};
use crate::set::PreferenceSet;
use crate::types::{PrefEntry, PrefValue};
use std::fmt::Write as _;

/// Options controlling rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit entry comments as `//` lines, separated from the previous entry by a blank line
    pub annotations: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { annotations: true }
    }
}

/// Render a whole set
///
/// ```rust
/// use ffskel::{render, PrefEntry, PreferenceSet, RenderOptions};
///
/// let set = PreferenceSet::new(vec![
///     PrefEntry::new("browser.shell.checkDefaultBrowser", false),
///     PrefEntry::new("browser.newtabpage.enabled", true),
/// ]);
/// let text = render(&set, &RenderOptions::default())?;
/// assert_eq!(
///     text,
///     "user_pref(\"browser.shell.checkDefaultBrowser\", false);\n\
///      user_pref(\"browser.newtabpage.enabled\", true);\n"
/// );
/// # Ok::<(), ffskel::Error>(())
/// ```
pub fn render(set: &PreferenceSet, options: &RenderOptions) -> Result<String> {
    render_entries(set.entries(), options, true)
}

/// Render entries; `at_start` tells whether the output begins a file
pub(crate) fn render_entries(
    entries: &[PrefEntry],
    options: &RenderOptions,
    at_start: bool,
) -> Result<String> {
    let mut out = String::new();
    let mut first_line = at_start;

    for entry in entries {
        if options.annotations {
            if let Some(comment) = &entry.comment {
                if !first_line {
                    out.push('\n');
                }
                for line in comment.split('\n') {
                    if line.is_empty() {
                        out.push_str("//\n");
                    } else {
                        let _ = writeln!(out, "// {}", line);
                    }
                }
            }
        }
        out.push_str(&render_entry(entry)?);
        out.push('\n');
        first_line = false;
    }

    Ok(out)
}

/// Fail on the first entry whose value has no textual form
pub(crate) fn check_renderable(entries: &[PrefEntry]) -> Result<()> {
    match entries.iter().find(|entry| !entry.value.is_renderable()) {
        Some(entry) => Err(Error::InvalidValueType {
            key: entry.key.clone(),
            found: entry.value.type_name(),
        }),
        None => Ok(()),
    }
}

/// Render a single statement without the trailing newline
pub fn render_entry(entry: &PrefEntry) -> Result<String> {
    Ok(format!(
        "{}({}, {});",
        entry.pref_type.function_name(),
        quote(&entry.key),
        render_value(&entry.key, &entry.value)?
    ))
}

fn render_value(key: &str, value: &PrefValue) -> Result<String> {
    match value {
        PrefValue::Bool(b) => Ok(b.to_string()),
        PrefValue::Integer(n) => Ok(n.to_string()),
        PrefValue::String(s) => Ok(quote(s)),
        PrefValue::Float(_) | PrefValue::Null => Err(Error::InvalidValueType {
            key: key.to_string(),
            found: value.type_name(),
        }),
    }
}

/// Double-quote a string, escaping what the lexer would unescape
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// CityHash64 of rendered text as 16 uppercase hex chars
pub fn fingerprint(rendered: &str) -> String {
    let hash: u64 = cityhasher::hash(rendered.as_bytes());
    format!("{:016X}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_prefs_js;
    use crate::types::PrefType;

    #[test]
    fn test_render_two_booleans_exactly() {
        let set = PreferenceSet::new(vec![
            PrefEntry::new("browser.shell.checkDefaultBrowser", false),
            PrefEntry::new("browser.newtabpage.enabled", true),
        ]);
        let text = render(&set, &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            "user_pref(\"browser.shell.checkDefaultBrowser\", false);\n\
             user_pref(\"browser.newtabpage.enabled\", true);\n"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let set = PreferenceSet::new(vec![
            PrefEntry::new("browser.startup.page", 0).with_comment("HomePage"),
            PrefEntry::new("browser.startup.homepage", "about:blank"),
        ]);
        let options = RenderOptions::default();
        let first = render(&set, &options).unwrap();
        let second = render(&set, &options).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn test_render_integer_and_string() {
        let entry = PrefEntry::new("browser.startup.page", -1);
        assert_eq!(
            render_entry(&entry).unwrap(),
            "user_pref(\"browser.startup.page\", -1);"
        );
        let entry = PrefEntry::new("startup.homepage_welcome_url", "");
        assert_eq!(
            render_entry(&entry).unwrap(),
            "user_pref(\"startup.homepage_welcome_url\", \"\");"
        );
    }

    #[test]
    fn test_render_uses_type_function() {
        let entry = PrefEntry::new("a.b", true).with_type(PrefType::Locked);
        assert_eq!(render_entry(&entry).unwrap(), "lock_pref(\"a.b\", true);");
    }

    #[test]
    fn test_render_escapes_round_trip() {
        let value = "C:\\path \"quoted\"\nline\ttab\x01";
        let set = PreferenceSet::new(vec![PrefEntry::new("weird.value", value)]);
        let text = render(&set, &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            "user_pref(\"weird.value\", \"C:\\\\path \\\"quoted\\\"\\nline\\ttab\\x01\");\n"
        );
        let parsed = parse_prefs_js(&text).unwrap();
        assert_eq!(parsed[0].value, PrefValue::String(value.to_string()));
    }

    #[test]
    fn test_render_invalid_value_type() {
        let set = PreferenceSet::new(vec![
            PrefEntry::new("ok", true),
            PrefEntry {
                value: PrefValue::Float(2.5),
                ..PrefEntry::new("bad.float", 0)
            },
        ]);
        match render(&set, &RenderOptions::default()) {
            Err(Error::InvalidValueType { key, found }) => {
                assert_eq!(key, "bad.float");
                assert_eq!(found, "float");
            }
            other => panic!("expected InvalidValueType, got {:?}", other),
        }
    }

    #[test]
    fn test_render_null_is_invalid() {
        let entry = PrefEntry {
            value: PrefValue::Null,
            ..PrefEntry::new("bad.null", 0)
        };
        assert!(matches!(
            render_entry(&entry),
            Err(Error::InvalidValueType { found: "null", .. })
        ));
    }

    #[test]
    fn test_annotations_layout() {
        let set = PreferenceSet::new(vec![
            PrefEntry::new("browser.aboutwelcome.enabled", false),
            PrefEntry::new("app.update.auto", false).with_comment("AppAutoUpdate: false"),
            PrefEntry::new("app.normandy.enabled", false),
        ]);
        let text = render(&set, &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            "user_pref(\"browser.aboutwelcome.enabled\", false);\n\
             \n\
             // AppAutoUpdate: false\n\
             user_pref(\"app.update.auto\", false);\n\
             user_pref(\"app.normandy.enabled\", false);\n"
        );

        let bare = render(&set, &RenderOptions { annotations: false }).unwrap();
        assert_eq!(bare.lines().count(), 3);
        assert!(!bare.contains("//"));
    }

    #[test]
    fn test_leading_comment_has_no_blank_line() {
        let set = PreferenceSet::new(vec![PrefEntry::new("a", 1).with_comment("one\ntwo")]);
        let text = render(&set, &RenderOptions::default()).unwrap();
        assert_eq!(text, "// one\n// two\nuser_pref(\"a\", 1);\n");
    }

    #[test]
    fn test_bare_comment_lines_are_kept() {
        let set = PreferenceSet::new(vec![
            PrefEntry::new("a", 1).with_comment(""),
            PrefEntry::new("b", 2).with_comment("note\n"),
        ]);
        let text = render(&set, &RenderOptions::default()).unwrap();
        assert_eq!(
            text,
            "//\nuser_pref(\"a\", 1);\n\n// note\n//\nuser_pref(\"b\", 2);\n"
        );

        let reparsed = PreferenceSet::parse(&text).unwrap();
        assert_eq!(reparsed.entries()[0].comment.as_deref(), Some(""));
        assert_eq!(reparsed.entries()[1].comment.as_deref(), Some("note\n"));
        assert_eq!(render(&reparsed, &RenderOptions::default()).unwrap(), text);
    }

    #[test]
    fn test_render_empty_set() {
        let text = render(&PreferenceSet::default(), &RenderOptions::default()).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = fingerprint("user_pref(\"a\", 1);\n");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(fp, fingerprint("user_pref(\"a\", 2);\n"));
    }
}
