//! Core preference types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A preference value as it appears in a preference file
///
/// Only [`PrefValue::Bool`], [`PrefValue::Integer`] and [`PrefValue::String`]
/// can be rendered back into a `user.js`. Floats and `null` are accepted by
/// the parser because Firefox's own default files contain them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Integer(i64),
    String(String),
    Float(f64),
    Null,
}

impl PrefValue {
    /// Convert a lexed number into the narrowest value type
    pub fn from_f64(n: f64) -> Self {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            PrefValue::Integer(n as i64)
        } else {
            PrefValue::Float(n)
        }
    }

    /// Human readable name of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "boolean",
            PrefValue::Integer(_) => "integer",
            PrefValue::String(_) => "string",
            PrefValue::Float(_) => "float",
            PrefValue::Null => "null",
        }
    }

    /// Whether the value can be written as a `user_pref` literal
    pub fn is_renderable(&self) -> bool {
        matches!(
            self,
            PrefValue::Bool(_) | PrefValue::Integer(_) | PrefValue::String(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrefValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Bool(b)
    }
}

impl From<i64> for PrefValue {
    fn from(n: i64) -> Self {
        PrefValue::Integer(n)
    }
}

impl From<i32> for PrefValue {
    fn from(n: i32) -> Self {
        PrefValue::Integer(n.into())
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::String(s.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::String(s)
    }
}

/// Preference statement kind, indicated by the function name used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefType {
    /// `user_pref()`
    #[default]
    User,
    /// `pref()`
    Default,
    /// `lock_pref()`
    Locked,
    /// `sticky_pref()`
    Sticky,
}

impl PrefType {
    /// The statement function name for this type
    pub fn function_name(&self) -> &'static str {
        match self {
            PrefType::User => "user_pref",
            PrefType::Default => "pref",
            PrefType::Locked => "lock_pref",
            PrefType::Sticky => "sticky_pref",
        }
    }

    /// Look up a type by its statement function name
    pub fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "user_pref" => Some(PrefType::User),
            "pref" => Some(PrefType::Default),
            "lock_pref" => Some(PrefType::Locked),
            "sticky_pref" => Some(PrefType::Sticky),
            _ => None,
        }
    }
}

/// A single preference statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefEntry {
    /// Dot-namespaced preference key
    pub key: String,
    pub value: PrefValue,
    #[serde(default)]
    pub pref_type: PrefType,
    /// Comment lines that annotate this entry; no functional effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-indexed source line, when the entry was parsed from text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl PrefEntry {
    /// Create a `user_pref` entry with no annotation
    pub fn new(key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            pref_type: PrefType::User,
            comment: None,
            line: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_type(mut self, pref_type: PrefType) -> Self {
        self.pref_type = pref_type;
        self
    }
}

/// How a deployment treats an existing destination file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Replace the destination entirely
    #[default]
    Overwrite,
    /// Append entries whose keys the destination does not already set
    Merge,
}

impl FromStr for Policy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Policy::Overwrite),
            "merge" => Ok(Policy::Merge),
            other => Err(crate::Error::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Overwrite => f.write_str("overwrite"),
            Policy::Merge => f.write_str("merge"),
        }
    }
}
