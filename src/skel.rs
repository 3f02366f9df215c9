//! Firefox profile discovery inside a user skeleton directory
//!
//! New accounts receive a copy of the skeleton, so a `user.js` placed at
//! `<skel>/.mozilla/firefox/<profile>/user.js` is picked up by every new
//! user's browser. Profiles are resolved in this order:
//!
//! 1. `profiles.ini` in the skeleton's Firefox directory
//! 2. Profile-looking directories next to it
//! 3. A single `default` profile

use crate::error::{Error, Result};
use configparser::ini::Ini;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files whose presence marks a directory as a Firefox profile
const PROFILE_MARKERS: &[&str] = &["user.js", "prefs.js", "times.json", "compatibility.ini"];

/// Name of the profile used when the skeleton declares none
pub const DEFAULT_PROFILE: &str = "default";

/// A profile directory inside a skeleton
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkelProfile {
    pub name: String,
    /// Absolute (or skeleton-rooted) profile directory
    pub path: PathBuf,
    pub is_default: bool,
}

impl SkelProfile {
    /// Where this profile's `user.js` lives
    pub fn user_js_path(&self) -> PathBuf {
        self.path.join("user.js")
    }
}

/// Firefox directory inside a skeleton root
pub fn firefox_dir(skel: &Path) -> PathBuf {
    skel.join(".mozilla").join("firefox")
}

/// Resolve the profiles that should receive a `user.js`
pub fn resolve_profiles(skel: &Path) -> Result<Vec<SkelProfile>> {
    if !skel.is_dir() {
        return Err(Error::SkeletonNotFound(skel.to_path_buf()));
    }

    let ff_dir = firefox_dir(skel);
    let profiles_ini = ff_dir.join("profiles.ini");

    if profiles_ini.is_file() {
        match parse_profiles_ini(&profiles_ini, &ff_dir) {
            Ok(profiles) if !profiles.is_empty() => return Ok(profiles),
            Ok(_) => {
                tracing::warn!(path = %profiles_ini.display(), "profiles.ini lists no profiles")
            }
            Err(e) => {
                tracing::warn!(
                    path = %profiles_ini.display(),
                    error = %e,
                    "Ignoring unreadable profiles.ini"
                )
            }
        }
    }

    let scanned = scan_profile_dirs(&ff_dir);
    if !scanned.is_empty() {
        return Ok(scanned);
    }

    Ok(vec![SkelProfile {
        name: DEFAULT_PROFILE.to_string(),
        path: ff_dir.join(DEFAULT_PROFILE),
        is_default: true,
    }])
}

/// `user.js` destinations for every resolved profile
pub fn user_js_destinations(skel: &Path) -> Result<Vec<PathBuf>> {
    Ok(resolve_profiles(skel)?
        .iter()
        .map(SkelProfile::user_js_path)
        .collect())
}

/// Parse profiles.ini to extract profile information
fn parse_profiles_ini(ini_path: &Path, ff_dir: &Path) -> Result<Vec<SkelProfile>> {
    let content = std::fs::read_to_string(ini_path)?;

    let mut ini = Ini::new();
    ini.read(content).map_err(Error::ProfilesIniParse)?;

    // configparser lowercases section names and iterates a HashMap
    let mut sections: Vec<String> = ini
        .sections()
        .into_iter()
        .filter(|s| s.starts_with("profile"))
        .collect();
    sections.sort_by_key(|s| profile_index(s));

    let mut profiles = Vec::new();
    for sec in sections {
        let name = ini.get(&sec, "Name").unwrap_or_default();
        let path_str = ini.get(&sec, "Path").unwrap_or_default();
        if name.is_empty() || path_str.is_empty() {
            tracing::warn!(section = %sec, "Skipping profile without Name or Path");
            continue;
        }
        let is_relative = ini
            .getuint(&sec, "IsRelative")
            .ok()
            .flatten()
            .unwrap_or(1)
            == 1;
        let is_default = ini
            .getuint(&sec, "Default")
            .ok()
            .flatten()
            .unwrap_or(0)
            == 1;

        let path = if is_relative {
            ff_dir.join(&path_str)
        } else {
            PathBuf::from(&path_str)
        };
        profiles.push(SkelProfile {
            name,
            path,
            is_default,
        });
    }

    Ok(profiles)
}

/// Sort key for `profileN` sections; unnumbered ones go last
fn profile_index(section: &str) -> (u32, String) {
    let index = section
        .trim_start_matches("profile")
        .parse::<u32>()
        .unwrap_or(u32::MAX);
    (index, section.to_string())
}

/// Directories directly under the Firefox directory that look like profiles
fn scan_profile_dirs(ff_dir: &Path) -> Vec<SkelProfile> {
    if !ff_dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(ff_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable skeleton entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| {
            PROFILE_MARKERS
                .iter()
                .any(|marker| entry.path().join(marker).is_file())
        })
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_default = name == DEFAULT_PROFILE || name.ends_with(".default");
            SkelProfile {
                name,
                path: entry.into_path(),
                is_default,
            }
        })
        .collect()
}
