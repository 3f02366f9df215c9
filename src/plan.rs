//! Deploy plan files
//!
//! A plan describes one deployment in INI form:
//!
//! ```ini
//! [deploy]
//! source = user.js
//! policy = merge
//! create_dirs = true
//! annotations = true
//! skel = /etc/skel
//!
//! [destination.extra]
//! path = /srv/template/.mozilla/firefox/default/user.js
//! ```
//!
//! Relative `source`, `skel` and `path` values resolve against the directory
//! holding the plan file.

use crate::deploy::Deployer;
use crate::error::{Error, Result};
use crate::render::RenderOptions;
use crate::skel::user_js_destinations;
use crate::types::Policy;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

const DEPLOY_SECTION: &str = "deploy";
const DESTINATION_PREFIX: &str = "destination";

/// A parsed deploy plan
#[derive(Debug, Clone, PartialEq)]
pub struct DeployPlan {
    pub source: PathBuf,
    pub policy: Policy,
    pub create_dirs: bool,
    pub annotations: bool,
    /// Skeleton root whose profiles all receive the set
    pub skel: Option<PathBuf>,
    /// Explicit destination files, ordered by section name
    pub destinations: Vec<PathBuf>,
}

impl DeployPlan {
    /// Read a plan file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Plan {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base, path)
    }

    /// Parse plan text; `origin` only labels errors
    pub fn parse(content: &str, base: &Path, origin: &Path) -> Result<Self> {
        let plan_err = |message: String| Error::Plan {
            path: origin.to_path_buf(),
            message,
        };

        let mut ini = Ini::new();
        ini.read(content.to_string()).map_err(plan_err)?;

        let source = ini
            .get(DEPLOY_SECTION, "source")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| plan_err("missing [deploy] source".to_string()))?;

        let policy = match ini.get(DEPLOY_SECTION, "policy") {
            Some(p) => p.parse::<Policy>()?,
            None => Policy::default(),
        };

        let create_dirs = ini
            .getbool(DEPLOY_SECTION, "create_dirs")
            .map_err(plan_err)?
            .unwrap_or(false);
        let annotations = ini
            .getbool(DEPLOY_SECTION, "annotations")
            .map_err(plan_err)?
            .unwrap_or(true);

        let skel = ini
            .get(DEPLOY_SECTION, "skel")
            .filter(|s| !s.trim().is_empty())
            .map(|s| base.join(s.trim()));

        let mut sections: Vec<String> = ini
            .sections()
            .into_iter()
            .filter(|s| s.starts_with(DESTINATION_PREFIX))
            .collect();
        sections.sort();

        let mut destinations = Vec::new();
        for sec in sections {
            let path = ini
                .get(&sec, "path")
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| plan_err(format!("[{}] has no path", sec)))?;
            destinations.push(base.join(path.trim()));
        }

        if skel.is_none() && destinations.is_empty() {
            return Err(plan_err(
                "no destinations: set [deploy] skel or add a [destination.<name>] section"
                    .to_string(),
            ));
        }

        Ok(Self {
            source: base.join(source.trim()),
            policy,
            create_dirs,
            annotations,
            skel,
            destinations,
        })
    }

    /// Skeleton profile destinations followed by explicit ones, without repeats
    pub fn resolve_destinations(&self) -> Result<Vec<PathBuf>> {
        let mut out: Vec<PathBuf> = Vec::new();
        if let Some(skel) = &self.skel {
            out.extend(user_js_destinations(skel)?);
        }
        for dest in &self.destinations {
            if !out.contains(dest) {
                out.push(dest.clone());
            }
        }
        Ok(out)
    }

    pub fn deployer(&self) -> Deployer {
        Deployer {
            policy: self.policy,
            create_dirs: self.create_dirs,
            render: RenderOptions {
                annotations: self.annotations,
            },
        }
    }
}
