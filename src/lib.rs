//! # ffskel - Firefox Skeleton Deployer Library
//!
//! This library loads Firefox preference override lists (`user.js`), renders
//! them back into Firefox's `user_pref(...)` syntax, and deploys the result
//! into user skeleton directories so that newly created accounts inherit the
//! configuration.
//!
//! ## Features
//!
//! - Parse `user.js`/`prefs.js` files with full JavaScript escape sequence support
//! - Keep own-line `//` comments as entry annotations
//! - Byte-stable rendering with a CityHash64 fingerprint for reproducibility checks
//! - Last-write-wins lookups and reports of overridden duplicate keys
//! - Query preferences using glob patterns (e.g., `"privacy.*"`)
//! - Atomic deployment (temp file + rename) with `overwrite` and `merge` policies
//! - Resolve every Firefox profile inside a skeleton directory
//! - INI deploy plans
//!
//! ## Quick Start
//!
//! ```rust
//! use ffskel::{render, PreferenceSet, RenderOptions};
//!
//! let set = PreferenceSet::parse(r#"
//! user_pref("browser.startup.homepage", "about:home");
//!
//! // HomePage: "none"
//! user_pref("browser.startup.homepage", "about:blank");
//! "#)?;
//!
//! let text = render(&set, &RenderOptions::default())?;
//! assert_eq!(
//!     text,
//!     "user_pref(\"browser.startup.homepage\", \"about:home\");\n\
//!      \n\
//!      // HomePage: \"none\"\n\
//!      user_pref(\"browser.startup.homepage\", \"about:blank\");\n"
//! );
//! # Ok::<(), ffskel::Error>(())
//! ```
//!
//! ### Deploying Into a Skeleton
//!
//! ```rust,no_run
//! use ffskel::{user_js_destinations, Deployer, Policy, PreferenceSet};
//! use std::path::Path;
//!
//! let set = PreferenceSet::load(Path::new("user.js"))?;
//! let destinations = user_js_destinations(Path::new("/etc/skel"))?;
//!
//! let deployer = Deployer {
//!     policy: Policy::Merge,
//!     create_dirs: true,
//!     ..Deployer::default()
//! };
//! for report in deployer.deploy_all(&set, &destinations) {
//!     match report.result {
//!         Ok(outcome) => println!("{}: {:?}", report.path.display(), outcome),
//!         Err(e) => eprintln!("{}: {}", report.path.display(), e),
//!     }
//! }
//! # Ok::<(), ffskel::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All functions return [`Result<T, Error>`]:
//!
//! ```rust
//! use ffskel::{PreferenceSet, Error};
//!
//! match PreferenceSet::parse("user_pref(invalid syntax") {
//!     Ok(_) => println!("Parsed successfully"),
//!     Err(Error::Parser { line, column, message }) => {
//!         eprintln!("Parse error at {}:{}: {}", line, column, message);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

pub use types::{PrefEntry, PrefType, PrefValue, Policy};

pub use error::{Error, Result};

pub use parser::{parse_prefs_js, parse_prefs_js_file};
pub use query::query_preferences;
pub use set::{OverriddenKey, PreferenceSet};

pub use render::{fingerprint, render, render_entry, RenderOptions};

pub use merge::{plan_merge, MergePlan};

pub use deploy::{write_atomic, DeployOutcome, Deployer, DestinationReport};

pub use plan::DeployPlan;
pub use skel::{firefox_dir, resolve_profiles, user_js_destinations, SkelProfile};

// All modules are private - use re-exports above for public API
mod deploy;
mod error;
mod lexer;
mod merge;
mod parser;
mod plan;
mod query;
mod render;
mod set;
mod skel;
mod types;
