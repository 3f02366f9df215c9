use crate::cli::OutputType;
use anyhow::{anyhow, Context};
use ffskel::{
    fingerprint, query_preferences, render, resolve_profiles, user_js_destinations, DeployOutcome,
    DeployPlan, Deployer, PreferenceSet, RenderOptions,
};
use std::path::{Path, PathBuf};

/// Load the source set and narrow it to the query patterns, if any
fn load_source(source: &Path, query: &[String]) -> anyhow::Result<PreferenceSet> {
    let set = PreferenceSet::load(source).with_context(|| {
        format!(
            "Failed to load preferences from {}. Make sure the file exists and is a valid user.js.",
            source.display()
        )
    })?;

    if query.is_empty() {
        return Ok(set);
    }
    let patterns: Vec<&str> = query.iter().map(String::as_str).collect();
    query_preferences(&set, &patterns).context("Failed to apply query")
}

/// Print the rendered preference file
pub fn render_source(source: &Path, query: &[String], annotations: bool) -> anyhow::Result<()> {
    let set = load_source(source, query)?;
    let text = render(&set, &RenderOptions { annotations })?;
    print!("{}", text);
    Ok(())
}

/// Print preferences as JSON
pub fn show(
    source: &Path,
    query: &[String],
    effective: bool,
    output_type: OutputType,
) -> anyhow::Result<()> {
    let set = load_source(source, query)?;

    let json = match output_type {
        OutputType::JsonObject => {
            // later keys overwrite earlier ones, same as the browser
            let mut object = serde_json::Map::new();
            for entry in &set {
                object.insert(entry.key.clone(), serde_json::to_value(&entry.value)?);
            }
            serde_json::to_string_pretty(&object)?
        }
        OutputType::JsonArray if effective => serde_json::to_string_pretty(&set.effective())?,
        OutputType::JsonArray => serde_json::to_string_pretty(&set)?,
    };

    println!("{}", json);
    Ok(())
}

/// Report overridden keys and values that cannot be rendered
pub fn check(source: &Path) -> anyhow::Result<()> {
    let set = load_source(source, &[])?;

    for overridden in set.overridden() {
        let lines: Vec<String> = overridden.lines.iter().map(|l| l.to_string()).collect();
        println!(
            "override: {} set on lines {}; effective value {}",
            overridden.key,
            lines.join(", "),
            serde_json::to_string(&overridden.effective)?
        );
    }

    let invalid: Vec<_> = set.iter().filter(|e| !e.value.is_renderable()).collect();
    for entry in &invalid {
        println!(
            "invalid: {} on line {} has a {} value",
            entry.key,
            entry.line.map_or_else(|| "?".to_string(), |l| l.to_string()),
            entry.value.type_name()
        );
    }
    if !invalid.is_empty() {
        return Err(anyhow!(
            "{} of {} preferences cannot be rendered",
            invalid.len(),
            set.len()
        ));
    }

    let text = render(&set, &RenderOptions::default())?;
    println!("{} preferences, fingerprint {}", set.len(), fingerprint(&text));
    Ok(())
}

/// Options for the deploy command as given on the command line
#[derive(Debug, Default)]
pub struct DeployArgs {
    pub source: Option<PathBuf>,
    pub destinations: Vec<PathBuf>,
    pub skel: Option<PathBuf>,
    pub policy: Option<ffskel::Policy>,
    pub create_dirs: bool,
    pub no_annotations: bool,
    pub config: Option<PathBuf>,
}

/// A deployment with the plan and the command-line flags combined
#[derive(Debug)]
struct DeployJob {
    source: PathBuf,
    deployer: Deployer,
    destinations: Vec<PathBuf>,
}

/// Deploy a preference set to every destination
pub fn deploy(args: DeployArgs) -> anyhow::Result<()> {
    let job = build_job(args)?;
    let set = load_source(&job.source, &[])?;
    let results = deploy_with(&job.deployer, &set, &job.destinations);
    ensure_all_succeeded(&results)
}

/// Start from the plan, if any, and let command-line flags override it
fn build_job(args: DeployArgs) -> anyhow::Result<DeployJob> {
    let plan = match &args.config {
        Some(path) => Some(
            DeployPlan::load(path)
                .with_context(|| format!("Failed to read deploy plan {}", path.display()))?,
        ),
        None => None,
    };

    let mut deployer = plan.as_ref().map(DeployPlan::deployer).unwrap_or_default();
    if let Some(policy) = args.policy {
        deployer.policy = policy;
    }
    if args.create_dirs {
        deployer.create_dirs = true;
    }
    if args.no_annotations {
        deployer.render.annotations = false;
    }

    let source = args
        .source
        .or_else(|| plan.as_ref().map(|p| p.source.clone()))
        .ok_or_else(|| anyhow!("No source given. Pass --source or --config."))?;

    let mut destinations = match &plan {
        Some(plan) => plan.resolve_destinations()?,
        None => Vec::new(),
    };
    if let Some(skel) = &args.skel {
        destinations.extend(
            user_js_destinations(skel)
                .with_context(|| format!("Failed to resolve profiles in {}", skel.display()))?,
        );
    }
    destinations.extend(args.destinations);
    dedup_in_order(&mut destinations);

    if destinations.is_empty() {
        return Err(anyhow!(
            "No destinations. Pass destination paths, --skel, or a --config plan."
        ));
    }

    Ok(DeployJob {
        source,
        deployer,
        destinations,
    })
}

fn ensure_all_succeeded(results: &[bool]) -> anyhow::Result<()> {
    let failed = results.iter().filter(|ok| !**ok).count();
    if failed > 0 {
        return Err(anyhow!(
            "{} of {} destinations failed",
            failed,
            results.len()
        ));
    }
    Ok(())
}

fn deploy_with(deployer: &Deployer, set: &PreferenceSet, destinations: &[PathBuf]) -> Vec<bool> {
    deployer
        .deploy_all(set, destinations)
        .into_iter()
        .map(|report| {
            match &report.result {
                Ok(DeployOutcome::Written { entries }) => {
                    println!("written   {} ({} preferences)", report.path.display(), entries)
                }
                Ok(DeployOutcome::Merged { appended, kept }) => println!(
                    "merged    {} ({} appended, {} kept)",
                    report.path.display(),
                    appended,
                    kept
                ),
                Ok(DeployOutcome::Unchanged) => {
                    println!("unchanged {}", report.path.display())
                }
                Err(e) => eprintln!("failed    {}: {}", report.path.display(), e),
            }
            report.is_ok()
        })
        .collect()
}

fn dedup_in_order(paths: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}

/// List the Firefox profiles found in a skeleton directory
pub fn list_profiles(skel: &Path) -> anyhow::Result<()> {
    let profiles = resolve_profiles(skel).map_err(|e| {
        anyhow!(
            "Failed to list profiles: {}. Make sure the skeleton directory exists.",
            e
        )
    })?;

    let json = serde_json::to_string_pretty(&profiles)?;
    println!("{}", json);
    Ok(())
}
