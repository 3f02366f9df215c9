use clap::{Parser, Subcommand, ValueEnum};
use ffskel::Policy;
use std::path::PathBuf;

/// CLI arguments for ffskel
#[derive(Parser, Debug)]
#[command(name = "ffskel")]
#[command(
    version,
    about = "Render and deploy Firefox user.js preference sets into skeleton directories"
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the rendered preference file
    Render {
        /// Source user.js
        source: PathBuf,

        /// Drop comment annotations from the output
        #[arg(long)]
        no_annotations: bool,

        /// Only keep keys matching these glob patterns
        #[arg(short, long = "query")]
        query: Vec<String>,
    },

    /// Print preferences as JSON
    Show {
        source: PathBuf,

        #[arg(short, long = "query")]
        query: Vec<String>,

        /// Collapse duplicate keys to their effective value
        #[arg(long)]
        effective: bool,

        #[arg(long, value_enum, default_value_t = OutputType::JsonArray)]
        output_type: OutputType,
    },

    /// Report overridden keys and unrenderable values
    Check { source: PathBuf },

    /// Deploy the preference set to destination files
    Deploy {
        /// Source user.js (may come from --config instead)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Destination files
        destinations: Vec<PathBuf>,

        /// Deploy to every Firefox profile in this skeleton directory
        #[arg(long)]
        skel: Option<PathBuf>,

        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// Create missing parent directories
        #[arg(long)]
        create_dirs: bool,

        #[arg(long)]
        no_annotations: bool,

        /// INI deploy plan
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the Firefox profiles found in a skeleton directory
    Profiles { skel: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    /// `{"key": value}`, last value wins
    JsonObject,
    /// `[{"key": ..., "value": ...}]` in file order
    JsonArray,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_deploy(args: &[&str]) -> (Option<PathBuf>, Vec<PathBuf>, Option<PathBuf>) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Deploy {
                source,
                destinations,
                config,
                ..
            } => (source, destinations, config),
            other => panic!("expected deploy, got {:?}", other),
        }
    }

    #[test]
    fn test_deploy_positionals_are_destinations() {
        let (source, destinations, config) =
            parse_deploy(&["ffskel", "deploy", "--config", "plan.ini", "/srv/extra/user.js"]);
        assert_eq!(source, None);
        assert_eq!(destinations, vec![PathBuf::from("/srv/extra/user.js")]);
        assert_eq!(config, Some(PathBuf::from("plan.ini")));
    }

    #[test]
    fn test_deploy_source_flag() {
        let (source, destinations, _) =
            parse_deploy(&["ffskel", "deploy", "-s", "user.js", "a/user.js", "b/user.js"]);
        assert_eq!(source, Some(PathBuf::from("user.js")));
        assert_eq!(destinations.len(), 2);
    }

    #[test]
    fn test_deploy_policy_value() {
        let cli =
            Cli::try_parse_from(["ffskel", "-v", "deploy", "--policy", "merge", "x"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Deploy { policy, .. } => assert_eq!(policy, Some(Policy::Merge)),
            other => panic!("expected deploy, got {:?}", other),
        }
        assert!(Cli::try_parse_from(["ffskel", "deploy", "--policy", "replace"]).is_err());
    }
}
