//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::application::services::{Assignment, DocumentFormat};
use crate::domain::{ConflictPolicy, FoldOrder};

/// Flatten, rebuild and deep-merge YAML/JSON trees via delimiter-joined key paths
#[derive(Parser, Debug)]
#[command(name = "pathtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Project directory for `.pathtree.toml` (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Path key delimiter (overrides config)
    #[arg(short = 'D', long, global = true, env = "PATHTREE_DELIMITER")]
    pub delimiter: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output destination shared by the tree commands.
#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Stdout format (default from config)
    #[arg(short, long)]
    pub format: Option<DocumentFormat>,

    /// Write to file instead of stdout (format by extension)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten a document into path-keyed entries
    Unpack {
        /// Source document (.yml, .yaml, .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Maximum nesting depth to descend
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Rebuild a nested tree from path-keyed entries or bare keys
    Pack {
        /// Document holding flat path-keyed entries
        #[arg(value_hint = ValueHint::FilePath, required_unless_present = "keys")]
        file: Option<PathBuf>,

        /// Bare path keys to pack instead of a document
        #[arg(long, num_args = 1.., conflicts_with = "file")]
        keys: Vec<String>,

        /// Number of separate levels to keep
        #[arg(short, long)]
        limit: Option<usize>,

        /// Which end keeps its levels: right-to-left (-1) or left-to-right (+1)
        #[arg(long, allow_hyphen_values = true)]
        order: Option<FoldOrder>,

        /// Prefix kept as a single leading component
        #[arg(long)]
        base: Option<String>,

        /// Value for every key (type inferred)
        #[arg(long, conflicts_with_all = ["fill_key", "fill_each"])]
        fill: Option<String>,

        /// Use each key as its own value
        #[arg(long, conflicts_with = "fill_each")]
        fill_key: bool,

        /// Values zipped with the keys (types inferred)
        #[arg(long, num_args = 1..)]
        fill_each: Vec<String>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Deep-merge documents onto a base document
    Merge {
        /// Base document (its header is preserved)
        #[arg(value_hint = ValueHint::FilePath)]
        base: PathBuf,

        /// Documents merged onto the base, left to right
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        incoming: Vec<PathBuf>,

        /// Conflict policy: strict, overwrite, append (default from config)
        #[arg(short, long)]
        policy: Option<ConflictPolicy>,

        /// Override applied last: KEY=VALUE with a path key
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<Assignment>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Print the value stored under a path key
    Get {
        /// Source document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Path key, e.g. `server/port`
        key: String,
    },

    /// Show a document as a tree
    Show {
        /// Source document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_merge_args_when_parsing_then_typed_values() {
        let cli = Cli::try_parse_from([
            "pathtree",
            "-vv",
            "merge",
            "base.yml",
            "a.yml",
            "b.json",
            "-p",
            "append",
            "--set",
            "server/port=9090",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Merge {
                incoming,
                policy,
                overrides,
                ..
            }) => {
                assert_eq!(incoming.len(), 2);
                assert_eq!(policy, Some(ConflictPolicy::Append));
                assert_eq!(overrides[0].key, "server/port");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_pack_without_input_when_parsing_then_error() {
        assert!(Cli::try_parse_from(["pathtree", "pack"]).is_err());
        assert!(Cli::try_parse_from(["pathtree", "pack", "--keys", "a/b", "--order", "-1"]).is_ok());
    }
}
