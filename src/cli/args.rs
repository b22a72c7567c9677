//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::application::FacetSelection;

/// Tailor partial exports of a model hierarchy by facets
#[derive(Parser, Debug)]
#[command(name = "tailor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by commands that narrow the default filter.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Keep only this value of a facet (repeatable), e.g. --select Stage=Draft
    #[arg(short, long, value_name = "FACET=VALUE")]
    pub select: Vec<FacetSelection>,

    /// Drop this value of a facet (repeatable)
    #[arg(short = 'x', long, value_name = "FACET=VALUE")]
    pub deselect: Vec<FacetSelection>,

    /// Filter by entity kind and own properties instead of aggregated facets
    #[arg(short = 'k', long)]
    pub by_kind: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List facets and their values
    Facets {
        /// Model document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,

        /// Show per-kind property filters instead of facets
        #[arg(short = 'k', long)]
        by_kind: bool,
    },

    /// Print the (pruned) hierarchy as a tree
    Tree {
        /// Model document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Show effective facets of each node
        #[arg(short, long)]
        facets: bool,
    },

    /// Export the retained hierarchy as JSON
    Export {
        /// Model document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,

        /// Output file (default: <output_dir>/<root name>.json)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Pick facet values interactively
        #[arg(short, long, conflicts_with_all = ["select", "deselect"])]
        interactive: bool,
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
    Show {
        /// Model document whose local .tailor.toml is merged in
        #[arg(value_hint = ValueHint::FilePath)]
        model: Option<PathBuf>,
    },

    /// Print config template
    Template,

    /// Show config paths
    Path {
        /// Model document whose local config path is shown
        #[arg(value_hint = ValueHint::FilePath)]
        model: Option<PathBuf>,
    },
}
