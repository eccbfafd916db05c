//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate linked API reference pages from Doxygen XML
#[derive(Parser, Debug)]
#[command(name = "arborist")]
#[command(about = "Generate linked API reference pages from Doxygen XML")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the reference page tree from a Doxygen index.xml
    Generate {
        /// Path to the Doxygen index.xml
        index: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the generated root page
        #[arg(long)]
        root_file: Option<String>,

        /// Title of the generated root page
        #[arg(long)]
        title: Option<String>,

        /// Paragraph placed under the root title
        #[arg(long)]
        description: Option<String>,

        /// Paragraph placed after the hierarchies
        #[arg(long)]
        summary: Option<String>,

        /// Navigation depth hint for generated toctrees
        #[arg(long)]
        max_depth: Option<usize>,

        /// Emit collapsible-list markup instead of plain nested lists
        #[arg(long)]
        tree_view: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}
