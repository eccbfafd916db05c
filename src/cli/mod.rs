//! CLI module for Arborist

mod args;

pub use args::{Args, Command};

use crate::config::Config;
use crate::doxygen::DoxygenIndex;
use crate::error::{Error, Result};
use crate::graph::ApiGraph;
use crate::output::{RstConfig, RstGenerator};
use std::path::Path;
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            index,
            output,
            root_file,
            title,
            description,
            summary,
            max_depth,
            tree_view,
            config,
            verbose,
        } => {
            // Load config file if it exists
            let mut cfg = if let Some(config_path) = &config {
                Config::load_or_default(config_path)
            } else {
                Config::load_or_default(Path::new("arborist.toml"))
            };

            // Merge CLI arguments (CLI takes precedence)
            cfg.merge_cli(
                index,
                output,
                title,
                description,
                summary,
                root_file,
                max_depth,
                tree_view,
            );
            cfg.validate()?;

            if verbose {
                println!("Index: {}", cfg.input.index.display());
                println!("Output: {}", cfg.output.directory.display());
                println!("Root file: {}", cfg.output.root_file);
                println!("Title: {}", cfg.project.title);
                println!("Max depth: {}", cfg.output.max_depth);
                println!("Tree view: {}", cfg.output.tree_view);
            }

            if !cfg.input.index.exists() {
                return Err(Error::PathNotFound(cfg.input.index.clone()));
            }

            println!("Parsing {}...", cfg.input.index.display());
            let index = DoxygenIndex::load(&cfg.input.index)?;
            println!("Found {} top-level compounds", index.compounds().len());

            println!("Linking entities...");
            let mut graph = ApiGraph::build(&index, &cfg.input.xml_dir())?;

            let stats = graph.stats();
            println!(
                "Discovered {} entities: {} classes, {} namespaces, {} files, {} directories",
                stats.entities, stats.class_like, stats.namespaces, stats.files, stats.dirs
            );

            println!("Generating pages...");
            let generator = RstGenerator::new(RstConfig::from_config(&cfg))?;
            let report = generator.generate(&mut graph)?;

            println!("{}", report.summary());
            println!("Reference written to: {}", cfg.output.directory.display());

            Ok(())
        }

        Command::Version => {
            println!("arborist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
