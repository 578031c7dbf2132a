/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use yannakakis::{
    load_query, EngineConfig, JsonRelationSource, OrderingExplorer, RelationSource, Result,
    TraversalMode, YannakakisEngine,
};

#[derive(Parser)]
#[command(
    name = "yannakakis-cli",
    version = "0.1.0",
    author = "Volodymyr Kadzhaia <vkadzhaia@gmail.com>",
    author = "Pieter Bonte <pieter.bonte@kuleuven.be>",
    about = "A CLI tool for Yannakakis join evaluation",
    long_about = "Yannakakis CLI - evaluates acyclic equi-join queries described in JSON over relations stored as JSON files, using selection push-down, semi-join reduction and a final join phase."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one query and print the result
    Run {
        #[arg(short, long, help = "Query definition (JSON)", value_name = "FILE")]
        query: PathBuf,

        #[arg(short, long, help = "Directory holding <relation>.json files", value_name = "DIR")]
        data: PathBuf,

        #[arg(short, long, help = "Engine configuration (JSON)", value_name = "FILE")]
        config: Option<PathBuf>,

        #[arg(long, help = "Keep the join tree's edge order as written")]
        no_ordering: bool,

        #[arg(long, help = "rooted-tree or edge-sequence", value_name = "MODE")]
        traversal: Option<TraversalMode>,

        #[arg(long, help = "Apply the query's projection criteria")]
        project: bool,

        #[arg(long, default_value_t = 10, help = "Number of result tuples to print", value_name = "N")]
        show: usize,
    },
    /// Evaluate one query under every connected edge ordering
    Explore {
        #[arg(short, long, help = "Query definition (JSON)", value_name = "FILE")]
        query: PathBuf,

        #[arg(short, long, help = "Directory holding <relation>.json files", value_name = "DIR")]
        data: PathBuf,

        #[arg(short, long, help = "Engine configuration (JSON)", value_name = "FILE")]
        config: Option<PathBuf>,

        #[arg(long, help = "Maximum number of orderings to run", value_name = "N")]
        limit: Option<usize>,

        #[arg(long, help = "Run orderings in parallel")]
        parallel: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path),
        None => Ok(EngineConfig::default()),
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Run {
            query,
            data,
            config,
            no_ordering,
            traversal,
            project,
            show,
        } => {
            let query = load_query(&query)?;
            let mut config = load_config(config.as_ref())?;
            if no_ordering {
                config.apply_cardinality_ordering = false;
            }
            if let Some(traversal) = traversal {
                config.traversal = traversal;
            }
            if project {
                config.apply_projection = true;
            }

            let relations = JsonRelationSource::new(&data).fetch_all(&query.columns)?;
            let outcome = YannakakisEngine::new(config).execute_query(relations, &query)?;

            info!(
                "{}: {} tuples in {:.6} seconds, {} dangling tuples removed",
                query.name,
                outcome.result.len(),
                outcome.elapsed.as_secs_f64(),
                outcome.dangling_tuples_removed()
            );
            for tuple in outcome.result.tuples.iter().take(show) {
                println!("{}", serde_json::to_string(tuple)?);
            }
            println!("Results: {}", outcome.result.len());
        }
        Command::Explore {
            query,
            data,
            config,
            limit,
            parallel,
        } => {
            let query = load_query(&query)?;
            let config = load_config(config.as_ref())?;
            let relations = JsonRelationSource::new(&data).fetch_all(&query.columns)?;

            let report = OrderingExplorer::new(config)
                .parallel(parallel)
                .limit(limit)
                .explore(&relations, &query);

            println!(
                "Orderings run: {}, failed: {}",
                report.runs.len(),
                report.failures.len()
            );
            if let Some(best) = report.best() {
                println!("Best:  {:.6}s {}", best.elapsed.as_secs_f64(), best.join_tree);
            }
            if let Some(worst) = report.worst() {
                println!("Worst: {:.6}s {}", worst.elapsed.as_secs_f64(), worst.join_tree);
            }
            for failure in &report.failures {
                println!("Failed: {} ({})", failure.join_tree, failure.error);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
