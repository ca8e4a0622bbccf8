//! hgcoref command-line tool
//!
//! Loads edges and coreference pairs into an in-memory hypergraph and prints
//! the resulting groups as JSON lines.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hgcoref::ingest::{apply_corefs_file, load_edges_file};
use hgcoref::{
    CorefConfig, CorefEngine, CorefIdGenerator, CorefResult, Edge, InMemoryHypergraph,
    RandomIdGenerator, SequentialIdGenerator,
};

/// Tool configuration
#[derive(Default)]
struct Args {
    /// Edge file, one edge per line
    edges: Option<PathBuf>,
    /// Coref file, one `(a b)` pair per line
    corefs: Option<PathBuf>,
    /// JSON engine configuration
    config: Option<PathBuf>,
    /// Use deterministic group ids
    seed_ids: bool,
}

fn print_help() {
    println!("hgcoref - coreference groups over a hypergraph");
    println!();
    println!("USAGE:");
    println!("    hgcoref [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -e, --edges <FILE>        Edges to load, one per line");
    println!("    -c, --corefs <FILE>       Coreference pairs, one (a b) per line");
    println!("        --config <FILE>       JSON engine configuration");
    println!("        --seed-ids            Generate sequential group ids");
    println!("    -h, --help                Print help information");
}

fn parse_args() -> Result<Option<Args>, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .map(PathBuf::from)
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--edges" | "-e" => {
                parsed.edges = Some(value()?);
                i += 2;
            }
            "--corefs" | "-c" => {
                parsed.corefs = Some(value()?);
                i += 2;
            }
            "--config" => {
                parsed.config = Some(value()?);
                i += 2;
            }
            "--seed-ids" => {
                parsed.seed_ids = true;
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            arg => return Err(format!("unknown argument: {arg}")),
        }
    }

    Ok(Some(parsed))
}

#[derive(Serialize)]
struct GroupLine<'a> {
    coref_id: &'a str,
    main: Edge,
    members: &'a BTreeSet<Edge>,
}

fn run(args: &Args) -> CorefResult<()> {
    let config = match &args.config {
        Some(path) => CorefConfig::from_json_file(path)?,
        None => CorefConfig::default(),
    };
    let ids: Arc<dyn CorefIdGenerator> = if args.seed_ids {
        Arc::new(SequentialIdGenerator::default())
    } else {
        Arc::new(RandomIdGenerator::new())
    };

    let store = Arc::new(InMemoryHypergraph::new());
    let engine = CorefEngine::with_config(store.clone(), ids, config)?;

    if let Some(path) = &args.edges {
        load_edges_file(store.as_ref(), path)?;
    }
    if let Some(path) = &args.corefs {
        apply_corefs_file(&engine, path)?;
    }

    let mut groups: BTreeMap<String, BTreeSet<Edge>> = BTreeMap::new();
    for edge in store.edges()? {
        if let Some(id) = engine.coref_id(&edge)? {
            groups.entry(id).or_default().insert(edge);
        }
    }

    for (coref_id, members) in &groups {
        let Some(first) = members.iter().next() else {
            continue;
        };
        let line = GroupLine {
            coref_id,
            main: engine.main_coref(first)?,
            members,
        };
        let json = serde_json::to_string(&line)
            .map_err(|e| hgcoref::CorefError::internal(format!("cannot encode group: {e}")))?;
        println!("{json}");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
