use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use river_core::{
    load_csv, load_csv_file, load_river_config_from_env, populate_distances, populate_flow_rate,
    rank_junctions_by_flow, simulate_dam, Coord, DuplicatePolicy, Observation, Region,
    RiverConfig, RiverConfigMetadata, RiverNetwork, SourceLocator, VertexId,
    BUILTIN_REFERENCE_NETWORK,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Query flow, dams and contamination sources of a river network",
    long_about = None
)]
struct Args {
    /// Network CSV (Node,x,y,type,linked); defaults to the builtin reference network
    #[arg(long, global = true)]
    network: Option<PathBuf>,

    /// River config JSON; defaults to RIVER_CONFIG_PATH or the builtin config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the first row of a conflicting duplicate vertex instead of failing
    #[arg(long, global = true)]
    skip_duplicates: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flow rate of every river edge
    Flows,
    /// Rank junctions inside a region by downstream flow
    Rank {
        #[arg(long, value_parser = parse_coord)]
        top_left: Coord,
        #[arg(long, value_parser = parse_coord)]
        bottom_right: Coord,
    },
    /// Report downstream flow after damming the junction nearest to a point
    Dam {
        #[arg(long, value_parser = parse_coord)]
        at: Coord,
    },
    /// Estimate contamination sources from readings (format: ID:CONCENTRATION)
    Source {
        #[arg(long = "observe", value_parser = parse_observation, num_args = 1.., required = true)]
        observations: Vec<Observation>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let (config, config_metadata) = match &args.config {
        Some(path) => {
            let config = RiverConfig::from_file(path)
                .with_context(|| format!("Failed to load river config {}", path.display()))?;
            (Arc::new(config), RiverConfigMetadata::new(Some(path.clone())))
        }
        None => load_river_config_from_env(),
    };
    let policy = if args.skip_duplicates {
        DuplicatePolicy::Skip
    } else {
        DuplicatePolicy::FailFast
    };

    let mut network = match &args.network {
        Some(path) => load_csv_file(path, &config, policy)
            .with_context(|| format!("Failed to load network {}", path.display()))?,
        None => load_csv(BUILTIN_REFERENCE_NETWORK.as_bytes(), &config, policy)
            .context("Failed to load the builtin reference network")?,
    };
    populate_distances(&mut network);
    let summary = populate_flow_rate(&mut network).context("Flow propagation failed")?;
    let config_source = config_metadata
        .path()
        .map_or_else(|| "builtin".to_string(), |path| path.display().to_string());
    info!(
        config = %config_source,
        vertices = network.len(),
        headwaters = summary.headwaters,
        "river network ready"
    );

    match args.command {
        Command::Flows => print_flows(&network),
        Command::Rank {
            top_left,
            bottom_right,
        } => {
            let region = Region::new(top_left, bottom_right, &config.map_extent)?;
            let ranked = rank_junctions_by_flow(&network, &region)?;
            if ranked.is_empty() {
                println!("no junctions in region");
            }
            for (position, junction) in ranked.iter().enumerate() {
                println!(
                    "{:>3}. junction {:<4} flow {}",
                    position + 1,
                    junction.id,
                    junction.flow
                );
            }
        }
        Command::Dam { at } => {
            if !config.map_extent.contains(at) {
                bail!(
                    "Dam location {at} lies outside the map [{}, {}]",
                    config.map_extent.min,
                    config.map_extent.max
                );
            }
            let report = simulate_dam(&network, at)?;
            println!(
                "dam below junction {} on edge {} -> {} holds back {}",
                report.junction, report.junction, report.dammed_target, report.removed
            );
            for step in &report.downstream {
                println!(
                    "  {} -> {}: {} -> {}",
                    step.from, step.to, step.original, step.adjusted
                );
            }
        }
        Command::Source { observations } => {
            let locator = SourceLocator::new(&network, config.seepage_window);
            let attribution = locator.locate(&observations);
            if attribution.is_empty() {
                println!("no plausible source");
            }
            for (headwater, confidence) in &attribution.confirmed {
                println!("headwater {headwater}: confirmed ({confidence:?})");
            }
            if let Some(headwater) = attribution.resolved {
                println!("headwater {headwater}: closest candidate");
            }
        }
    }

    Ok(())
}

fn print_flows(network: &RiverNetwork) {
    for edge in network.edges() {
        let Some(rate) = edge.flow_rate() else {
            continue;
        };
        let length = edge.weight().unwrap_or_default();
        println!("{} -> {}: flow {rate} length {length:.1}", edge.source, edge.target);
    }
}

fn parse_coord(raw: &str) -> Result<Coord, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("coordinate must be X,Y, got '{raw}'"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x in '{raw}'"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y in '{raw}'"))?;
    Ok(Coord::new(x, y))
}

fn parse_observation(raw: &str) -> Result<Observation, String> {
    let (vertex, concentration) = raw
        .split_once(':')
        .ok_or_else(|| format!("observation must be ID:CONCENTRATION, got '{raw}'"))?;
    let vertex = vertex
        .trim()
        .parse()
        .map_err(|_| format!("invalid vertex id in '{raw}'"))?;
    let concentration: f64 = concentration
        .trim()
        .parse()
        .map_err(|_| format!("invalid concentration in '{raw}'"))?;
    if !concentration.is_finite() || concentration < 0.0 {
        return Err(format!("concentration must be a non-negative number, got '{raw}'"));
    }
    Ok(Observation::new(VertexId(vertex), concentration))
}
