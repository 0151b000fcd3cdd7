use std::{io::stdout, path::PathBuf, process::ExitCode};

use clap::Parser;
use ptpnet_sim::{
    config::Config,
    observer::{write_json, RunSummary},
    setup_logger,
    simulation::Simulation,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to use
    #[clap(long = "config", short = 'c')]
    config: Option<PathBuf>,

    /// Override the logging level of the configuration file
    #[clap(short, long)]
    loglevel: Option<log::LevelFilter>,

    /// Override the number of synchronization rounds
    #[clap(short, long)]
    iterations: Option<u32>,

    /// Print the run summary as JSON instead of a table
    #[clap(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Could not load config {}: {error}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }

    let loglevel = match args.loglevel.map(Ok).unwrap_or_else(|| config.loglevel()) {
        Ok(level) => level,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = setup_logger(loglevel) {
        eprintln!("Could not setup logging: {error}");
        return ExitCode::FAILURE;
    }

    let mut simulation = match Simulation::from_config(&config) {
        Ok(simulation) => simulation,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let summary = match simulation.run() {
        Ok(summary) => summary,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        if let Err(error) = write_json(&mut stdout().lock(), &summary) {
            tracing::error!("Could not write summary: {error}");
            return ExitCode::FAILURE;
        }
    } else {
        print_summary(&summary);
    }

    ExitCode::SUCCESS
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Simulated until {} ({} events, {} messages, {} dropped)",
        summary.end_time,
        summary.events_processed,
        summary.messages_delivered,
        summary.messages_dropped
    );
    print!("{}", summary.snapshot);

    println!();
    println!(
        "{:>5} {:>11} {:>14} {:>14} {:>14}",
        "id", "corrections", "last after", "max after", "max before"
    );
    for node in &summary.nodes {
        println!(
            "{:>5} {:>11} {:>14} {:>14} {:>14}",
            node.node,
            node.corrections,
            node.last_offset_after.to_string(),
            node.max_offset_after.to_string(),
            node.max_offset_before.to_string()
        );
    }

    if !summary.errors.is_empty() {
        println!();
        println!("{} protocol errors:", summary.errors.len());
        for error in &summary.errors {
            println!("  {} {}", error.time, error.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_overrides() {
        let args = Args::try_parse_from([
            "ptpnet-sim",
            "-c",
            "star.toml",
            "--loglevel",
            "trace",
            "-i",
            "3",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("star.toml")));
        assert_eq!(args.loglevel, Some(log::LevelFilter::Trace));
        assert_eq!(args.iterations, Some(3));
        assert!(args.json);
    }

    #[test]
    fn no_arguments() {
        let args = Args::try_parse_from(["ptpnet-sim"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.loglevel, None);
        assert!(!args.json);
    }

    #[test]
    fn rejects_bad_loglevel() {
        assert!(Args::try_parse_from(["ptpnet-sim", "-l", "loud"]).is_err());
    }
}
