//! Isleflick simulator - plays seeded bot-vs-bot matches headlessly.
//!
//! ```text
//! isleflick-sim --seed 7 --matches 1000 -j 8 --reports
//! ```
//!
//! Match `i` runs with seed `seed + i`, so any single match of a batch can be
//! replayed on its own. Results go to stdout as JSON; logs go to stderr.

#![allow(clippy::print_stdout)]

mod bot;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::Level;

use runner::{MatchReport, MatchSetup, Summary};

/// Isleflick - headless match simulator
#[derive(Parser, Debug)]
#[command(name = "isleflick-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First match seed (match i uses seed + i)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Number of matches to play
    #[arg(short, long, default_value = "1")]
    matches: u64,

    /// Gameplay turns before a match is called unfinished
    #[arg(short = 't', long, default_value = "200")]
    max_turns: u32,

    /// Match tunables as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character roster as JSON
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Island map as JSON
    #[arg(long)]
    map: Option<PathBuf>,

    /// Parallel threads (default: CPU count)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Include every match report in the output
    #[arg(long)]
    reports: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Output {
    summary: Summary,
    mean_turns: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<Vec<MatchReport>>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let setup = MatchSetup::load(
        args.config.as_deref(),
        args.roster.as_deref(),
        args.map.as_deref(),
    )?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("cannot size the thread pool")?;
    }

    tracing::info!(
        matches = args.matches,
        seed = args.seed,
        max_turns = args.max_turns,
        "starting run"
    );
    let reports = (0..args.matches)
        .into_par_iter()
        .map(|i| runner::play(args.seed.wrapping_add(i), &setup, args.max_turns))
        .collect::<Result<Vec<_>>>()?;

    let summary = reports
        .par_iter()
        .fold(Summary::default, |mut local, report| {
            local.add(report);
            local
        })
        .reduce(Summary::default, |mut a, b| {
            a.merge(&b);
            a
        });
    tracing::info!(
        matches = summary.matches,
        wins_one = summary.wins[0],
        wins_two = summary.wins[1],
        draws = summary.draws,
        unfinished = summary.unfinished,
        "run complete"
    );

    let output = Output {
        mean_turns: summary.mean_turns(),
        summary,
        reports: args.reports.then_some(reports),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
