//! Process entry point: build the market model tree once, run it for a
//! fixed 100 time units, and dump the event log as a CSV file.

use market_simulator_core::{top_model, MarketConfig, RootCoordinator};
use std::fs::File;
use std::io::BufWriter;
use std::process;

const RUN_DURATION: f64 = 100.0;
const LOG_PATH: &str = "simulation_log.csv";
const FIELD_SEPARATOR: char = ';';

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = MarketConfig::default();
    let mut coordinator = RootCoordinator::new(top_model(&config)?)?;

    coordinator.start()?;
    let outcome = coordinator.simulate(RUN_DURATION)?;
    coordinator.stop();

    let file = File::create(LOG_PATH)?;
    let mut writer = BufWriter::new(file);
    coordinator
        .event_log()
        .write_delimited(&mut writer, FIELD_SEPARATOR)?;

    println!(
        "simulated {} cycles to t={} ({:?}); {} events written to {}",
        outcome.cycles,
        outcome.final_time,
        outcome.halt,
        coordinator.event_log().len(),
        LOG_PATH
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
