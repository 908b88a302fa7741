use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::info;

use gps_sim::{GpsSimulation, RunConfig, SimulationResults, Trace};

const DEFAULT_OUTPUT: &str = "gps_output.json";
const SEPARATOR: &str = "===================================================================";

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Trace file with flows and packets
    #[arg(short, long)]
    input: String,

    /// YAML file with run options
    #[arg(short, long)]
    config: Option<String>,

    /// Output JSON file [default: gps_output.json]
    #[arg(short, long)]
    output: Option<String>,

    /// Process departures scheduled after the last packet arrival
    #[arg(long)]
    drain: bool,

    /// Do not print flows and packets before the simulation
    #[arg(short, long)]
    quiet: bool,
}

fn print_trace(trace: &Trace) {
    println!("{}", SEPARATOR);
    println!("                        Flow Information");
    println!("{}", SEPARATOR);
    println!("flow number: {}", trace.flow_count());
    for (idx, weight) in trace.flow_weights().iter().enumerate() {
        println!("flow ID: {}, flow weight: {}", idx + 1, weight);
    }
    println!("{}\n\n", SEPARATOR);
    println!("{}", SEPARATOR);
    println!("                        Packet Information");
    println!("{}", SEPARATOR);
    for packet in trace.packets() {
        println!(
            "arrival time: {}, flow ID: {}, packet ID: {}, packet length: {}",
            packet.arrival_time, packet.flow_id, packet.packet_id, packet.length
        );
    }
    println!("{}", SEPARATOR);
}

fn print_results(results: &SimulationResults, json: &str) {
    println!("\n\n{}", SEPARATOR);
    println!("          Simulation results under GPS Simulator");
    println!("{}", SEPARATOR);
    for record in &results.packets {
        let departure = record
            .departure_time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "flow ID: {}, packet ID: {}, virtual finish time: {:.3}, departure time: {}",
            record.flow_id, record.packet_id, record.virtual_finish_time, departure
        );
    }
    println!("{}", SEPARATOR);
    println!("{}", json);
    println!("{}\n\n", SEPARATOR);
}

fn main() -> Result<()> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path).with_context(|| format!("can't load config {}", path))?,
        None => RunConfig::default(),
    };
    if args.drain {
        config.drain_trailing_departures = true;
    }
    if args.quiet {
        config.print_trace = false;
    }
    let output = args
        .output
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let trace = Trace::from_file(&args.input).with_context(|| format!("can't load trace {}", args.input))?;
    if config.print_trace {
        print_trace(&trace);
    }

    let mut sim = GpsSimulation::new(trace, config).context("can't create simulation")?;
    let results = sim.run().context("simulation failed")?;
    let json = results.to_json();
    if !args.quiet {
        print_results(&results, &json);
    }

    info!("Saving results to {}", output);
    results
        .save_to_file(&output)
        .with_context(|| format!("can't write results to {}", output))?;
    Ok(())
}
