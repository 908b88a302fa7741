//! Trace-driven GPS simulation.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::config::RunConfig;
use crate::engine::{Departure, GpsEngine};
use crate::error::GpsError;
use crate::packet::{FlowId, Packet};
use crate::trace::Trace;

/// Per-packet simulation result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketRecord {
    /// Flow of the packet.
    pub flow_id: FlowId,
    /// Id of the packet.
    pub packet_id: u64,
    /// Real arrival time.
    pub arrival_time: u64,
    /// Size in bytes.
    pub packet_length: u64,
    /// GPS virtual finish time.
    pub virtual_finish_time: f64,
    /// Real departure time, absent if the packet did not depart during the run.
    pub departure_time: Option<u64>,
}

/// Results of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResults {
    /// Flow weights ordered by flow id.
    pub flow_weights: Vec<f64>,
    /// Packets in arrival order.
    pub packets: Vec<PacketRecord>,
    /// Departures in the order they happened.
    pub departures: Vec<Departure>,
}

impl SimulationResults {
    /// Returns results as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| panic!("can't serialize results: {}", err))
    }

    /// Writes results as JSON to the file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", self.to_json())
    }

    /// Returns ids of flows in departure order.
    pub fn departure_flow_order(&self) -> Vec<FlowId> {
        self.departures.iter().map(|d| d.packet.flow_id).collect()
    }
}

/// Runs GPS engine over a packet trace.
pub struct GpsSimulation {
    engine: GpsEngine,
    packets: Vec<Packet>,
    config: RunConfig,
    started: bool,
}

impl GpsSimulation {
    /// Creates simulation of the trace, fails if the trace has invalid flow weights.
    pub fn new(trace: Trace, config: RunConfig) -> Result<Self, GpsError> {
        let (flow_weights, packets) = trace.into_parts();
        let engine = GpsEngine::with_weights(&flow_weights)?.with_name(&config.name);
        Ok(Self {
            engine,
            packets,
            config,
            started: false,
        })
    }

    /// Returns the engine.
    pub fn engine(&self) -> &GpsEngine {
        &self.engine
    }

    /// Returns the simulated packets.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Feeds all packets into the engine, processing departures due before each arrival.
    ///
    /// Departures scheduled after the last arrival are processed only if
    /// [`RunConfig::drain_trailing_departures`] is set. Each packet is fed to the engine once,
    /// later calls fail with [`GpsError::AlreadyRun`].
    pub fn run(&mut self) -> Result<SimulationResults, GpsError> {
        if self.started {
            return Err(GpsError::AlreadyRun);
        }
        self.started = true;
        info!(
            "Running GPS simulation: {} flows, {} packets",
            self.engine.flow_count(),
            self.packets.len()
        );
        let mut departures = Vec::new();
        for packet in self.packets.iter_mut() {
            while let Some(wakeup) = self.engine.next_wakeup_time() {
                if wakeup > packet.arrival_time {
                    break;
                }
                departures.push(self.engine.process_wakeup(wakeup)?);
            }
            self.engine.handle_arrival(packet)?;
        }
        if self.config.drain_trailing_departures {
            departures.extend(self.engine.drain()?);
        }
        info!("Simulation finished: {} departures", departures.len());
        Ok(self.collect_results(departures))
    }

    fn collect_results(&self, departures: Vec<Departure>) -> SimulationResults {
        // arrival sequence numbers follow the order packets were fed to the engine
        let departure_times: HashMap<u64, u64> = departures
            .iter()
            .map(|d| (d.packet.seq, d.departure_time))
            .collect();
        let packets = self
            .packets
            .iter()
            .enumerate()
            .map(|(seq, p)| PacketRecord {
                flow_id: p.flow_id,
                packet_id: p.packet_id,
                arrival_time: p.arrival_time,
                packet_length: p.length,
                virtual_finish_time: p.virtual_finish_time().unwrap_or(f64::NAN),
                departure_time: departure_times.get(&(seq as u64)).copied(),
            })
            .collect();
        SimulationResults {
            flow_weights: self.engine.flow_weights(),
            packets,
            departures,
        }
    }
}
