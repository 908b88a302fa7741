#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod heap;
pub mod log;
pub mod packet;
pub mod priority_queue;
pub mod simulation;
pub mod trace;


pub use colored;
pub use config::RunConfig;
pub use engine::{Departure, GpsEngine};
pub use error::GpsError;
pub use flow::Flow;
pub use heap::{EmptyContainerError, MinHeap};
pub use packet::{FlowId, Packet, PacketHandle};
pub use priority_queue::PriorityQueue;
pub use simulation::{GpsSimulation, PacketRecord, SimulationResults};
pub use trace::{Trace, TraceError};
