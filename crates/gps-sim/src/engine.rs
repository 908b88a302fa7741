//! Event-driven GPS virtual time engine.

use serde::Serialize;

use crate::error::GpsError;
use crate::flow::{Flow, DEFAULT_FLOW_WEIGHT};
use crate::packet::{FlowId, Packet, PacketHandle};
use crate::priority_queue::PriorityQueue;
use crate::{log_debug, log_trace, log_warn};

type HolComparator = fn(&PacketHandle, &PacketHandle) -> bool;

/// Packet departure produced by [`GpsEngine::process_wakeup`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Departed packet.
    pub packet: PacketHandle,
    /// Real time of the departure.
    pub departure_time: u64,
}

/// GPS simulator engine.
///
/// The engine is fed with packet arrivals in non-decreasing order of arrival time. Before each
/// arrival the caller must process all wakeups scheduled at or before the arrival time:
///
/// ```rust
/// use gps_sim::{GpsEngine, Packet};
///
/// let mut engine = GpsEngine::with_weights(&[1., 2.]).unwrap();
/// let mut packets = vec![Packet::new(1, 1, 100, 0), Packet::new(2, 2, 100, 0), Packet::new(1, 3, 100, 400)];
/// for packet in packets.iter_mut() {
///     while let Some(wakeup) = engine.next_wakeup_time().filter(|t| *t <= packet.arrival_time) {
///         engine.process_wakeup(wakeup).unwrap();
///     }
///     engine.handle_arrival(packet).unwrap();
/// }
/// assert_eq!(packets[0].virtual_finish_time(), Some(100.));
/// assert_eq!(packets[1].virtual_finish_time(), Some(50.));
/// assert_eq!(packets[2].virtual_finish_time(), Some(200.));
/// ```
///
/// The third packet arrives after the engine went idle, yet its finish time is chained to the
/// previous packet of flow 1: a flow keeps its last virtual finish time across busy periods,
/// while virtual time of each busy period restarts from 0.
pub struct GpsEngine {
    name: String,
    flows: Vec<Flow>,
    hol_packets: PriorityQueue<PacketHandle, HolComparator>,
    sum_weight: f64,
    idle: bool,
    last_virtual_time: f64,
    last_real_time: u64,
    next_wakeup: Option<u64>,
    current: Option<PacketHandle>,
    arrival_count: u64,
}

impl GpsEngine {
    /// Creates engine with `flow_count` flows of default weight.
    pub fn new(flow_count: usize) -> Result<Self, GpsError> {
        Self::with_weights(&vec![DEFAULT_FLOW_WEIGHT; flow_count])
    }

    /// Creates engine with one flow per weight, flow `i + 1` gets `weights[i]`.
    pub fn with_weights(weights: &[f64]) -> Result<Self, GpsError> {
        if weights.is_empty() {
            return Err(GpsError::invalid_configuration("at least one flow is required"));
        }
        let flows = weights
            .iter()
            .map(|weight| Flow::new(*weight))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: "gps".to_string(),
            flows,
            hol_packets: PriorityQueue::with_comparator(PacketHandle::is_worse as HolComparator),
            sum_weight: 0.,
            idle: true,
            last_virtual_time: 0.,
            last_real_time: 0,
            next_wakeup: None,
            current: None,
            arrival_count: 0,
        })
    }

    /// Sets the name used in log messages.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Returns the name used in log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the real time of the last processed event.
    pub fn time(&self) -> u64 {
        self.last_real_time
    }

    /// Returns the real time of the last processed event.
    pub fn last_real_time(&self) -> u64 {
        self.last_real_time
    }

    /// Returns the virtual time of the last processed event.
    pub fn virtual_time(&self) -> f64 {
        self.last_virtual_time
    }

    /// Returns the total weight of backlogged flows.
    pub fn sum_weight(&self) -> f64 {
        self.sum_weight
    }

    /// Returns `true` if no flow is backlogged.
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Returns the real time of the next scheduled departure, if any.
    pub fn next_wakeup_time(&self) -> Option<u64> {
        self.next_wakeup
    }

    /// Returns the head-of-line packet with the minimal virtual finish time.
    pub fn current_packet(&self) -> Option<&PacketHandle> {
        self.current.as_ref()
    }

    /// Returns the number of flows.
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Returns the flow with the given (1-based) id.
    pub fn flow(&self, id: FlowId) -> Option<&Flow> {
        id.checked_sub(1).and_then(|idx| self.flows.get(idx))
    }

    /// Returns weights of all flows ordered by flow id.
    pub fn flow_weights(&self) -> Vec<f64> {
        self.flows.iter().map(|f| f.weight()).collect()
    }

    /// Returns ids of currently backlogged flows.
    pub fn backlogged_flows(&self) -> Vec<FlowId> {
        (1..=self.flows.len())
            .filter(|id| self.flows[id - 1].is_backlogged())
            .collect()
    }

    /// Handles arrival of a packet at its arrival time.
    ///
    /// Computes and stores the packet's virtual finish time. Packets of unknown flows are
    /// rejected without changing the engine state.
    pub fn handle_arrival(&mut self, packet: &mut Packet) -> Result<(), GpsError> {
        let now_real_time = packet.arrival_time;
        let flow_idx = self.bind_packet(packet)?;
        if !self.idle && now_real_time < self.last_real_time {
            log_warn!(
                self,
                "packet {} arrives at {} before last event at {}",
                packet.packet_id,
                now_real_time,
                self.last_real_time
            );
        }

        let now_virtual_time = if self.idle {
            self.idle = false;
            0.
        } else {
            self.last_virtual_time + (now_real_time as f64 - self.last_real_time as f64) / self.sum_weight
        };

        let flow = &mut self.flows[flow_idx];
        let newly_active = !flow.is_backlogged();
        if newly_active {
            self.sum_weight += flow.weight();
        }
        let vft = now_virtual_time.max(flow.last_vft()) + packet.length as f64 / flow.weight();
        let handle = PacketHandle {
            seq: self.arrival_count,
            packet_id: packet.packet_id,
            flow_id: packet.flow_id,
            length: packet.length,
            virtual_finish_time: vft,
        };
        self.arrival_count += 1;
        packet.bind(packet.flow_id, vft);
        flow.append_packet(handle);

        self.last_real_time = now_real_time;
        self.last_virtual_time = now_virtual_time;
        log_debug!(
            self,
            "packet {} of flow {} arrived: vt={:.6} vft={:.6} sum_weight={}",
            packet.packet_id,
            packet.flow_id,
            now_virtual_time,
            vft,
            self.sum_weight
        );

        if newly_active {
            self.hol_packets.enqueue(handle);
            let current = *self.hol_packets.peek_min()?;
            self.current = Some(current);
            self.reset_timer(now_real_time, now_virtual_time, current.virtual_finish_time);
        }
        Ok(())
    }

    /// Processes the departure scheduled at `now_real_time`.
    ///
    /// Must be called exactly at [`next_wakeup_time`](Self::next_wakeup_time).
    pub fn process_wakeup(&mut self, now_real_time: u64) -> Result<Departure, GpsError> {
        let expected = self.next_wakeup.ok_or(GpsError::NoPendingDeparture(now_real_time))?;
        if expected != now_real_time {
            return Err(GpsError::WakeupMismatch {
                expected,
                actual: now_real_time,
            });
        }
        let departed = self.hol_packets.pop_min()?;
        debug_assert_eq!(Some(departed), self.current);
        let now_virtual_time = departed.virtual_finish_time;

        let flow = &mut self.flows[departed.flow_id - 1];
        flow.pop_head_of_line()?;
        if flow.is_backlogged() {
            self.hol_packets.enqueue(*flow.peek_head_of_line()?);
        } else {
            self.sum_weight -= flow.weight();
        }

        self.last_real_time = now_real_time;
        self.last_virtual_time = now_virtual_time;
        log_debug!(
            self,
            "packet {} of flow {} departed: vft={:.6}",
            departed.packet_id,
            departed.flow_id,
            departed.virtual_finish_time
        );

        match self.hol_packets.peek_min() {
            Ok(next) => {
                let next = *next;
                self.current = Some(next);
                self.reset_timer(now_real_time, now_virtual_time, next.virtual_finish_time);
            }
            Err(_) => self.clean_up_after_busy_period(),
        }
        Ok(Departure {
            packet: departed,
            departure_time: now_real_time,
        })
    }

    /// Processes scheduled departures until the engine becomes idle.
    pub fn drain(&mut self) -> Result<Vec<Departure>, GpsError> {
        let mut departures = Vec::new();
        while let Some(wakeup) = self.next_wakeup {
            departures.push(self.process_wakeup(wakeup)?);
        }
        Ok(departures)
    }

    fn bind_packet(&self, packet: &Packet) -> Result<usize, GpsError> {
        if packet.flow_id >= 1 && packet.flow_id <= self.flows.len() {
            Ok(packet.flow_id - 1)
        } else {
            Err(GpsError::UnknownFlow {
                flow_id: packet.flow_id,
                packet_id: packet.packet_id,
                flow_count: self.flows.len(),
            })
        }
    }

    fn reset_timer(&mut self, now_real_time: u64, now_virtual_time: f64, wakeup_virtual_time: f64) {
        let delta = ((wakeup_virtual_time - now_virtual_time) * self.sum_weight).round_ties_even();
        // finish times already passed due to rounding of earlier wakeups are due immediately
        let delta = if delta > 0. { delta as u64 } else { 0 };
        self.next_wakeup = Some(now_real_time + delta);
        log_trace!(
            self,
            "next wakeup at {} (vft={:.6})",
            now_real_time + delta,
            wakeup_virtual_time
        );
    }

    fn clean_up_after_busy_period(&mut self) {
        log_debug!(self, "busy period finished");
        self.idle = true;
        self.current = None;
        self.next_wakeup = None;
        self.sum_weight = 0.;
        self.last_virtual_time = 0.;
    }
}
