//! Traffic flow state.

use std::collections::VecDeque;

use crate::error::GpsError;
use crate::heap::EmptyContainerError;
use crate::packet::PacketHandle;

/// Weight of a flow created without explicit weight.
pub const DEFAULT_FLOW_WEIGHT: f64 = 1.0;

/// Flow with a fixed weight and a FIFO queue of undeparted packets.
#[derive(Debug, Clone)]
pub struct Flow {
    weight: f64,
    packets: VecDeque<PacketHandle>,
    last_vft: f64,
    backlog_bytes: u64,
}

impl Flow {
    /// Creates flow with the given weight, which must be positive and finite.
    pub fn new(weight: f64) -> Result<Self, GpsError> {
        if !(weight.is_finite() && weight > 0.) {
            return Err(GpsError::invalid_configuration(format!(
                "flow weight must be positive, got {}",
                weight
            )));
        }
        Ok(Self {
            weight,
            packets: VecDeque::new(),
            last_vft: 0.,
            backlog_bytes: 0,
        })
    }

    /// Returns the flow weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns `true` if the flow has undeparted packets.
    pub fn is_backlogged(&self) -> bool {
        !self.packets.is_empty()
    }

    /// Returns the number of undeparted packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Returns `true` if the flow has no undeparted packets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Returns the total size of undeparted packets.
    pub fn backlog_bytes(&self) -> u64 {
        self.backlog_bytes
    }

    /// Returns the virtual finish time of the most recently appended packet.
    pub fn last_vft(&self) -> f64 {
        self.last_vft
    }

    /// Returns the earliest undeparted packet.
    pub fn peek_head_of_line(&self) -> Result<&PacketHandle, EmptyContainerError> {
        self.packets.front().ok_or(EmptyContainerError::new("flow"))
    }

    /// Removes the earliest undeparted packet.
    pub fn pop_head_of_line(&mut self) -> Result<PacketHandle, EmptyContainerError> {
        let packet = self.packets.pop_front().ok_or(EmptyContainerError::new("flow"))?;
        self.backlog_bytes -= packet.length;
        Ok(packet)
    }

    /// Appends packet to the tail of the queue.
    pub fn append_packet(&mut self, packet: PacketHandle) {
        self.backlog_bytes += packet.length;
        self.last_vft = packet.virtual_finish_time;
        self.packets.push_back(packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(seq: u64, length: u64, vft: f64) -> PacketHandle {
        PacketHandle {
            seq,
            packet_id: seq,
            flow_id: 1,
            length,
            virtual_finish_time: vft,
        }
    }

    #[test]
    fn rejects_bad_weights() {
        for weight in [0., -1., f64::NAN, f64::INFINITY] {
            assert!(matches!(Flow::new(weight), Err(GpsError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn fifo_queue() {
        let mut flow = Flow::new(DEFAULT_FLOW_WEIGHT).unwrap();
        assert!(!flow.is_backlogged());
        assert!(flow.peek_head_of_line().is_err());
        assert!(flow.pop_head_of_line().is_err());

        flow.append_packet(handle(0, 100, 100.));
        flow.append_packet(handle(1, 50, 150.));
        assert!(flow.is_backlogged());
        assert_eq!(flow.len(), 2);
        assert_eq!(flow.last_vft(), 150.);
        assert_eq!(flow.backlog_bytes(), 150);

        assert_eq!(flow.peek_head_of_line().unwrap().seq, 0);
        assert_eq!(flow.pop_head_of_line().unwrap().seq, 0);
        assert_eq!(flow.backlog_bytes(), 50);
        assert_eq!(flow.pop_head_of_line().unwrap().seq, 1);
        assert!(flow.is_empty());
        assert_eq!(flow.last_vft(), 150.);
        assert_eq!(flow.pop_head_of_line(), Err(EmptyContainerError::new("flow")));
    }
}
