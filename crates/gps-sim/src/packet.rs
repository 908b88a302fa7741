//! Packet definition.

use serde::Serialize;

/// Flow identifier, starts from 1.
pub type FlowId = usize;

/// Packet of a traffic flow.
///
/// Packets are created and owned by the caller. The engine only fills in the bound flow and
/// the virtual finish time when the packet arrives.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    /// Flow the packet belongs to.
    pub flow_id: FlowId,
    /// Caller-assigned id, not required to be unique.
    pub packet_id: u64,
    /// Size in bytes.
    pub length: u64,
    /// Real arrival time.
    pub arrival_time: u64,
    #[serde(skip)]
    bound_flow: Option<FlowId>,
    #[serde(skip)]
    virtual_finish_time: Option<f64>,
}

impl Packet {
    /// Creates packet which is not yet bound to a flow.
    pub fn new(flow_id: FlowId, packet_id: u64, length: u64, arrival_time: u64) -> Self {
        Self {
            flow_id,
            packet_id,
            length,
            arrival_time,
            bound_flow: None,
            virtual_finish_time: None,
        }
    }

    /// Returns the flow the packet was bound to on arrival.
    pub fn bound_flow(&self) -> Option<FlowId> {
        self.bound_flow
    }

    /// Returns the GPS virtual finish time, if the packet has arrived.
    pub fn virtual_finish_time(&self) -> Option<f64> {
        self.virtual_finish_time
    }

    pub(crate) fn bind(&mut self, flow: FlowId, virtual_finish_time: f64) {
        debug_assert!(self.bound_flow.is_none(), "packet {} is bound twice", self.packet_id);
        self.bound_flow = Some(flow);
        self.virtual_finish_time = Some(virtual_finish_time);
    }
}

/// Engine-side reference to an arrived packet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketHandle {
    /// Arrival sequence number assigned by the engine.
    pub seq: u64,
    /// Id of the packet.
    pub packet_id: u64,
    /// Flow of the packet.
    pub flow_id: FlowId,
    /// Size in bytes.
    pub length: u64,
    /// GPS virtual finish time.
    pub virtual_finish_time: f64,
}

impl PacketHandle {
    /// Heap ordering: larger finish time is worse, ties are resolved by arrival order.
    pub fn is_worse(&self, other: &Self) -> bool {
        self.virtual_finish_time
            .total_cmp(&other.virtual_finish_time)
            .then(self.seq.cmp(&other.seq))
            .is_gt()
    }
}
