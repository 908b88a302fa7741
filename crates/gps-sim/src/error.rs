//! Errors reported by the GPS engine.

use thiserror::Error;

use crate::heap::EmptyContainerError;
use crate::packet::FlowId;

/// Error returned by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GpsError {
    /// Packet refers to a flow which is not configured.
    #[error("packet {packet_id} refers to unknown flow {flow_id} (configured flows: 1..={flow_count})")]
    UnknownFlow {
        /// Flow id of the rejected packet.
        flow_id: FlowId,
        /// Id of the rejected packet.
        packet_id: u64,
        /// Number of configured flows.
        flow_count: usize,
    },
    /// Peek or pop on an empty heap, queue or flow.
    #[error(transparent)]
    EmptyContainer(#[from] EmptyContainerError),
    /// Engine can not be created with the given flow setup.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Wakeup was processed while no departure is scheduled.
    #[error("no pending departure at real time {0}")]
    NoPendingDeparture(u64),
    /// Wakeup was processed at a time other than the scheduled one.
    #[error("wakeup at real time {actual} does not match scheduled wakeup at {expected}")]
    WakeupMismatch {
        /// Scheduled wakeup time.
        expected: u64,
        /// Time passed by the caller.
        actual: u64,
    },
    /// Simulation packets were already fed to the engine.
    #[error("simulation has already been run")]
    AlreadyRun,
}

impl GpsError {
    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
