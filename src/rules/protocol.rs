// src/rules/protocol.rs

use crate::core::{NodeId, ReservationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a protocol instance created by a rule action.
///
/// The engine never runs these; the host's protocol layer does. Names follow
/// the memory-array convention so peers can refer to each other's halves.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolDescriptor {
    /// One half of heralded entanglement generation over a hop.
    Generation {
        name: String,
        reservation: ReservationId,
        /// Local memory being entangled.
        memory: String,
        /// Node at the other end of the hop.
        remote_node: NodeId,
        /// Bell-state-measurement node between the two routers.
        middle_node: NodeId,
    },
    /// Purification of a pair (`measured_memory` set) or one half still
    /// waiting for its peer to merge it into a pair.
    Purification {
        name: String,
        reservation: ReservationId,
        kept_memory: String,
        measured_memory: Option<String>,
    },
    /// Bell measurement over two local memories, joining their remote ends.
    SwapExecute {
        name: String,
        reservation: ReservationId,
        left_memory: String,
        right_memory: String,
        /// Carried unchanged to the protocol layer.
        success_prob: f64,
        /// Carried unchanged to the protocol layer.
        degradation: f64,
    },
    /// Waits for the outcome of a swap performed by the remote node and
    /// updates the local memory's remote identity.
    SwapAnnounce {
        name: String,
        reservation: ReservationId,
        memory: String,
    },
}

impl ProtocolDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ProtocolDescriptor::Generation { name, .. }
            | ProtocolDescriptor::Purification { name, .. }
            | ProtocolDescriptor::SwapExecute { name, .. }
            | ProtocolDescriptor::SwapAnnounce { name, .. } => name,
        }
    }

    pub fn reservation(&self) -> ReservationId {
        match self {
            ProtocolDescriptor::Generation { reservation, .. }
            | ProtocolDescriptor::Purification { reservation, .. }
            | ProtocolDescriptor::SwapExecute { reservation, .. }
            | ProtocolDescriptor::SwapAnnounce { reservation, .. } => *reservation,
        }
    }

    /// Local memories bound to the protocol.
    pub fn memories(&self) -> Vec<&str> {
        match self {
            ProtocolDescriptor::Generation { memory, .. } => vec![memory.as_str()],
            ProtocolDescriptor::Purification { kept_memory, measured_memory, .. } => {
                let mut memories = vec![kept_memory.as_str()];
                if let Some(measured) = measured_memory {
                    memories.push(measured.as_str());
                }
                memories
            }
            ProtocolDescriptor::SwapExecute { left_memory, right_memory, .. } => {
                vec![left_memory.as_str(), right_memory.as_str()]
            }
            ProtocolDescriptor::SwapAnnounce { memory, .. } => vec![memory.as_str()],
        }
    }
}

impl fmt::Display for ProtocolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.reservation())
    }
}

/// Correlation fields a peer uses to find the counterpart of a new protocol.
///
/// Sent instead of a matching closure; the peer evaluates it against its own
/// pending-protocol registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correlation {
    /// Find the generation half aimed back at `requester`.
    Generation { requester: NodeId },
    /// Merge the two single-memory purification halves on `kept_memory` and
    /// `measured_memory` into one operation.
    PurificationMerge { kept_memory: String, measured_memory: String },
    /// Find the swap-announce waiting on `target_memory`.
    Swap { target_memory: String },
}

/// A correlation addressed to a peer node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub destination: NodeId,
    pub reservation: ReservationId,
    pub correlation: Correlation,
}

/// What a fired rule produces: a local protocol plus the requests that pair
/// it with its counterparts on other nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub protocol: ProtocolDescriptor,
    pub requests: Vec<RemoteRequest>,
}

impl ActionOutcome {
    pub(crate) fn local(protocol: ProtocolDescriptor) -> Self {
        Self { protocol, requests: Vec::new() }
    }
}
