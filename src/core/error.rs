//! Identifiers and error handling logic

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name of a router on a reservation path.
/// Node names are unique within a topology and are the only thing a node
/// knows about its peers, so every cross-node correlation is keyed on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Borrows the node name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        NodeId(name.to_string())
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        NodeId(name)
    }
}

/// Identity of an approved reservation.
/// Shared by every rule and protocol created for the reservation on every node,
/// which is what lets a peer tell two concurrent reservations apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reservation({})", self.0)
    }
}

/// Failures raised while synthesizing rules for a reservation.
///
/// Both variants are fatal for the node being compiled: no rule of that node
/// is installed. Other nodes on the same path are compiled independently.
/// Resolver misses and stale reservations are not errors; they surface as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// Capacity, partition, reservation or configuration-file misconfiguration.
    #[error("Configuration Error: {message}")]
    Config {
        /// Config failure message
        message: String,
    },

    /// The swap-order policy cannot produce a partner pair for a node.
    #[error("Policy Error ({node}): {message}")]
    Policy {
        /// Node whose partner search failed
        node: NodeId,
        /// Policy failure message
        message: String,
    },
}

impl SynthesisError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SynthesisError::Config { message: message.into() }
    }

    pub(crate) fn policy(node: &NodeId, message: impl Into<String>) -> Self {
        SynthesisError::Policy { node: node.clone(), message: message.into() }
    }

    /// Returns `true` for [`SynthesisError::Config`].
    pub fn is_config(&self) -> bool {
        matches!(self, SynthesisError::Config { .. })
    }

    /// Returns `true` for [`SynthesisError::Policy`].
    pub fn is_policy(&self) -> bool {
        matches!(self, SynthesisError::Policy { .. })
    }
}
