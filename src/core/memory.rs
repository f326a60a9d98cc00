// src/core/memory.rs

use super::error::NodeId;
use std::fmt;

/// Lifecycle state of one memory slot as reported by the node's memory manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryState {
    /// Free and ready for entanglement generation.
    Raw,
    /// Held by a running protocol.
    Occupied,
    /// Holds one half of an entangled pair.
    Entangled,
}

impl fmt::Display for MemoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryState::Raw => write!(f, "RAW"),
            MemoryState::Occupied => write!(f, "OCCUPIED"),
            MemoryState::Entangled => write!(f, "ENTANGLED"),
        }
    }
}

/// Local view of one memory slot.
///
/// This is all a rule condition ever sees: the slot's own state and, once
/// entangled, who holds the other half and at what fidelity.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryInfo {
    /// Index of the slot in the node's memory array.
    pub index: usize,
    /// Globally unique memory name, e.g. `r1.MemoryArray[3]`.
    pub name: String,
    pub state: MemoryState,
    /// Node holding the other half of the pair (entangled slots only).
    pub remote_node: Option<NodeId>,
    /// Name of the remote memory holding the other half.
    pub remote_memory: Option<String>,
    pub fidelity: f64,
}

impl MemoryInfo {
    /// A free slot.
    pub fn raw(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            state: MemoryState::Raw,
            remote_node: None,
            remote_memory: None,
            fidelity: 0.0,
        }
    }

    /// A slot entangled with `remote_memory` on `remote_node`.
    pub fn entangled(
        index: usize,
        name: impl Into<String>,
        remote_node: NodeId,
        remote_memory: impl Into<String>,
        fidelity: f64,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            state: MemoryState::Entangled,
            remote_node: Some(remote_node),
            remote_memory: Some(remote_memory.into()),
            fidelity,
        }
    }

    pub fn is_raw(&self) -> bool {
        self.state == MemoryState::Raw
    }

    pub fn is_entangled(&self) -> bool {
        self.state == MemoryState::Entangled
    }

    /// `true` if this slot is entangled with a memory on `node`.
    pub fn is_entangled_with(&self, node: &NodeId) -> bool {
        self.is_entangled() && self.remote_node.as_ref() == Some(node)
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.remote_node, &self.remote_memory) {
            (Some(node), Some(memory)) => write!(
                f,
                "{}#{} {} <-> {}:{} (F={:.4})",
                self.name, self.index, self.state, node, memory, self.fidelity
            ),
            _ => write!(f, "{}#{} {}", self.name, self.index, self.state),
        }
    }
}

/// Name of slot `index` in `array_name`, matching the memory-array convention.
pub fn memory_name(array_name: &str, index: usize) -> String {
    format!("{}[{}]", array_name, index)
}
