// src/compiler/inventory.rs

use crate::core::{MemoryInfo, NodeId, memory_name};
use std::collections::HashMap;

/// What a node contributes to compilation: the slots of its memory array
/// reserved for the path, and the middle nodes toward its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInventory {
    array_name: String,
    /// Reserved slot indices in allocation order.
    slots: Vec<usize>,
    middle_nodes: HashMap<NodeId, NodeId>,
}

impl NodeInventory {
    pub fn new(array_name: impl Into<String>, slots: impl IntoIterator<Item = usize>) -> Self {
        Self {
            array_name: array_name.into(),
            slots: slots.into_iter().collect(),
            middle_nodes: HashMap::new(),
        }
    }

    /// Names the Bell-state-measurement node between this node and `neighbor`.
    pub fn with_middle_node(mut self, neighbor: impl Into<NodeId>, middle: impl Into<NodeId>) -> Self {
        self.middle_nodes.insert(neighbor.into(), middle.into());
        self
    }

    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// The configured middle node toward `neighbor`, or `BSM.<a>.<b>` with
    /// the two router names sorted so both ends derive the same name.
    pub fn middle_node(&self, own: &NodeId, neighbor: &NodeId) -> NodeId {
        if let Some(middle) = self.middle_nodes.get(neighbor) {
            return middle.clone();
        }
        let (a, b) = if own <= neighbor { (own, neighbor) } else { (neighbor, own) };
        NodeId(format!("BSM.{}.{}", a, b))
    }

    /// Name of slot `index` in this node's memory array.
    pub fn slot_name(&self, index: usize) -> String {
        memory_name(&self.array_name, index)
    }

    /// A fresh view of the reserved slots, all raw.
    pub fn raw_view(&self) -> Vec<MemoryInfo> {
        self.slots.iter().map(|&i| MemoryInfo::raw(i, self.slot_name(i))).collect()
    }
}
