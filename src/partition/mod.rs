// src/partition/mod.rs

//! Splits a node's reserved memory slots between its left and right hops.
//!
//! A node on a path holds entanglement toward at most two neighbours. Each hop
//! gets its own slice of the node's memory array so that generation on one
//! hop can never starve the other.

use crate::core::{Reservation, SynthesisError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How many slots each hop receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Every hop gets the same number of slots at both of its ends.
    Uniform {
        /// Slots per hop.
        per_hop: usize,
    },
    /// Position-indexed weight table. `weights[i]` slots are taken from the
    /// front of the inventory for position `i`'s left hop (the initiator's
    /// only hop is its right one); an interior node's right hop takes every
    /// remaining slot.
    Weighted(Vec<usize>),
    /// Position-indexed capacity list, one entry per path node. Entry `i` is
    /// the capacity of the hop ending at position `i`; a node's right hop
    /// uses entry `i + 1`, so both ends of a hop reserve the same count.
    /// Entry 0 has no hop ending at the initiator and is ignored.
    Explicit(Vec<usize>),
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        CapacityPolicy::Uniform { per_hop: 1 }
    }
}

impl CapacityPolicy {
    /// Uniform split using the reservation's requested memory size.
    pub fn from_reservation(reservation: &Reservation) -> Self {
        CapacityPolicy::Uniform { per_hop: reservation.memory_size() }
    }
}

/// Slots a node dedicates to each of its hops.
///
/// Invariant: `left` and `right` are disjoint and both are drawn from the
/// node's own inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryIndexPartition {
    left: Vec<usize>,
    right: Vec<usize>,
}

impl MemoryIndexPartition {
    /// Slots used toward the previous node on the path. Empty at the initiator.
    pub fn left(&self) -> &[usize] {
        &self.left
    }

    /// Slots used toward the next node on the path. Empty at the responder.
    pub fn right(&self) -> &[usize] {
        &self.right
    }

    /// Every partitioned slot, left hop first.
    pub fn all(&self) -> Vec<usize> {
        self.left.iter().chain(self.right.iter()).copied().collect()
    }

    /// Total number of partitioned slots.
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

impl fmt::Display for MemoryIndexPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "left={:?} right={:?}", self.left, self.right)
    }
}

/// Partitions `slots` (the node's reserved indices, in allocation order) for
/// the node at `own_position` on a path of `path_length` nodes.
///
/// # Errors
/// Returns `SynthesisError::Config` if the position is off the path, the
/// inventory repeats an index, a hop would receive zero slots, the policy
/// asks for more slots than the inventory holds, or a position table does
/// not cover the path.
pub fn partition(
    path_length: usize,
    own_position: usize,
    slots: &[usize],
    policy: &CapacityPolicy,
) -> Result<MemoryIndexPartition, SynthesisError> {
    if path_length < 2 {
        return Err(SynthesisError::config(format!("cannot partition memories on a path of {} node(s)", path_length)));
    }
    if own_position >= path_length {
        return Err(SynthesisError::config(format!(
            "position {} is outside a path of {} nodes", own_position, path_length
        )));
    }
    let mut seen = HashSet::with_capacity(slots.len());
    if let Some(dup) = slots.iter().find(|s| !seen.insert(**s)) {
        return Err(SynthesisError::config(format!("memory slot {} listed twice in inventory", dup)));
    }

    let last = path_length - 1;
    // (left hop count, right hop count); `None` for the right hop means "the rest".
    let (left_count, right_count): (usize, Option<usize>) = match policy {
        CapacityPolicy::Uniform { per_hop } => match own_position {
            0 => (0, Some(*per_hop)),
            p if p == last => (*per_hop, Some(0)),
            _ => (*per_hop, Some(*per_hop)),
        },
        CapacityPolicy::Weighted(weights) => {
            let weight = *weights.get(own_position).ok_or_else(|| {
                SynthesisError::config(format!("weight table has no entry for position {}", own_position))
            })?;
            match own_position {
                0 => (0, Some(weight)),
                p if p == last => (weight, Some(0)),
                _ => (weight, None),
            }
        }
        CapacityPolicy::Explicit(capacities) => {
            if capacities.len() != path_length {
                return Err(SynthesisError::config(format!(
                    "capacity list has {} entries for a path of {} nodes", capacities.len(), path_length
                )));
            }
            match own_position {
                0 => (0, Some(capacities[1])),
                p if p == last => (capacities[p], Some(0)),
                p => (capacities[p], Some(capacities[p + 1])),
            }
        }
    };

    if own_position > 0 && left_count == 0 {
        return Err(SynthesisError::config(format!("position {} left hop would get no memories", own_position)));
    }
    if left_count > slots.len() {
        return Err(SynthesisError::config(format!(
            "position {} requests {} memories but only {} are available", own_position, left_count, slots.len()
        )));
    }
    let (left, rest) = slots.split_at(left_count);

    let right: &[usize] = match right_count {
        Some(n) if n > rest.len() => {
            return Err(SynthesisError::config(format!(
                "position {} requests {} memories but only {} are available",
                own_position,
                left_count + n,
                slots.len()
            )));
        }
        Some(n) => &rest[..n],
        None => rest,
    };
    if own_position < last && right.is_empty() {
        return Err(SynthesisError::config(format!("position {} right hop would get no memories", own_position)));
    }

    Ok(MemoryIndexPartition { left: left.to_vec(), right: right.to_vec() })
}
