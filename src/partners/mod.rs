// src/partners/mod.rs

//! Partner selection: which two logical neighbours an interior node swaps between.
//!
//! Every node runs this locally and independently. The schedule only works
//! because the function is pure: all nodes of a path see the same path and
//! policy, so they agree on the whole swap tree without exchanging a message.

mod schedule;

pub use schedule::{SwapSchedule, SwapStep};

use crate::core::{NodeId, SynthesisError};
use crate::policy::SwapOrderPolicy;
use std::collections::HashSet;
use std::fmt;

/// Outcome of partner selection for one position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Partners {
    /// Path endpoint. It never swaps; it only announces to whoever swaps it
    /// toward the opposite end.
    Endpoint,
    /// Interior node swapping a link toward `left` with a link toward `right`.
    Swap {
        left: NodeId,
        right: NodeId,
    },
}

impl Partners {
    /// `(left, right)` for an interior node, `None` for an endpoint.
    pub fn pair(&self) -> Option<(&NodeId, &NodeId)> {
        match self {
            Partners::Endpoint => None,
            Partners::Swap { left, right } => Some((left, right)),
        }
    }
}

impl fmt::Display for Partners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partners::Endpoint => write!(f, "endpoint"),
            Partners::Swap { left, right } => write!(f, "swap({} <-> {})", left, right),
        }
    }
}

/// Selects the swap partners of the node at `own_position`.
///
/// # Errors
/// * `SynthesisError::Config` if `own_position` is not on the path.
/// * `SynthesisError::Policy` if a priority list does not order the path's
///   interior nodes, or a partner scan runs off the path.
pub fn select_partners(
    path: &[NodeId],
    own_position: usize,
    policy: &SwapOrderPolicy,
) -> Result<Partners, SynthesisError> {
    if own_position >= path.len() {
        return Err(SynthesisError::config(format!(
            "position {} is outside a path of {} nodes", own_position, path.len()
        )));
    }
    if own_position == 0 || own_position == path.len() - 1 {
        return Ok(Partners::Endpoint);
    }

    let (left, right) = match policy {
        SwapOrderPolicy::LeftToRight => reduce_left_to_right(path.len(), own_position),
        SwapOrderPolicy::RightToLeft => reduce_right_to_left(path.len(), own_position),
        SwapOrderPolicy::Priority(order) => {
            policy.validate(path)?;
            scan_priority(path, own_position, order)?
        }
    };
    Ok(Partners::Swap { left: path[left].clone(), right: path[right].clone() })
}

/// Binary path reduction, initiator side first.
///
/// Odd positions swap their immediate neighbours. Even positions drop every
/// odd position (keeping the responder) and retry on the sparser path, so the
/// swap tree closes from left to right. Returns partner positions.
fn reduce_left_to_right(len: usize, position: usize) -> (usize, usize) {
    let mut nodes: Vec<usize> = (0..len).collect();
    let mut index = position;
    while index % 2 == 0 && nodes.len() > 3 {
        let last = nodes.len() - 1;
        nodes = nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0 || *i == last)
            .map(|(_, n)| *n)
            .collect();
        // Even entries survive in order, so the node moves to half its index.
        index /= 2;
    }
    (nodes[index - 1], nodes[index + 1])
}

/// Mirror image of [`reduce_left_to_right`]: reduce the reversed path and
/// swap the sides back.
fn reduce_right_to_left(len: usize, position: usize) -> (usize, usize) {
    let mirror = |p: usize| len - 1 - p;
    let (left, right) = reduce_left_to_right(len, mirror(position));
    (mirror(right), mirror(left))
}

/// Priority-list search: nearest node on each side that does not swap
/// before this one. The last node of the order closes the chain between the
/// two path endpoints.
fn scan_priority(
    path: &[NodeId],
    position: usize,
    order: &[NodeId],
) -> Result<(usize, usize), SynthesisError> {
    let own = &path[position];
    let rank = order
        .iter()
        .position(|n| n == own)
        .ok_or_else(|| SynthesisError::policy(own, "node does not appear in swap order"))?;
    if rank == order.len() - 1 {
        return Ok((0, path.len() - 1));
    }

    let earlier: HashSet<&NodeId> = order[..rank].iter().collect();
    let left = (0..position)
        .rev()
        .find(|&i| !earlier.contains(&path[i]))
        .ok_or_else(|| SynthesisError::policy(own, "no unswapped node to the left"))?;
    let right = (position + 1..path.len())
        .find(|&i| !earlier.contains(&path[i]))
        .ok_or_else(|| SynthesisError::policy(own, "no unswapped node to the right"))?;
    Ok((left, right))
}
