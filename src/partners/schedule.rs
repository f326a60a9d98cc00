// src/partners/schedule.rs

use super::{Partners, select_partners};
use crate::core::{NodeId, SynthesisError};
use crate::policy::SwapOrderPolicy;
use std::collections::BTreeSet;
use std::fmt;

/// One swap in a replayed schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    /// Round in which the swap becomes possible (0-based). Swaps of the same
    /// round touch disjoint links and may run concurrently.
    pub round: usize,
    /// Swapping node.
    pub node: NodeId,
    /// Node at the far end of the consumed left link.
    pub left: NodeId,
    /// Node at the far end of the consumed right link.
    pub right: NodeId,
}

/// The order in which a policy merges hop links into one end-to-end link.
///
/// Built by replaying every interior node's partner selection over the
/// elementary links of the path, the same way the installed swap rules would
/// fire if every hop were entangled at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSchedule {
    path: Vec<NodeId>,
    steps: Vec<SwapStep>,
}

impl SwapSchedule {
    /// Replays `policy` on `path`.
    ///
    /// # Errors
    /// * Any error from [`select_partners`].
    /// * `SynthesisError::Policy` if two nodes consume the same link, if some
    ///   node never sees both of its links, or if the replay does not end in
    ///   the single end-to-end link.
    pub fn plan(path: &[NodeId], policy: &SwapOrderPolicy) -> Result<Self, SynthesisError> {
        if path.len() < 2 {
            return Err(SynthesisError::config(format!("cannot schedule a path of {} node(s)", path.len())));
        }
        let last = path.len() - 1;

        // Pending swaps as position triples (node, left, right).
        let mut pending: Vec<(usize, usize, usize)> = Vec::with_capacity(last.saturating_sub(1));
        for position in 1..last {
            if let Partners::Swap { left, right } = select_partners(path, position, policy)? {
                let l = position_on(path, &left)?;
                let r = position_on(path, &right)?;
                pending.push((position, l, r));
            }
        }

        let mut links: BTreeSet<(usize, usize)> = (0..last).map(|i| (i, i + 1)).collect();
        let mut steps = Vec::with_capacity(pending.len());
        let mut round = 0;
        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|&(p, l, r)| links.contains(&(l, p)) && links.contains(&(p, r)));
            if ready.is_empty() {
                let (p, l, r) = waiting[0];
                return Err(SynthesisError::policy(
                    &path[p],
                    format!("swap between {} and {} never becomes possible", path[l], path[r]),
                ));
            }
            for (p, l, r) in ready {
                if !(links.remove(&(l, p)) && links.remove(&(p, r))) {
                    return Err(SynthesisError::policy(&path[p], "link already consumed by another swap in the same round"));
                }
                links.insert((l, r));
                steps.push(SwapStep {
                    round,
                    node: path[p].clone(),
                    left: path[l].clone(),
                    right: path[r].clone(),
                });
            }
            pending = waiting;
            round += 1;
        }

        if links.len() != 1 || !links.contains(&(0, last)) {
            return Err(SynthesisError::policy(
                &path[0],
                format!("schedule leaves {} link(s) instead of one end-to-end link", links.len()),
            ));
        }
        Ok(Self { path: path.to_vec(), steps })
    }

    /// Swaps in replay order.
    pub fn steps(&self) -> &[SwapStep] {
        &self.steps
    }

    /// Number of rounds (depth of the swap tree).
    pub fn rounds(&self) -> usize {
        self.steps.last().map_or(0, |s| s.round + 1)
    }

    /// Swapping nodes in replay order.
    pub fn order(&self) -> Vec<&NodeId> {
        self.steps.iter().map(|s| &s.node).collect()
    }

    /// The single link left after every swap: the path's two endpoints.
    pub fn final_link(&self) -> (&NodeId, &NodeId) {
        (&self.path[0], &self.path[self.path.len() - 1])
    }
}

fn position_on(path: &[NodeId], node: &NodeId) -> Result<usize, SynthesisError> {
    path.iter()
        .position(|n| n == node)
        .ok_or_else(|| SynthesisError::policy(node, "partner is not on the path"))
}

impl fmt::Display for SwapSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Swap schedule ({} swaps, {} rounds)", self.steps.len(), self.rounds())?;
        for step in &self.steps {
            writeln!(f, "  round {}: {} swaps {} <-> {}", step.round, step.node, step.left, step.right)?;
        }
        let (a, b) = self.final_link();
        writeln!(f, "  result: {} <-> {}", a, b)
    }
}
