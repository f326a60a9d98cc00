// src/core/reservation.rs

use super::error::{NodeId, ReservationId, SynthesisError};
use std::collections::HashSet;
use std::fmt;

/// An approved end-to-end reservation.
///
/// Created by the admission layer once every node on the path has accepted
/// the request, and immutable from then on. Rules refer to it by
/// [`ReservationId`] only.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    id: ReservationId,
    /// Ordered route, initiator first and responder last.
    path: Vec<NodeId>,
    /// Start of the reservation window (simulation picoseconds).
    start_time: u64,
    /// End of the reservation window; rules are torn down here.
    end_time: u64,
    /// Number of memory slots requested per hop.
    memory_size: usize,
    /// Fidelity below which pairs are purified and above which they may be swapped.
    target_fidelity: f64,
}

impl Reservation {
    /// Builds a reservation over `path`, validating the route and window.
    ///
    /// # Errors
    /// Returns `SynthesisError::Config` if the path has fewer than two nodes or
    /// repeats a node, if the window is empty, if `memory_size` is zero, or if
    /// `target_fidelity` lies outside `[0, 1]`.
    pub fn new(
        id: ReservationId,
        path: Vec<NodeId>,
        start_time: u64,
        end_time: u64,
        memory_size: usize,
        target_fidelity: f64,
    ) -> Result<Self, SynthesisError> {
        if path.len() < 2 {
            return Err(SynthesisError::config(format!(
                "{} path needs at least two nodes, got {}", id, path.len()
            )));
        }
        let mut seen = HashSet::with_capacity(path.len());
        for node in &path {
            if !seen.insert(node) {
                return Err(SynthesisError::config(format!("{} path visits {} twice", id, node)));
            }
        }
        if start_time >= end_time {
            return Err(SynthesisError::config(format!(
                "{} window is empty: start {} >= end {}", id, start_time, end_time
            )));
        }
        if memory_size == 0 {
            return Err(SynthesisError::config(format!("{} requests zero memories", id)));
        }
        if !(0.0..=1.0).contains(&target_fidelity) {
            return Err(SynthesisError::config(format!(
                "{} target fidelity {} outside [0, 1]", id, target_fidelity
            )));
        }
        Ok(Self { id, path, start_time, end_time, memory_size, target_fidelity })
    }

    pub fn id(&self) -> ReservationId {
        self.id
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// First node of the path.
    pub fn initiator(&self) -> &NodeId {
        &self.path[0]
    }

    /// Last node of the path.
    pub fn responder(&self) -> &NodeId {
        &self.path[self.path.len() - 1]
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn target_fidelity(&self) -> f64 {
        self.target_fidelity
    }

    /// Position of `node` on the path, if it is on it.
    pub fn position_of(&self, node: &NodeId) -> Option<usize> {
        self.path.iter().position(|n| n == node)
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.id)?;
        for (i, node) in self.path.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { " -> " } else { "" }, node)?;
        }
        write!(
            f,
            "] t=[{}, {}) memories={} fidelity>={}",
            self.start_time, self.end_time, self.memory_size, self.target_fidelity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId::from(*n)).collect()
    }

    #[test]
    fn endpoints_come_from_path() -> Result<(), SynthesisError> {
        let r = Reservation::new(ReservationId(1), path(&["a", "b", "c"]), 0, 10, 1, 0.9)?;
        assert_eq!(r.initiator(), &NodeId::from("a"));
        assert_eq!(r.responder(), &NodeId::from("c"));
        assert_eq!(r.position_of(&NodeId::from("b")), Some(1));
        assert_eq!(r.position_of(&NodeId::from("z")), None);
        Ok(())
    }

    #[test]
    fn rejects_bad_reservations() {
        let id = ReservationId(7);
        assert!(Reservation::new(id, path(&["a"]), 0, 10, 1, 0.9).is_err());
        assert!(Reservation::new(id, path(&["a", "b", "a"]), 0, 10, 1, 0.9).is_err());
        assert!(Reservation::new(id, path(&["a", "b"]), 10, 10, 1, 0.9).is_err());
        assert!(Reservation::new(id, path(&["a", "b"]), 0, 10, 0, 0.9).is_err());
        assert!(Reservation::new(id, path(&["a", "b"]), 0, 10, 1, 1.5).is_err());
    }
}
