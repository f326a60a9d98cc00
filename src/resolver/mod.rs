// src/resolver/mod.rs

//! Peer-side matching of remote requests.
//!
//! When a rule action on one node creates a protocol half, it sends a
//! [`RemoteRequest`] to the peer. The peer matches the request's correlation
//! fields against the protocol halves it created itself and has not yet
//! paired. A miss is normal: the peer may simply not have fired its own rule
//! yet, and the host retries on the next relevant state change.

use crate::core::ReservationId;
use crate::rules::{Correlation, ProtocolDescriptor, RemoteRequest};
use std::collections::HashMap;
use tracing::debug;

/// Matches `correlation` against `pending` and takes the match out of it.
///
/// Matching is exact equality on the correlation fields and `reservation`.
/// For [`Correlation::PurificationMerge`] the two single-memory halves are
/// merged in place: the `measured_memory` half is removed and its memory is
/// spliced into the `kept_memory` half, which is then returned. Nothing is
/// modified unless both halves are present.
pub fn resolve(
    pending: &mut Vec<ProtocolDescriptor>,
    reservation: ReservationId,
    correlation: &Correlation,
) -> Option<ProtocolDescriptor> {
    match correlation {
        Correlation::Generation { requester } => {
            let index = pending.iter().position(|p| {
                matches!(p, ProtocolDescriptor::Generation { reservation: r, remote_node, .. }
                    if *r == reservation && remote_node == requester)
            })?;
            Some(pending.remove(index))
        }
        Correlation::Swap { target_memory } => {
            let index = pending.iter().position(|p| {
                matches!(p, ProtocolDescriptor::SwapAnnounce { reservation: r, memory, .. }
                    if *r == reservation && memory == target_memory)
            })?;
            Some(pending.remove(index))
        }
        Correlation::PurificationMerge { kept_memory, measured_memory } => {
            let half = |target: &str| {
                pending.iter().position(|p| {
                    matches!(p, ProtocolDescriptor::Purification { reservation: r, kept_memory: k, measured_memory: None, .. }
                        if *r == reservation && k == target)
                })
            };
            let kept_index = half(kept_memory.as_str())?;
            let measured_index = half(measured_memory.as_str())?;
            if kept_index == measured_index {
                return None;
            }

            // Remove the higher index first so the other stays valid.
            let (measured, mut kept) = if measured_index > kept_index {
                let measured = pending.remove(measured_index);
                (measured, pending.remove(kept_index))
            } else {
                let kept = pending.remove(kept_index);
                (pending.remove(measured_index), kept)
            };
            if let (
                ProtocolDescriptor::Purification { name, measured_memory: slot, .. },
                ProtocolDescriptor::Purification { kept_memory: consumed, .. },
            ) = (&mut kept, measured)
            {
                name.push('.');
                name.push_str(&consumed);
                *slot = Some(consumed);
            }
            Some(kept)
        }
    }
}

/// Protocol halves a node created and has not yet paired with a peer.
///
/// Owned by the node's single logical thread; every method takes `&mut self`
/// so no rule evaluation can interleave with a merge.
#[derive(Debug, Default)]
pub struct PendingProtocols {
    protocols: Vec<ProtocolDescriptor>,
    /// Reservations torn down on this node, with their end times.
    retired: HashMap<ReservationId, u64>,
}

impl PendingProtocols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a protocol created by a local rule action.
    ///
    /// Protocols of a retired reservation are dropped.
    pub fn push(&mut self, protocol: ProtocolDescriptor) {
        if self.retired.contains_key(&protocol.reservation()) {
            debug!(protocol = protocol.name(), "dropping protocol of torn-down reservation");
            return;
        }
        self.protocols.push(protocol);
    }

    /// Handles a request from a peer.
    ///
    /// Returns `None` both when no counterpart exists yet and when the
    /// request belongs to a reservation already torn down on this node.
    pub fn resolve(&mut self, request: &RemoteRequest) -> Option<ProtocolDescriptor> {
        if self.retired.contains_key(&request.reservation) {
            debug!(reservation = %request.reservation, "ignoring request for stale reservation");
            return None;
        }
        let matched = resolve(&mut self.protocols, request.reservation, &request.correlation);
        if matched.is_none() {
            debug!(reservation = %request.reservation, correlation = ?request.correlation, "no pending counterpart");
        }
        matched
    }

    /// Tears down `reservation` on this node, dropping its pending halves.
    /// Returns the number of halves dropped.
    ///
    /// The id is remembered until [`PendingProtocols::prune_retired`] passes
    /// `end_time`, so late requests are told apart from early ones.
    pub fn retire(&mut self, reservation: ReservationId, end_time: u64) -> usize {
        self.retired.insert(reservation, end_time);
        let before = self.protocols.len();
        self.protocols.retain(|p| p.reservation() != reservation);
        before - self.protocols.len()
    }

    /// Forgets torn-down reservations whose end time is at or before `now`.
    /// Returns the number forgotten.
    pub fn prune_retired(&mut self, now: u64) -> usize {
        let before = self.retired.len();
        self.retired.retain(|_, end_time| *end_time > now);
        before - self.retired.len()
    }

    pub fn is_retired(&self, reservation: ReservationId) -> bool {
        self.retired.contains_key(&reservation)
    }

    pub fn protocols(&self) -> &[ProtocolDescriptor] {
        &self.protocols
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeId;

    const RES: ReservationId = ReservationId(9);

    fn single(memory: &str) -> ProtocolDescriptor {
        ProtocolDescriptor::Purification {
            name: format!("EP.{}", memory),
            reservation: RES,
            kept_memory: memory.to_string(),
            measured_memory: None,
        }
    }

    #[test]
    fn merge_splices_measured_half_into_kept_half() {
        let mut pending = vec![single("a[1]"), single("a[0]"), single("a[2]")];
        let merged = resolve(
            &mut pending,
            RES,
            &Correlation::PurificationMerge { kept_memory: "a[0]".into(), measured_memory: "a[1]".into() },
        );
        assert_eq!(
            merged,
            Some(ProtocolDescriptor::Purification {
                name: "EP.a[0].a[1]".into(),
                reservation: RES,
                kept_memory: "a[0]".into(),
                measured_memory: Some("a[1]".into()),
            })
        );
        assert_eq!(pending, vec![single("a[2]")]);
    }

    #[test]
    fn merge_with_one_half_missing_changes_nothing() {
        let mut pending = vec![single("a[0]")];
        let merged = resolve(
            &mut pending,
            RES,
            &Correlation::PurificationMerge { kept_memory: "a[0]".into(), measured_memory: "a[1]".into() },
        );
        assert!(merged.is_none());
        assert_eq!(pending, vec![single("a[0]")]);
    }

    #[test]
    fn generation_matches_on_requester_and_reservation() {
        let half = |reservation| ProtocolDescriptor::Generation {
            name: "EGA.c[0]".into(),
            reservation,
            memory: "c[0]".into(),
            remote_node: NodeId::from("b"),
            middle_node: NodeId::from("BSM.b.c"),
        };
        let mut pending = vec![half(ReservationId(1)), half(RES)];
        let correlation = Correlation::Generation { requester: NodeId::from("b") };
        let found = resolve(&mut pending, RES, &correlation).expect("counterpart");
        assert_eq!(found.reservation(), RES);
        assert_eq!(pending.len(), 1);
        assert!(resolve(&mut pending, RES, &correlation).is_none());
    }

    #[test]
    fn retired_reservation_requests_are_ignored() {
        let mut registry = PendingProtocols::new();
        registry.push(ProtocolDescriptor::SwapAnnounce {
            name: "ESB.a[0]".into(),
            reservation: RES,
            memory: "a[0]".into(),
        });
        assert_eq!(registry.retire(RES, 500), 1);
        let request = RemoteRequest {
            destination: NodeId::from("a"),
            reservation: RES,
            correlation: Correlation::Swap { target_memory: "a[0]".into() },
        };
        assert!(registry.resolve(&request).is_none());

        registry.push(single("a[3]"));
        assert!(registry.is_empty());
    }

    #[test]
    fn retired_ids_are_pruned_after_their_end_time() {
        let mut registry = PendingProtocols::new();
        registry.retire(RES, 500);
        registry.retire(ReservationId(10), 900);

        assert_eq!(registry.prune_retired(499), 0);
        assert!(registry.is_retired(RES));
        assert_eq!(registry.prune_retired(500), 1);
        assert!(!registry.is_retired(RES));
        assert!(registry.is_retired(ReservationId(10)));

        // Once forgotten, a late half is kept like any other.
        registry.push(single("a[0]"));
        assert_eq!(registry.len(), 1);
    }
}
