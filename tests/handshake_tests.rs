// tests/handshake_tests.rs

// Drives installed rules on a short path by hand: each node evaluates
// its own rules, keeps its own pending protocols, and only talks to the
// others through the remote requests its actions return.

use swaporder::{
    CapacityPolicy, Correlation, EngineConfig, MemoryInfo, NodeId, NodeInventory, PendingProtocols,
    ProtocolDescriptor, RemoteRequest, Reservation, ReservationId, RuleStore, SwapOrderEngine,
    SynthesisError,
};

use std::collections::HashMap;

const RES: ReservationId = ReservationId(42);

// Helper function to create NodeId for tests
fn nid(name: &str) -> NodeId {
    NodeId::from(name)
}

fn mem(node: &str, index: usize) -> String {
    format!("{}.MemoryArray[{}]", node, index)
}

struct Harness {
    store: RuleStore,
    pending: HashMap<NodeId, PendingProtocols>,
}

impl Harness {
    fn new(names: &[&str]) -> Result<Self, SynthesisError> {
        let reservation = Reservation::new(RES, names.iter().map(|n| nid(n)).collect(), 0, 1_000, 2, 0.9)?;
        let inventories: HashMap<NodeId, NodeInventory> = names
            .iter()
            .map(|n| (nid(n), NodeInventory::new(format!("{}.MemoryArray", n), 0..4)))
            .collect();
        let engine = SwapOrderEngine::new(EngineConfig::default().with_capacity(CapacityPolicy::Uniform { per_hop: 2 }));
        let compiled = engine.on_path_approved(&reservation, &inventories);
        assert!(compiled.is_complete());

        let mut store = RuleStore::new();
        compiled.install_into(&mut store);
        let pending = names.iter().map(|n| (nid(n), PendingProtocols::new())).collect();
        Ok(Self { store, pending })
    }

    /// Fires `node`'s rules on `memory`; registers the protocol locally and
    /// returns its requests.
    fn fire(&mut self, node: &str, memory: &MemoryInfo, manager: &[MemoryInfo]) -> (String, Vec<RemoteRequest>) {
        let firing = self.store.evaluate(&nid(node), memory, manager).expect("a rule fires");
        let name = firing.outcome.protocol.name().to_string();
        self.pending.get_mut(&nid(node)).expect("node").push(firing.outcome.protocol);
        (name, firing.outcome.requests)
    }

    fn evaluate(&self, node: &str, memory: &MemoryInfo, manager: &[MemoryInfo]) -> Option<String> {
        self.store
            .evaluate(&nid(node), memory, manager)
            .map(|firing| firing.outcome.protocol.name().to_string())
    }

    fn deliver(&mut self, request: &RemoteRequest) -> Option<ProtocolDescriptor> {
        self.pending.get_mut(&request.destination)?.resolve(request)
    }
}

#[test]
fn test_generation_pairs_through_requester_name() -> Result<(), SynthesisError> {
    let mut h = Harness::new(&["A", "B", "C"])?;
    let a_view = vec![MemoryInfo::raw(0, mem("A", 0))];
    let (name, requests) = h.fire("A", &a_view[0], &a_view);
    assert_eq!(name, "EGA.A.MemoryArray[0]");
    assert_eq!(requests.len(), 1);

    // B has not fired yet: the request finds nothing.
    assert!(h.deliver(&requests[0]).is_none());

    let b_view = vec![MemoryInfo::raw(0, mem("B", 0))];
    let (b_name, b_requests) = h.fire("B", &b_view[0], &b_view);
    assert_eq!(b_name, "EGA.B.MemoryArray[0]");
    assert!(b_requests.is_empty());

    match h.deliver(&requests[0]) {
        Some(ProtocolDescriptor::Generation { name, remote_node, middle_node, .. }) => {
            assert_eq!(name, b_name);
            assert_eq!(remote_node, nid("A"));
            assert_eq!(middle_node, nid("BSM.A.B"));
        }
        other => panic!("unexpected match {:?}", other),
    }
    Ok(())
}

#[test]
fn test_purification_merges_peer_halves() -> Result<(), SynthesisError> {
    let mut h = Harness::new(&["A", "B", "C"])?;
    let a_view = vec![
        MemoryInfo::entangled(0, mem("A", 0), nid("B"), mem("B", 0), 0.7),
        MemoryInfo::entangled(1, mem("A", 1), nid("B"), mem("B", 1), 0.7),
    ];
    let (first, _) = h.fire("A", &a_view[0], &a_view);
    let (second, _) = h.fire("A", &a_view[1], &a_view);
    assert_eq!((first.as_str(), second.as_str()), ("EP.A.MemoryArray[0]", "EP.A.MemoryArray[1]"));

    let b_view = vec![
        MemoryInfo::entangled(0, mem("B", 0), nid("A"), mem("A", 0), 0.7),
        MemoryInfo::entangled(1, mem("B", 1), nid("A"), mem("A", 1), 0.7),
    ];
    let (b_name, requests) = h.fire("B", &b_view[0], &b_view);
    assert_eq!(b_name, "EP.B.MemoryArray[0].B.MemoryArray[1]");

    let merged = h.deliver(&requests[0]).expect("both halves pending");
    assert_eq!(merged.name(), "EP.A.MemoryArray[0].A.MemoryArray[1]");
    assert_eq!(merged.memories(), vec![mem("A", 0).as_str(), mem("A", 1).as_str()]);
    assert!(h.pending[&nid("A")].is_empty());
    Ok(())
}

#[test]
fn test_swap_reaches_both_endpoints() -> Result<(), SynthesisError> {
    let mut h = Harness::new(&["A", "B", "C"])?;
    let a_view = vec![MemoryInfo::entangled(0, mem("A", 0), nid("B"), mem("B", 0), 0.95)];
    let c_view = vec![MemoryInfo::entangled(0, mem("C", 0), nid("B"), mem("B", 2), 0.95)];
    let (a_name, _) = h.fire("A", &a_view[0], &a_view);
    let (c_name, _) = h.fire("C", &c_view[0], &c_view);
    assert_eq!(a_name, "ESB.A.MemoryArray[0]");
    assert_eq!(c_name, "ESB.C.MemoryArray[0]");

    let b_view = vec![
        MemoryInfo::entangled(0, mem("B", 0), nid("A"), mem("A", 0), 0.95),
        MemoryInfo::raw(1, mem("B", 1)),
        MemoryInfo::entangled(2, mem("B", 2), nid("C"), mem("C", 0), 0.95),
    ];
    // Triggered by the right-hand slot; the protocol still lists left first.
    let (b_name, requests) = h.fire("B", &b_view[2], &b_view);
    assert_eq!(b_name, "ESA.B.MemoryArray[0].B.MemoryArray[2]");

    let destinations: Vec<&str> = requests.iter().map(|r| r.destination.as_str()).collect();
    assert_eq!(destinations, vec!["A", "C"]);
    for request in &requests {
        let matched = h.deliver(request).expect("announce pending");
        assert!(matches!(matched, ProtocolDescriptor::SwapAnnounce { .. }));
    }
    Ok(())
}

#[test]
fn test_interior_passthrough_announces_to_the_inner_swap() -> Result<(), SynthesisError> {
    // Left to right on four nodes: b swaps (a, c), then c swaps (a, d).
    let mut h = Harness::new(&["a", "b", "c", "d"])?;

    let c_view = vec![
        MemoryInfo::entangled(0, mem("c", 0), nid("b"), mem("b", 2), 0.95),
        MemoryInfo::raw(1, mem("c", 1)),
    ];
    let (c_name, c_requests) = h.fire("c", &c_view[0], &c_view);
    assert_eq!(c_name, "ESB.c.MemoryArray[0]");
    assert!(c_requests.is_empty());

    let b_view = vec![
        MemoryInfo::entangled(0, mem("b", 0), nid("a"), mem("a", 0), 0.95),
        MemoryInfo::entangled(2, mem("b", 2), nid("c"), mem("c", 0), 0.95),
    ];
    let (b_name, requests) = h.fire("b", &b_view[0], &b_view);
    assert_eq!(b_name, "ESA.b.MemoryArray[0].b.MemoryArray[2]");
    let to_c = requests.iter().find(|r| r.destination == nid("c")).expect("request to c");
    match h.deliver(to_c) {
        Some(ProtocolDescriptor::SwapAnnounce { name, memory, .. }) => {
            assert_eq!(name, c_name);
            assert_eq!(memory, mem("c", 0));
        }
        other => panic!("unexpected match {:?}", other),
    }

    // Slots toward c's own partners are left for its swap rule.
    for partner in ["a", "d"] {
        let view = vec![MemoryInfo::entangled(2, mem("c", 2), nid(partner), mem(partner, 0), 0.95)];
        assert_eq!(h.evaluate("c", &view[0], &view), None, "slot toward {}", partner);
    }
    Ok(())
}

#[test]
fn test_torn_down_reservation_is_ignored() -> Result<(), SynthesisError> {
    let mut h = Harness::new(&["A", "B", "C"])?;
    let c_view = vec![MemoryInfo::entangled(0, mem("C", 0), nid("B"), mem("B", 2), 0.95)];
    h.fire("C", &c_view[0], &c_view);

    assert_eq!(h.store.expire(RES), 12);
    assert!(h.store.evaluate(&nid("C"), &c_view[0], &c_view).is_none());

    let pending = h.pending.get_mut(&nid("C")).expect("node");
    assert_eq!(pending.retire(RES, 1_000), 1);
    let late = RemoteRequest {
        destination: nid("C"),
        reservation: RES,
        correlation: Correlation::Swap { target_memory: mem("C", 0) },
    };
    assert!(h.deliver(&late).is_none());
    Ok(())
}

#[test]
fn test_remote_request_serializes_as_tagged_record() -> Result<(), serde_json::Error> {
    let request = RemoteRequest {
        destination: nid("A"),
        reservation: RES,
        correlation: Correlation::PurificationMerge {
            kept_memory: mem("A", 0),
            measured_memory: mem("A", 1),
        },
    };
    let json = serde_json::to_value(&request)?;
    assert_eq!(json["destination"], "A");
    assert_eq!(json["reservation"], 42);
    assert_eq!(json["correlation"]["kind"], "purification_merge");

    let back: RemoteRequest = serde_json::from_value(json)?;
    assert_eq!(back, request);
    Ok(())
}
