// src/lib.rs

//! `swaporder` - Swap-order rule synthesis for repeater chains
//!
//! When a reservation's path through a repeater network is approved, every
//! node on it needs a set of condition → action rules that drive
//! entanglement generation, purification and swapping until the two path
//! endpoints share one entangled pair. This crate compiles those rules for a
//! caller-chosen swap order (left-to-right, right-to-left or an explicit
//! priority list) from nothing but each node's position on the path, so the
//! nodes never need to agree on anything at run time.

pub mod core;
pub mod policy;
pub mod partition;
pub mod partners;
pub mod rules;
pub mod compiler;
pub mod resolver;
pub mod store;
pub mod config;
pub mod engine;

// Re-export the most common types for easier top-level use
pub use core::{MemoryInfo, MemoryState, NodeId, Reservation, ReservationId, SynthesisError};
pub use policy::SwapOrderPolicy;
pub use partition::{CapacityPolicy, MemoryIndexPartition, partition};
pub use partners::{Partners, SwapSchedule, SwapStep, select_partners};
pub use rules::{ActionOutcome, Correlation, ProtocolDescriptor, RemoteRequest, Rule, RuleKind};
pub use compiler::{NodeInventory, compile};
pub use resolver::{PendingProtocols, resolve};
pub use store::{Firing, RuleSink, RuleStore};
pub use config::EngineConfig;
pub use engine::{PathRules, SwapOrderEngine};

// Example 1: Three-node path
// The middle node swaps between the two endpoints; each endpoint only
// announces.
/// ```
/// use swaporder::{
///     CapacityPolicy, EngineConfig, NodeId, NodeInventory, Reservation, ReservationId,
///     RuleKind, RuleStore, SwapOrderEngine, SynthesisError,
/// };
/// use std::collections::HashMap;
///
/// fn nid(name: &str) -> NodeId { NodeId::from(name) }
///
/// let path = vec![nid("A"), nid("B"), nid("C")];
/// let reservation = Reservation::new(ReservationId(1), path.clone(), 0, 1_000, 2, 0.9)?;
/// let inventories: HashMap<NodeId, NodeInventory> = path
///     .iter()
///     .map(|n| (n.clone(), NodeInventory::new(format!("{}.MemoryArray", n), 0..4)))
///     .collect();
///
/// let engine = SwapOrderEngine::new(
///     EngineConfig::default().with_capacity(CapacityPolicy::Uniform { per_hop: 2 }),
/// );
/// let compiled = engine.on_path_approved(&reservation, &inventories);
/// assert!(compiled.is_complete());
///
/// let swaps: Vec<_> = compiled
///     .rules_for(&nid("B"))
///     .unwrap_or_default()
///     .iter()
///     .filter_map(|r| match r.kind() {
///         RuleKind::SwapExecute(args) => Some((args.left.clone(), args.right.clone())),
///         _ => None,
///     })
///     .collect();
/// assert_eq!(swaps, vec![(nid("A"), nid("C"))]);
///
/// let mut store = RuleStore::new();
/// let installed = compiled.install_into(&mut store);
/// assert_eq!(installed, store.len());
/// assert_eq!(store.rules_for(&nid("A")).len(), 3);
/// # Ok::<(), SynthesisError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Priority order
// The last node of the list closes the chain between the endpoints.
/// ```
/// use swaporder::{NodeId, Partners, SwapOrderPolicy, SwapSchedule, select_partners};
///
/// let path: Vec<NodeId> = ["Nodei", "r1", "r2", "r3", "Nodej"].into_iter().map(NodeId::from).collect();
/// let policy: SwapOrderPolicy = "r2, r1, r3".parse()?;
///
/// assert_eq!(
///     select_partners(&path, 3, &policy)?,
///     Partners::Swap { left: NodeId::from("Nodei"), right: NodeId::from("Nodej") },
/// );
/// let schedule = SwapSchedule::plan(&path, &policy)?;
/// println!("{}", schedule);
/// assert_eq!(schedule.rounds(), 3);
/// # Ok::<(), swaporder::SynthesisError>(())
/// ```
#[doc(hidden)]
const _: () = ();
