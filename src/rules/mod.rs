// src/rules/mod.rs

//! Condition → action rules installed on each node of a reservation path.
//!
//! A rule is a tagged variant carrying its typed arguments. The condition is
//! evaluated against one memory slot that just changed state plus the node's
//! full memory view; the action turns the matched slots into a protocol
//! descriptor and the remote requests that pair it with its peer halves.

mod protocol;

pub use protocol::{ActionOutcome, Correlation, ProtocolDescriptor, RemoteRequest};

use crate::core::{FIDELITY_TOLERANCE, MemoryInfo, NodeId, ReservationId};
use std::fmt;
use tracing::trace;

/// Which of the node's hops a generation rule serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopSide {
    /// Hop toward the previous node. This end only creates its half.
    Left,
    /// Hop toward the next node. This end asks the neighbour to pair up.
    Right,
}

/// Arguments of an entanglement-generation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationArgs {
    /// Slots of this hop's partition.
    pub memory_indices: Vec<usize>,
    /// Node the rule is installed on.
    pub own: NodeId,
    /// Node at the other end of the hop.
    pub neighbor: NodeId,
    pub middle_node: NodeId,
    pub side: HopSide,
}

/// The two purification shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurificationMode {
    /// Two local slots toward the same remote node with equal fidelity are
    /// purified together; the peer is asked to merge its two halves.
    Pair,
    /// One slot below target becomes a half waiting for the peer's merge.
    Single,
}

/// Arguments of a purification rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PurificationArgs {
    pub memory_indices: Vec<usize>,
    /// Pairs strictly below this fidelity are purified.
    pub target_fidelity: f64,
    pub mode: PurificationMode,
}

/// Arguments of the swap-execution rule of an interior node.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapExecuteArgs {
    pub memory_indices: Vec<usize>,
    pub left: NodeId,
    pub right: NodeId,
    /// Both pairs must be at or above this fidelity.
    pub target_fidelity: f64,
    pub success_prob: f64,
    pub degradation: f64,
}

/// Arguments of a pass-through (swap-announce) rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughArgs {
    pub memory_indices: Vec<usize>,
    /// Remote nodes this rule must not react to: the opposite path end at an
    /// endpoint, the node's own swap partners at an interior node.
    pub excluded: Vec<NodeId>,
    pub target_fidelity: f64,
}

/// The kind of a rule together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Generation(GenerationArgs),
    Purification(PurificationArgs),
    SwapExecute(SwapExecuteArgs),
    SwapPassthrough(PassthroughArgs),
}

impl RuleKind {
    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Generation(_) => "generation",
            RuleKind::Purification(args) => match args.mode {
                PurificationMode::Pair => "purification-pair",
                PurificationMode::Single => "purification-single",
            },
            RuleKind::SwapExecute(_) => "swap-execute",
            RuleKind::SwapPassthrough(_) => "swap-passthrough",
        }
    }

    /// Memory slots the rule may match.
    pub fn memory_indices(&self) -> &[usize] {
        match self {
            RuleKind::Generation(a) => &a.memory_indices,
            RuleKind::Purification(a) => &a.memory_indices,
            RuleKind::SwapExecute(a) => &a.memory_indices,
            RuleKind::SwapPassthrough(a) => &a.memory_indices,
        }
    }
}

/// A rule bound to one reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    priority: u32,
    reservation: ReservationId,
    kind: RuleKind,
}

impl Rule {
    pub fn new(priority: u32, reservation: ReservationId, kind: RuleKind) -> Self {
        Self { priority, reservation, kind }
    }

    /// Lower values are evaluated first.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn reservation(&self) -> ReservationId {
        self.reservation
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Matches `memory`, the slot whose state just changed, against the rule.
    ///
    /// Returns the indices of the matched slots, trigger slot first, or an
    /// empty list. `manager` is the node's whole memory view and is only read,
    /// so evaluating twice on the same state gives the same answer.
    pub fn condition(&self, memory: &MemoryInfo, manager: &[MemoryInfo]) -> Vec<usize> {
        let in_partition = |info: &MemoryInfo| self.kind.memory_indices().contains(&info.index);
        if !in_partition(memory) {
            return Vec::new();
        }

        let matched = match &self.kind {
            RuleKind::Generation(_) => {
                if memory.is_raw() { vec![memory.index] } else { Vec::new() }
            }
            RuleKind::Purification(args) => {
                if !memory.is_entangled() || memory.fidelity >= args.target_fidelity {
                    return Vec::new();
                }
                match args.mode {
                    PurificationMode::Single => vec![memory.index],
                    PurificationMode::Pair => manager
                        .iter()
                        .find(|&info| {
                            info.index != memory.index
                                && in_partition(info)
                                && info.is_entangled()
                                && info.remote_node == memory.remote_node
                                && info.remote_memory != memory.remote_memory
                                && (info.fidelity - memory.fidelity).abs() < FIDELITY_TOLERANCE
                        })
                        .map(|info| vec![memory.index, info.index])
                        .unwrap_or_default(),
                }
            }
            RuleKind::SwapExecute(args) => {
                let usable = |info: &MemoryInfo, toward: &NodeId| {
                    in_partition(info)
                        && info.is_entangled_with(toward)
                        && info.fidelity >= args.target_fidelity
                };
                // Either half may be the trigger; look for the other side.
                let other_side = if usable(memory, &args.left) {
                    Some(&args.right)
                } else if usable(memory, &args.right) {
                    Some(&args.left)
                } else {
                    None
                };
                other_side
                    .and_then(|toward| manager.iter().find(|&info| usable(info, toward)))
                    .map(|info| vec![memory.index, info.index])
                    .unwrap_or_default()
            }
            RuleKind::SwapPassthrough(args) => {
                let excluded = memory
                    .remote_node
                    .as_ref()
                    .is_some_and(|remote| args.excluded.contains(remote));
                if memory.is_entangled() && !excluded && memory.fidelity >= args.target_fidelity {
                    vec![memory.index]
                } else {
                    Vec::new()
                }
            }
        };
        if !matched.is_empty() {
            trace!(rule = self.kind.label(), reservation = %self.reservation, slots = ?matched, "condition matched");
        }
        matched
    }

    /// Builds the protocol for the slots a condition matched.
    ///
    /// `matched` must be the slots named by [`Rule::condition`], in the same
    /// order. Returns `None` if they do not fit the rule, e.g. an entangled
    /// slot without remote identity.
    pub fn action(&self, matched: &[&MemoryInfo]) -> Option<ActionOutcome> {
        let reservation = self.reservation;
        match &self.kind {
            RuleKind::Generation(args) => {
                let memory = matched.first()?;
                let protocol = ProtocolDescriptor::Generation {
                    name: format!("EGA.{}", memory.name),
                    reservation,
                    memory: memory.name.clone(),
                    remote_node: args.neighbor.clone(),
                    middle_node: args.middle_node.clone(),
                };
                let requests = match args.side {
                    HopSide::Left => Vec::new(),
                    HopSide::Right => vec![RemoteRequest {
                        destination: args.neighbor.clone(),
                        reservation,
                        correlation: Correlation::Generation { requester: args.own.clone() },
                    }],
                };
                Some(ActionOutcome { protocol, requests })
            }
            RuleKind::Purification(args) => match args.mode {
                PurificationMode::Single => {
                    let memory = matched.first()?;
                    Some(ActionOutcome::local(ProtocolDescriptor::Purification {
                        name: format!("EP.{}", memory.name),
                        reservation,
                        kept_memory: memory.name.clone(),
                        measured_memory: None,
                    }))
                }
                PurificationMode::Pair => {
                    let [kept, measured] = matched else {
                        return None;
                    };
                    let request = RemoteRequest {
                        destination: kept.remote_node.clone()?,
                        reservation,
                        correlation: Correlation::PurificationMerge {
                            kept_memory: kept.remote_memory.clone()?,
                            measured_memory: measured.remote_memory.clone()?,
                        },
                    };
                    Some(ActionOutcome {
                        protocol: ProtocolDescriptor::Purification {
                            name: format!("EP.{}.{}", kept.name, measured.name),
                            reservation,
                            kept_memory: kept.name.clone(),
                            measured_memory: Some(measured.name.clone()),
                        },
                        requests: vec![request],
                    })
                }
            },
            RuleKind::SwapExecute(args) => {
                let [first, second] = matched else {
                    return None;
                };
                let (left, right) = if first.is_entangled_with(&args.left) {
                    (first, second)
                } else {
                    (second, first)
                };
                let mut requests = Vec::with_capacity(2);
                for info in [left, right] {
                    requests.push(RemoteRequest {
                        destination: info.remote_node.clone()?,
                        reservation,
                        correlation: Correlation::Swap { target_memory: info.remote_memory.clone()? },
                    });
                }
                Some(ActionOutcome {
                    protocol: ProtocolDescriptor::SwapExecute {
                        name: format!("ESA.{}.{}", left.name, right.name),
                        reservation,
                        left_memory: left.name.clone(),
                        right_memory: right.name.clone(),
                        success_prob: args.success_prob,
                        degradation: args.degradation,
                    },
                    requests,
                })
            }
            RuleKind::SwapPassthrough(_) => {
                let memory = matched.first()?;
                Some(ActionOutcome::local(ProtocolDescriptor::SwapAnnounce {
                    name: format!("ESB.{}", memory.name),
                    reservation,
                    memory: memory.name.clone(),
                }))
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule[{} p={} {}]", self.kind.label(), self.priority, self.reservation)?;
        match &self.kind {
            RuleKind::Generation(a) => write!(f, " toward {} via {}", a.neighbor, a.middle_node)?,
            RuleKind::Purification(a) => write!(f, " below F={}", a.target_fidelity)?,
            RuleKind::SwapExecute(a) => write!(f, " {} <-> {}", a.left, a.right)?,
            RuleKind::SwapPassthrough(a) => {
                write!(f, " except")?;
                for node in &a.excluded {
                    write!(f, " {}", node)?;
                }
            }
        }
        write!(f, " slots={:?}", self.kind.memory_indices())
    }
}
