// src/store/mod.rs

//! Rule installation and evaluation on the node side.

use crate::core::{MemoryInfo, NodeId, ReservationId};
use crate::rules::{ActionOutcome, Rule};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Where compiled rules are installed. Implemented by the host's per-node
/// rule managers.
pub trait RuleSink {
    fn install(&mut self, node: &NodeId, rule: Rule);
}

/// A rule that fired: the rule itself, the slots it matched (trigger
/// first) and what its action produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub rule: Rule,
    pub matched: Vec<usize>,
    pub outcome: ActionOutcome,
}

/// In-memory rule store keyed by node.
///
/// Rules are kept in installation order. Evaluation visits them by ascending
/// priority, ties in installation order, and fires the first one whose
/// condition matches and whose action accepts the matched slots.
#[derive(Debug, Default)]
pub struct RuleStore {
    nodes: HashMap<NodeId, Vec<Rule>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules installed on `node`, in installation order.
    pub fn rules_for(&self, node: &NodeId) -> &[Rule] {
        self.nodes.get(node).map_or(&[], Vec::as_slice)
    }

    /// Total number of installed rules.
    pub fn len(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `node`'s rules against the slot that just changed.
    ///
    /// `manager` is the node's whole memory view. Nothing is mutated; the
    /// caller applies the outcome and sends its requests.
    pub fn evaluate(&self, node: &NodeId, memory: &MemoryInfo, manager: &[MemoryInfo]) -> Option<Firing> {
        let mut ordered: Vec<&Rule> = self.rules_for(node).iter().collect();
        // Stable sort keeps installation order within a priority.
        ordered.sort_by_key(|rule| rule.priority());

        for rule in ordered {
            let matched = rule.condition(memory, manager);
            if matched.is_empty() {
                continue;
            }
            let slots: Option<Vec<&MemoryInfo>> = matched
                .iter()
                .map(|index| {
                    if *index == memory.index {
                        Some(memory)
                    } else {
                        manager.iter().find(|info| info.index == *index)
                    }
                })
                .collect();
            let Some(slots) = slots else {
                continue;
            };
            if let Some(outcome) = rule.action(&slots) {
                trace!(node = %node, rule = %rule, protocol = outcome.protocol.name(), "rule fired");
                return Some(Firing { rule: rule.clone(), matched, outcome });
            }
        }
        None
    }

    /// Unregisters every rule of `reservation` on every node.
    /// Returns the number of rules removed.
    pub fn expire(&mut self, reservation: ReservationId) -> usize {
        let mut removed = 0;
        for rules in self.nodes.values_mut() {
            let before = rules.len();
            rules.retain(|rule| rule.reservation() != reservation);
            removed += before - rules.len();
        }
        self.nodes.retain(|_, rules| !rules.is_empty());
        debug!(reservation = %reservation, removed, "expired reservation rules");
        removed
    }
}

impl RuleSink for RuleStore {
    fn install(&mut self, node: &NodeId, rule: Rule) {
        self.nodes.entry(node.clone()).or_default().push(rule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{GenerationArgs, HopSide, PassthroughArgs, RuleKind};

    fn generation(priority: u32, reservation: u64, neighbor: &str) -> Rule {
        Rule::new(
            priority,
            ReservationId(reservation),
            RuleKind::Generation(GenerationArgs {
                memory_indices: vec![0, 1],
                own: NodeId::from("a"),
                neighbor: NodeId::from(neighbor),
                middle_node: NodeId::from("m"),
                side: HopSide::Right,
            }),
        )
    }

    #[test]
    fn lower_priority_value_fires_first_then_installation_order() {
        let node = NodeId::from("a");
        let mut store = RuleStore::new();
        store.install(&node, generation(10, 1, "late"));
        store.install(&node, generation(5, 1, "first"));
        store.install(&node, generation(5, 1, "second"));

        let manager = vec![MemoryInfo::raw(0, "a[0]")];
        let firing = store.evaluate(&node, &manager[0], &manager).expect("a rule fires");
        match firing.rule.kind() {
            RuleKind::Generation(args) => assert_eq!(args.neighbor, NodeId::from("first")),
            other => panic!("unexpected rule {:?}", other),
        }
        assert_eq!(firing.matched, vec![0]);
    }

    #[test]
    fn unmatched_memory_fires_nothing() {
        let node = NodeId::from("a");
        let mut store = RuleStore::new();
        store.install(
            &node,
            Rule::new(
                10,
                ReservationId(1),
                RuleKind::SwapPassthrough(PassthroughArgs {
                    memory_indices: vec![0],
                    excluded: vec![],
                    target_fidelity: 0.5,
                }),
            ),
        );
        let manager = vec![MemoryInfo::raw(0, "a[0]")];
        assert!(store.evaluate(&node, &manager[0], &manager).is_none());
        assert!(store.evaluate(&NodeId::from("other"), &manager[0], &manager).is_none());
    }

    #[test]
    fn expire_removes_only_that_reservation() {
        let mut store = RuleStore::new();
        store.install(&NodeId::from("a"), generation(10, 1, "b"));
        store.install(&NodeId::from("a"), generation(10, 2, "b"));
        store.install(&NodeId::from("b"), generation(10, 1, "a"));

        assert_eq!(store.expire(ReservationId(1)), 2);
        assert_eq!(store.len(), 1);
        assert!(store.rules_for(&NodeId::from("b")).is_empty());
        assert_eq!(store.rules_for(&NodeId::from("a"))[0].reservation(), ReservationId(2));
    }
}
