// src/engine/results.rs

use crate::core::{NodeId, ReservationId, SynthesisError};
use crate::rules::Rule;
use crate::store::RuleSink;
use std::fmt;

/// Per-node outcome of compiling one reservation, in path order.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRules {
    reservation: ReservationId,
    nodes: Vec<(NodeId, Result<Vec<Rule>, SynthesisError>)>,
}

impl PathRules {
    pub(crate) fn new(reservation: ReservationId, nodes: Vec<(NodeId, Result<Vec<Rule>, SynthesisError>)>) -> Self {
        Self { reservation, nodes }
    }

    pub fn reservation(&self) -> ReservationId {
        self.reservation
    }

    /// Every node's outcome in path order.
    pub fn nodes(&self) -> &[(NodeId, Result<Vec<Rule>, SynthesisError>)] {
        &self.nodes
    }

    /// Compiled rules of `node`, or `None` if it failed or is not on the path.
    pub fn rules_for(&self, node: &NodeId) -> Option<&[Rule]> {
        self.nodes
            .iter()
            .find(|(n, _)| n == node)
            .and_then(|(_, compiled)| compiled.as_deref().ok())
    }

    /// Nodes that failed, with their errors.
    pub fn failures(&self) -> Vec<(&NodeId, &SynthesisError)> {
        self.nodes
            .iter()
            .filter_map(|(node, compiled)| compiled.as_ref().err().map(|e| (node, e)))
            .collect()
    }

    /// `true` if every node compiled.
    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(|(_, compiled)| compiled.is_ok())
    }

    /// Installs the rules of every node that compiled, in compile order.
    /// Failed nodes install nothing. Returns the number of rules installed.
    pub fn install_into<S: RuleSink + ?Sized>(&self, sink: &mut S) -> usize {
        let mut installed = 0;
        for (node, compiled) in &self.nodes {
            if let Ok(rules) = compiled {
                for rule in rules {
                    sink.install(node, rule.clone());
                    installed += 1;
                }
            }
        }
        installed
    }
}

impl fmt::Display for PathRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} rules:", self.reservation)?;
        for (node, compiled) in &self.nodes {
            match compiled {
                Ok(rules) => {
                    writeln!(f, "  {}:", node)?;
                    for rule in rules {
                        writeln!(f, "    {}", rule)?;
                    }
                }
                Err(e) => writeln!(f, "  {}: FAILED {}", node, e)?,
            }
        }
        Ok(())
    }
}
