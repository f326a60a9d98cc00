// src/policy/mod.rs

//! Swap-order policies.
//!
//! A policy decides in which order the interior nodes of a path perform
//! entanglement swapping. It is the only input, besides the node's position,
//! that partner selection depends on.

use crate::core::{NodeId, SynthesisError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The order in which interior nodes swap.
///
/// Parsed from `"left_to_right"`, `"right_to_left"`, or an explicit list of
/// node names (comma separated in string form, a sequence in config files).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub enum SwapOrderPolicy {
    /// Swaps cascade from the initiator side first.
    #[default]
    LeftToRight,
    /// Swaps cascade from the responder side first.
    RightToLeft,
    /// Nodes swap in the listed order; the last entry closes the chain.
    Priority(Vec<NodeId>),
}

impl SwapOrderPolicy {
    /// Builds a priority policy from node names.
    pub fn priority<I, N>(order: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        SwapOrderPolicy::Priority(order.into_iter().map(Into::into).collect())
    }

    /// Checks the policy against a concrete path.
    ///
    /// Binary-reduction policies accept every path. A priority list must name
    /// every interior node exactly once and nothing else: a node missing from
    /// the list cannot place itself in the order and cannot bound the partner
    /// scan of the nodes around it.
    ///
    /// # Errors
    /// Returns `SynthesisError::Policy` naming the first offending node.
    pub fn validate(&self, path: &[NodeId]) -> Result<(), SynthesisError> {
        let SwapOrderPolicy::Priority(order) = self else {
            return Ok(());
        };
        let interior: HashSet<&NodeId> = match path.len() {
            0..=2 => HashSet::new(),
            n => path[1..n - 1].iter().collect(),
        };

        let mut seen = HashSet::with_capacity(order.len());
        for node in order {
            if !seen.insert(node) {
                return Err(SynthesisError::policy(node, "listed twice in swap order"));
            }
            if !interior.contains(node) {
                return Err(SynthesisError::policy(node, "swap order names a node that is not an interior node of the path"));
            }
        }
        // Report omissions in path order so the error is deterministic.
        if let Some(missing) = path.iter().skip(1).take(path.len().saturating_sub(2)).find(|n| !seen.contains(n)) {
            return Err(SynthesisError::policy(missing, "interior node missing from swap order"));
        }
        Ok(())
    }
}

impl fmt::Display for SwapOrderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapOrderPolicy::LeftToRight => write!(f, "left_to_right"),
            SwapOrderPolicy::RightToLeft => write!(f, "right_to_left"),
            SwapOrderPolicy::Priority(order) => {
                for (i, node) in order.iter().enumerate() {
                    write!(f, "{}{}", if i > 0 { "," } else { "" }, node)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for SwapOrderPolicy {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left_to_right" => Ok(SwapOrderPolicy::LeftToRight),
            "right_to_left" => Ok(SwapOrderPolicy::RightToLeft),
            "" => Err(SynthesisError::config("empty swap order")),
            list => {
                let order: Vec<NodeId> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(NodeId::from)
                    .collect();
                if order.is_empty() {
                    return Err(SynthesisError::config(format!("unrecognised swap order '{}'", s)));
                }
                Ok(SwapOrderPolicy::Priority(order))
            }
        }
    }
}

/// Config-file shape: a policy name or a list of node names.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Named(String),
    Order(Vec<NodeId>),
}

impl TryFrom<PolicyRepr> for SwapOrderPolicy {
    type Error = SynthesisError;

    fn try_from(repr: PolicyRepr) -> Result<Self, Self::Error> {
        match repr {
            PolicyRepr::Named(name) => match name.as_str() {
                "left_to_right" => Ok(SwapOrderPolicy::LeftToRight),
                "right_to_left" => Ok(SwapOrderPolicy::RightToLeft),
                other => Err(SynthesisError::config(format!("unknown swap order policy '{}'", other))),
            },
            PolicyRepr::Order(order) => Ok(SwapOrderPolicy::Priority(order)),
        }
    }
}

impl From<SwapOrderPolicy> for PolicyRepr {
    fn from(policy: SwapOrderPolicy) -> Self {
        match policy {
            SwapOrderPolicy::LeftToRight => PolicyRepr::Named("left_to_right".to_string()),
            SwapOrderPolicy::RightToLeft => PolicyRepr::Named("right_to_left".to_string()),
            SwapOrderPolicy::Priority(order) => PolicyRepr::Order(order),
        }
    }
}
