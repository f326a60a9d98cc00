// src/compiler/mod.rs

//! Per-node rule synthesis.
//!
//! A node's rule set depends only on its position on the path, the
//! reservation, its own memory inventory and the engine configuration. Every
//! node compiles its own rules without talking to the others; the partner
//! selection guarantees the rule sets fit together.

mod inventory;

pub use inventory::NodeInventory;

use crate::config::EngineConfig;
use crate::core::{NodeId, Reservation, SynthesisError};
use crate::partition::partition;
use crate::partners::{Partners, select_partners};
use crate::rules::{
    GenerationArgs, HopSide, PassthroughArgs, PurificationArgs, PurificationMode, Rule, RuleKind,
    SwapExecuteArgs,
};
use tracing::debug;

/// Compiles the rules of the node at `position` on `reservation`'s path.
///
/// Rules come out in installation order: generation (left hop, then right
/// hop), purification (pair on the left hop, single on the right hop), then
/// swapping (swap-execute and pass-through at interior nodes, pass-through
/// only at the endpoints). All share `config.priority`.
///
/// # Errors
/// * `SynthesisError::Config` if `position` is off the path or the inventory
///   cannot satisfy `config.capacity`.
/// * `SynthesisError::Policy` if `config.policy` cannot order this path.
pub fn compile(
    position: usize,
    reservation: &Reservation,
    inventory: &NodeInventory,
    config: &EngineConfig,
) -> Result<Vec<Rule>, SynthesisError> {
    let path = reservation.path();
    let Some(own) = path.get(position) else {
        return Err(SynthesisError::config(format!(
            "position {} is outside the {} path of {} nodes",
            position,
            reservation.id(),
            path.len()
        )));
    };
    let last = path.len() - 1;

    // Endpoints never consult the order, but a path the policy cannot order
    // must not get any rules.
    config.policy.validate(path)?;
    let slots = partition(path.len(), position, inventory.slots(), &config.capacity)?;
    let partners = select_partners(path, position, &config.policy)?;

    let fidelity = reservation.target_fidelity();
    let rule = |kind| Rule::new(config.priority, reservation.id(), kind);
    let mut rules = Vec::with_capacity(6);

    let generation = |neighbor: &NodeId, memory_indices: &[usize], side| {
        rule(RuleKind::Generation(GenerationArgs {
            memory_indices: memory_indices.to_vec(),
            own: own.clone(),
            neighbor: neighbor.clone(),
            middle_node: inventory.middle_node(own, neighbor),
            side,
        }))
    };
    if position > 0 {
        rules.push(generation(&path[position - 1], slots.left(), HopSide::Left));
    }
    if position < last {
        rules.push(generation(&path[position + 1], slots.right(), HopSide::Right));
    }

    if position > 0 {
        rules.push(rule(RuleKind::Purification(PurificationArgs {
            memory_indices: slots.left().to_vec(),
            target_fidelity: fidelity,
            mode: PurificationMode::Pair,
        })));
    }
    if position < last {
        rules.push(rule(RuleKind::Purification(PurificationArgs {
            memory_indices: slots.right().to_vec(),
            target_fidelity: fidelity,
            mode: PurificationMode::Single,
        })));
    }

    let reserved = slots.all();
    match &partners {
        Partners::Endpoint => {
            let opposite = if position == 0 { &path[last] } else { &path[0] };
            rules.push(rule(RuleKind::SwapPassthrough(PassthroughArgs {
                memory_indices: reserved,
                excluded: vec![opposite.clone()],
                target_fidelity: fidelity,
            })));
        }
        Partners::Swap { left, right } => {
            rules.push(rule(RuleKind::SwapExecute(SwapExecuteArgs {
                memory_indices: reserved.clone(),
                left: left.clone(),
                right: right.clone(),
                target_fidelity: fidelity,
                success_prob: config.swap_success_prob,
                degradation: config.swap_degradation,
            })));
            rules.push(rule(RuleKind::SwapPassthrough(PassthroughArgs {
                memory_indices: reserved,
                excluded: vec![left.clone(), right.clone()],
                target_fidelity: fidelity,
            })));
        }
    }

    debug!(
        node = %own,
        position,
        partners = %partners,
        partition = %slots,
        rules = rules.len(),
        "compiled node rules"
    );
    Ok(rules)
}
