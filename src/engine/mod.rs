// src/engine/mod.rs

//! The entry point called when a reservation's path is approved.
//!
//! [`SwapOrderEngine::on_path_approved`] compiles every node of the path
//! independently. A node that fails gets no rules at all; its failure is
//! reported in the returned [`PathRules`] and never affects the other nodes.

mod results;

pub use results::PathRules;

use crate::compiler::{NodeInventory, compile};
use crate::config::EngineConfig;
use crate::core::{NodeId, Reservation, SynthesisError};
use crate::partners::SwapSchedule;
use std::collections::HashMap;
use tracing::{info, warn};

/// Compiles swap-order rule sets for approved reservations.
#[derive(Debug, Clone, Default)]
pub struct SwapOrderEngine {
    config: EngineConfig,
}

impl SwapOrderEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compiles the rules of every node on `reservation`'s path.
    ///
    /// `inventories` holds each node's reserved memory slots; a node without
    /// an entry fails with `SynthesisError::Config`.
    pub fn on_path_approved(
        &self,
        reservation: &Reservation,
        inventories: &HashMap<NodeId, NodeInventory>,
    ) -> PathRules {
        info!(
            reservation = %reservation.id(),
            initiator = %reservation.initiator(),
            responder = %reservation.responder(),
            hops = reservation.path().len() - 1,
            policy = %self.config.policy,
            "path approved, compiling rules"
        );

        let nodes = reservation
            .path()
            .iter()
            .enumerate()
            .map(|(position, node)| {
                let compiled = inventories
                    .get(node)
                    .ok_or_else(|| SynthesisError::config(format!("no memory inventory for node {}", node)))
                    .and_then(|inventory| compile(position, reservation, inventory, &self.config));
                if let Err(e) = &compiled {
                    warn!(reservation = %reservation.id(), node = %node, error = %e, "node rules not installed");
                }
                (node.clone(), compiled)
            })
            .collect();
        PathRules::new(reservation.id(), nodes)
    }

    /// The swap order this engine's policy produces on `reservation`'s path.
    pub fn schedule(&self, reservation: &Reservation) -> Result<SwapSchedule, SynthesisError> {
        SwapSchedule::plan(reservation.path(), &self.config.policy)
    }
}
