//! Compiles one reservation under each swap-order policy and prints the
//! resulting swap schedule and per-node rules.
//!
//! Run with `RUST_LOG=swaporder=debug` to see per-node compilation.

use swaporder::{
    CapacityPolicy, EngineConfig, NodeId, NodeInventory, Reservation, ReservationId, SwapOrderEngine,
    SwapOrderPolicy, SynthesisError,
};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

// Helper for NodeId creation
fn nid(name: &str) -> NodeId { NodeId::from(name) }

fn main() -> Result<(), SynthesisError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swaporder=info")))
        .init();

    println!("--- swaporder Example: one path, three swap orders ---");

    let path: Vec<NodeId> = ["Nodei", "r1", "r2", "r3", "r4", "Nodej"].into_iter().map(nid).collect();
    let reservation = Reservation::new(ReservationId(1), path.clone(), 0, 10_000_000, 2, 0.9)?;
    println!("\n{}", reservation);

    let inventories: HashMap<NodeId, NodeInventory> = path
        .iter()
        .map(|n| (n.clone(), NodeInventory::new(format!("{}.MemoryArray", n), 0..4)))
        .collect();

    let policies = [
        SwapOrderPolicy::LeftToRight,
        SwapOrderPolicy::RightToLeft,
        SwapOrderPolicy::priority(["r3", "r1", "r4", "r2"]),
    ];
    for policy in policies {
        let engine = SwapOrderEngine::new(
            EngineConfig::default()
                .with_policy(policy.clone())
                .with_capacity(CapacityPolicy::from_reservation(&reservation)),
        );
        println!("\n=== policy: {} ===", policy);
        println!("{}", engine.schedule(&reservation)?);

        let compiled = engine.on_path_approved(&reservation, &inventories);
        println!("{}", compiled);
    }

    // A list that leaves out r2 cannot order the path.
    let broken = SwapOrderEngine::new(
        EngineConfig::default().with_policy(SwapOrderPolicy::priority(["r3", "r1", "r4"])),
    );
    let compiled = broken.on_path_approved(&reservation, &inventories);
    println!("\n=== policy: r3,r1,r4 ===");
    for (node, err) in compiled.failures() {
        println!("  {} rejected: {}", node, err);
    }
    Ok(())
}
