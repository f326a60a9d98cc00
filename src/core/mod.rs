// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod memory;
pub mod reservation;

pub use error::{NodeId, ReservationId, SynthesisError};
pub use memory::{MemoryInfo, MemoryState, memory_name};
pub use reservation::Reservation;

pub mod constants;
pub use constants::swap_constants::{
    DEFAULT_RULE_PRIORITY, DEFAULT_SWAP_DEGRADATION, DEFAULT_SWAP_SUCCESS_PROB,
    FIDELITY_TOLERANCE,
};
