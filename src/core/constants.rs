//! Constants shared by the rule compiler and the resolver.

/// Defaults applied when the caller does not configure otherwise.
pub mod swap_constants {
    /// Priority given to every rule of a reservation.
    pub const DEFAULT_RULE_PRIORITY: u32 = 10;
    /// Two fidelities closer than this are treated as equal when pairing
    /// slots for purification.
    pub const FIDELITY_TOLERANCE: f64 = 1e-9;
    /// Opaque success probability handed to swapping protocols.
    pub const DEFAULT_SWAP_SUCCESS_PROB: f64 = 1.0;
    /// Opaque fidelity degradation handed to swapping protocols.
    pub const DEFAULT_SWAP_DEGRADATION: f64 = 0.95;
}
