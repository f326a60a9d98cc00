// src/config/mod.rs

//! Engine configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! policy = ["r2", "r1", "r3"]   # or "left_to_right" / "right_to_left"
//! priority = 10
//! swap_success_prob = 1.0
//! swap_degradation = 0.95
//!
//! [capacity]
//! explicit = [2, 2, 3, 3, 2]
//! ```

use crate::core::{
    DEFAULT_RULE_PRIORITY, DEFAULT_SWAP_DEGRADATION, DEFAULT_SWAP_SUCCESS_PROB, SynthesisError,
};
use crate::partition::CapacityPolicy;
use crate::policy::SwapOrderPolicy;
use serde::{Deserialize, Serialize};

/// Settings shared by every node compiled by one [`crate::SwapOrderEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub policy: SwapOrderPolicy,
    pub capacity: CapacityPolicy,
    /// Priority of every installed rule.
    pub priority: u32,
    /// Handed to swapping protocols unchanged.
    pub swap_success_prob: f64,
    /// Handed to swapping protocols unchanged.
    pub swap_degradation: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: SwapOrderPolicy::default(),
            capacity: CapacityPolicy::default(),
            priority: DEFAULT_RULE_PRIORITY,
            swap_success_prob: DEFAULT_SWAP_SUCCESS_PROB,
            swap_degradation: DEFAULT_SWAP_DEGRADATION,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, SynthesisError> {
        let config: EngineConfig = toml::from_str(input)
            .map_err(|e| SynthesisError::config(format!("invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, SynthesisError> {
        toml::to_string(self).map_err(|e| SynthesisError::config(format!("cannot serialize engine config: {}", e)))
    }

    pub fn with_policy(mut self, policy: SwapOrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_capacity(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Checks the opaque swap parameters are probabilities.
    ///
    /// Path-dependent checks (priority lists, capacity tables) happen when a
    /// reservation is compiled.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        for (field, value) in [
            ("swap_success_prob", self.swap_success_prob),
            ("swap_degradation", self.swap_degradation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SynthesisError::config(format!("{} = {} outside [0, 1]", field, value)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeId;

    #[test]
    fn empty_document_yields_defaults() -> Result<(), SynthesisError> {
        assert_eq!(EngineConfig::from_toml_str("")?, EngineConfig::default());
        Ok(())
    }

    #[test]
    fn parses_priority_list_and_explicit_capacity() -> Result<(), SynthesisError> {
        let config = EngineConfig::from_toml_str(
            r#"
            policy = ["r2", "r1", "r3"]
            priority = 4

            [capacity]
            explicit = [2, 2, 3, 3, 2]
            "#,
        )?;
        assert_eq!(
            config.policy,
            SwapOrderPolicy::Priority(vec![NodeId::from("r2"), NodeId::from("r1"), NodeId::from("r3")])
        );
        assert_eq!(config.capacity, CapacityPolicy::Explicit(vec![2, 2, 3, 3, 2]));
        assert_eq!(config.priority, 4);
        assert_eq!(config.swap_degradation, DEFAULT_SWAP_DEGRADATION);
        Ok(())
    }

    #[test]
    fn named_policy_and_uniform_capacity() -> Result<(), SynthesisError> {
        let config = EngineConfig::from_toml_str(
            r#"
            policy = "right_to_left"
            capacity = { uniform = { per_hop = 3 } }
            "#,
        )?;
        assert_eq!(config.policy, SwapOrderPolicy::RightToLeft);
        assert_eq!(config.capacity, CapacityPolicy::Uniform { per_hop: 3 });
        Ok(())
    }

    #[test]
    fn rejects_unknown_policy_and_bad_probability() {
        let unknown = EngineConfig::from_toml_str(r#"policy = "outside_in""#);
        assert!(matches!(unknown, Err(ref e) if e.is_config()));

        let bad = EngineConfig::from_toml_str("swap_success_prob = 1.5");
        assert!(matches!(bad, Err(ref e) if e.is_config()));
    }

    #[test]
    fn round_trips_through_toml() -> Result<(), SynthesisError> {
        let config = EngineConfig::default()
            .with_policy(SwapOrderPolicy::priority(["b", "c"]))
            .with_capacity(CapacityPolicy::Weighted(vec![1, 2, 2, 1]))
            .with_priority(7);
        let text = config.to_toml_string()?;
        assert_eq!(EngineConfig::from_toml_str(&text)?, config);
        Ok(())
    }
}
