#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for a matter subsystem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MatterConfig {
    /// Name reported in log events
    pub name: String,

    /// Whether a constraint may connect a mobilized body to itself
    pub allow_self_constraints: bool,

    /// Expected number of mobilized bodies, used to pre-size the tables
    pub capacity_hint: usize,
}

impl MatterConfig {
    /// Creates the default configuration with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for MatterConfig {
    fn default() -> Self {
        Self {
            name: String::from("matter"),
            allow_self_constraints: false,
            capacity_hint: 16,
        }
    }
}
