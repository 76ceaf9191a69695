//! Configuration for a state machine instance

/// Configuration for [`StateMachine`](crate::StateMachine)
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Name attached to every log record from this machine
    /// Default: "player"
    pub name: String,

    /// Re-enter a failed effect directive as a `Fault` event
    ///
    /// When disabled the failure is only reported as a warning and the
    /// committed state stands.
    /// Default: true
    pub fault_on_effect_failure: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: "player".to_string(),
            fault_on_effect_failure: true,
        }
    }
}

impl MachineConfig {
    /// Create a MachineConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MachineConfig with the given name and default behavior
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::new();
        assert_eq!(config.name, "player");
        assert!(config.fault_on_effect_failure);
    }

    #[test]
    fn test_named() {
        let config = MachineConfig::named("deck-b");
        assert_eq!(config.name, "deck-b");
        assert!(config.fault_on_effect_failure);
    }
}
