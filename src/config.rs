// Inventory configuration loaded from JSON

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::inventory::CommitPolicy;
use crate::reservation::CarType;

// {"capacity": {"SEDAN": 2, "SUV": 1}, "policy": "optimistic"}; policy defaults to serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub capacity: HashMap<CarType, u32>,
    #[serde(default)]
    pub policy: CommitPolicy,
}

impl InventoryConfig {
    pub fn new(capacity: HashMap<CarType, u32>) -> Self {
        Self {
            capacity,
            policy: CommitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capacity.is_empty() {
            return Err(ValidationError::EmptyCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InMemoryInventory, Inventory};
    use test_case::test_case;

    #[test]
    fn test_parse_full_config() {
        let config = InventoryConfig::from_json_str(
            r#"{"capacity": {"SEDAN": 2, "SUV": 1, "VAN": 0}, "policy": "optimistic"}"#,
        )
        .unwrap();

        assert_eq!(config.capacity.get(&CarType::Sedan), Some(&2));
        assert_eq!(config.capacity.get(&CarType::Suv), Some(&1));
        assert_eq!(config.capacity.get(&CarType::Van), Some(&0));
        assert_eq!(config.policy, CommitPolicy::Optimistic);
    }

    #[test]
    fn test_policy_defaults_to_serialized() {
        let config = InventoryConfig::from_json_str(r#"{"capacity": {"VAN": 4}}"#).unwrap();
        assert_eq!(config.policy, CommitPolicy::Serialized);
    }

    #[test]
    fn test_empty_capacity_is_invalid() {
        let err = InventoryConfig::from_json_str(r#"{"capacity": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::EmptyCapacity)
        ));
    }

    #[test_case(r#"{"capacity": {"TRUCK": 1}}"#; "unknown car type")]
    #[test_case(r#"{"capacity": {"SEDAN": -1}}"#; "negative capacity")]
    #[test_case(r#"{"policy": "serialized"}"#; "missing capacity")]
    #[test_case(r#"{"capacity": {"SEDAN": 1}, "policy": "eventually"}"#; "unknown policy")]
    fn test_malformed_config_is_a_parse_error(json: &str) {
        let err = InventoryConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "unexpected error: {}", err);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "rental_reservations_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"capacity": {"SEDAN": 3}}"#).unwrap();

        let config = InventoryConfig::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();

        let inventory = InMemoryInventory::from_config(&config.unwrap()).unwrap();
        assert_eq!(inventory.capacity_of(CarType::Sedan), 3);
        assert_eq!(inventory.policy(), CommitPolicy::Serialized);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = InventoryConfig::from_json_file("/nonexistent/rental/capacity.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_inventory_from_config_keeps_policy() {
        let config = InventoryConfig::new(HashMap::from([(CarType::Suv, 1)]))
            .with_policy(CommitPolicy::Optimistic);
        let inventory = InMemoryInventory::from_config(&config).unwrap();
        assert_eq!(inventory.policy(), CommitPolicy::Optimistic);
        assert_eq!(inventory.capacity(), &config.capacity);
    }
}
