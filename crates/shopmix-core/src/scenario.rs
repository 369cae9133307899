use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::{ModelBuilder, ModelError};
use crate::model::Model;
use crate::params::{ProductSpec, ProductionFloor, ResourceLimits};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The full parameter set for one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub products: Vec<ProductSpec>,
    pub limits: ResourceLimits,
    #[serde(default)]
    pub floors: ProductionFloor,
}

impl Scenario {
    /// The furniture shop: tables and chairs sharing labor, wood and machine time
    pub fn furniture() -> Self {
        Self {
            products: vec![
                ProductSpec::new("table", 220.0)
                    .with_usage("labor_hours", 8.0)
                    .with_usage("wood", 30.0)
                    .with_usage("machine_time", 4.0),
                ProductSpec::new("chair", 80.0)
                    .with_usage("labor_hours", 5.0)
                    .with_usage("wood", 10.0)
                    .with_usage("machine_time", 2.0),
            ],
            limits: ResourceLimits::new()
                .with("labor_hours", 400.0)
                .with("wood", 800.0)
                .with("machine_time", 150.0),
            floors: ProductionFloor::new().with("table", 10.0).with("chair", 20.0),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn build_model(&self) -> Result<Model, ModelError> {
        ModelBuilder::build(&self.products, &self.limits, &self.floors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ProductId, ResourceId};

    #[test]
    fn test_parse_scenario_json() {
        let json = r#"{
            "products": [
                { "name": "stool", "profit_per_unit": 30, "usage": { "wood": 4 } }
            ],
            "limits": { "wood": 100 },
            "floors": { "stool": 2 }
        }"#;

        let scenario = Scenario::from_json_str(json).unwrap();

        assert_eq!(scenario.products.len(), 1);
        assert_eq!(scenario.products[0].name, ProductId::from("stool"));
        assert_eq!(scenario.products[0].usage_of(&ResourceId::from("wood")), 4.0);
        assert_eq!(scenario.limits.get(&ResourceId::from("wood")), Some(100.0));
        assert_eq!(scenario.floors.get(&ProductId::from("stool")), 2.0);
    }

    #[test]
    fn test_floors_are_optional() {
        let json = r#"{ "products": [{ "name": "stool", "profit_per_unit": 30 }], "limits": {} }"#;

        let scenario = Scenario::from_json_str(json).unwrap();

        assert_eq!(scenario.floors, ProductionFloor::new());
        assert!(scenario.products[0].usage.is_empty());
    }

    #[test]
    fn test_furniture_survives_json() {
        let scenario = Scenario::furniture();
        let json = scenario.to_json_pretty().unwrap();
        assert_eq!(Scenario::from_json_str(&json).unwrap(), scenario);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Scenario::from_json_str("{ \"products\": 3 }"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::from_path("/nonexistent/scenario.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
