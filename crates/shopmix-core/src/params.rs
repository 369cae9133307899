use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a producible product
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Stable identifier of a capacity-limited resource
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(ProductId);
string_id!(ResourceId);

/// Per-unit economics of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: ProductId,
    pub profit_per_unit: f64,
    /// Amount of each resource consumed by one unit
    #[serde(default)]
    pub usage: BTreeMap<ResourceId, f64>,
}

impl ProductSpec {
    pub fn new(name: impl Into<ProductId>, profit_per_unit: f64) -> Self {
        Self {
            name: name.into(),
            profit_per_unit,
            usage: BTreeMap::new(),
        }
    }

    pub fn with_usage(mut self, resource: impl Into<ResourceId>, per_unit: f64) -> Self {
        self.usage.insert(resource.into(), per_unit);
        self
    }

    /// Per-unit consumption of `resource`; zero when the product does not use it
    pub fn usage_of(&self, resource: &ResourceId) -> f64 {
        self.usage.get(resource).copied().unwrap_or(0.0)
    }
}

/// Available quantity per resource, fixed for the run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLimits(BTreeMap<ResourceId, f64>);

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Into<ResourceId>, available: f64) -> Self {
        self.0.insert(resource.into(), available);
        self
    }

    pub fn get(&self, resource: &ResourceId) -> Option<f64> {
        self.0.get(resource).copied()
    }

    pub fn contains(&self, resource: &ResourceId) -> bool {
        self.0.contains_key(resource)
    }

    /// Resources in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, f64)> {
        self.0.iter().map(|(r, &v)| (r, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Minimum units required per product; products not listed have no floor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionFloor(BTreeMap<ProductId, f64>);

impl ProductionFloor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, product: impl Into<ProductId>, minimum: f64) -> Self {
        self.0.insert(product.into(), minimum);
        self
    }

    pub fn get(&self, product: &ProductId) -> f64 {
        self.0.get(product).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, f64)> {
        self.0.iter().map(|(p, &v)| (p, v))
    }
}
