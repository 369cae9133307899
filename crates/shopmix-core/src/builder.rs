use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::model::{Constraint, ConstraintKind, Domain, Model, Relation, Sense, Variable};
use crate::params::{ProductId, ProductSpec, ProductionFloor, ResourceId, ResourceLimits};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("No products to plan")]
    NoProducts,
    #[error("Duplicate product: {0}")]
    DuplicateProduct(ProductId),
    #[error("Product {product} uses resource {resource}, which has no limit")]
    UnknownResource { product: ProductId, resource: ResourceId },
    #[error("Production floor given for unknown product: {0}")]
    UnknownProduct(ProductId),
    #[error("Negative value {value} for {what}")]
    NegativeValue { what: String, value: f64 },
    #[error("Non-finite value for {0}")]
    NonFinite(String),
}

fn check_value(what: impl FnOnce() -> String, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() {
        return Err(ModelError::NonFinite(what()));
    }
    if value < 0.0 {
        return Err(ModelError::NegativeValue { what: what(), value });
    }
    Ok(())
}

/// Turns a parameter set into a [`Model`]
pub struct ModelBuilder;

impl ModelBuilder {
    /// Build the profit-maximizing model for `products`.
    ///
    /// Emits one `<=` row per resource in `limits` (named
    /// `{resource}_capacity`) and one `>=` row per product with a positive
    /// floor (named `{product}_minimum`).
    pub fn build(
        products: &[ProductSpec],
        limits: &ResourceLimits,
        floors: &ProductionFloor,
    ) -> Result<Model, ModelError> {
        if products.is_empty() {
            return Err(ModelError::NoProducts);
        }

        let mut seen = BTreeSet::new();
        for product in products {
            if !seen.insert(&product.name) {
                return Err(ModelError::DuplicateProduct(product.name.clone()));
            }
            check_value(|| format!("profit of {}", product.name), product.profit_per_unit)?;
            for (resource, &per_unit) in &product.usage {
                check_value(|| format!("{} usage of {}", product.name, resource), per_unit)?;
                if !limits.contains(resource) {
                    return Err(ModelError::UnknownResource {
                        product: product.name.clone(),
                        resource: resource.clone(),
                    });
                }
            }
        }
        for (resource, available) in limits.iter() {
            check_value(|| format!("limit of {}", resource), available)?;
        }
        for (product, minimum) in floors.iter() {
            if !seen.contains(product) {
                return Err(ModelError::UnknownProduct(product.clone()));
            }
            check_value(|| format!("floor of {}", product), minimum)?;
        }

        let variables = products
            .iter()
            .map(|p| Variable {
                product: p.name.clone(),
                domain: Domain::NonNegativeInteger,
            })
            .collect();

        let objective = products
            .iter()
            .map(|p| (p.name.clone(), p.profit_per_unit))
            .collect();

        let mut constraints = Vec::with_capacity(limits.len() + products.len());
        for (resource, available) in limits.iter() {
            let coefficients: BTreeMap<ProductId, f64> = products
                .iter()
                .map(|p| (p.name.clone(), p.usage_of(resource)))
                .filter(|(_, c)| *c != 0.0)
                .collect();
            constraints.push(Constraint {
                name: Constraint::capacity_name(resource),
                kind: ConstraintKind::Capacity(resource.clone()),
                coefficients,
                relation: Relation::Le,
                bound: available,
            });
        }
        for product in products {
            let minimum = floors.get(&product.name);
            if minimum > 0.0 {
                constraints.push(Constraint {
                    name: Constraint::minimum_name(&product.name),
                    kind: ConstraintKind::Minimum(product.name.clone()),
                    coefficients: BTreeMap::from([(product.name.clone(), 1.0)]),
                    relation: Relation::Ge,
                    bound: minimum,
                });
            }
        }

        tracing::debug!(
            variables = products.len(),
            constraints = constraints.len(),
            "built production model"
        );

        Ok(Model {
            sense: Sense::Maximize,
            variables,
            objective,
            constraints,
        })
    }
}
