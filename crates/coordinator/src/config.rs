//! Per-category fulfillment timeout configuration.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use domain::ProductCategory;

/// Resolves the maximum wait time, in seconds, for each product category.
///
/// A pure lookup: providers return whatever entries they know about and may
/// omit categories. The coordinator validates the result and fails the
/// submission with `BadConfig` when an entry is missing or zero.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Returns the timeout policy for the requested categories.
    async fn resolve_timeouts(
        &self,
        categories: &BTreeSet<ProductCategory>,
    ) -> HashMap<ProductCategory, u32>;
}

/// Fixed in-memory timeout policy.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    timeouts: HashMap<ProductCategory, u32>,
}

impl StaticConfigProvider {
    /// Creates an empty provider with no configured categories.
    pub fn empty() -> Self {
        Self {
            timeouts: HashMap::new(),
        }
    }

    /// Sets the timeout for one category, replacing any previous entry.
    pub fn with_timeout(mut self, category: ProductCategory, seconds: u32) -> Self {
        self.timeouts.insert(category, seconds);
        self
    }
}

impl Default for StaticConfigProvider {
    /// Default vendor policy: accommodation 30s, taxi 40s, flight 50s.
    fn default() -> Self {
        Self::empty()
            .with_timeout(ProductCategory::Accommodation, 30)
            .with_timeout(ProductCategory::Taxi, 40)
            .with_timeout(ProductCategory::Flight, 50)
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn resolve_timeouts(
        &self,
        categories: &BTreeSet<ProductCategory>,
    ) -> HashMap<ProductCategory, u32> {
        categories
            .iter()
            .filter_map(|category| {
                self.timeouts
                    .get(category)
                    .map(|seconds| (*category, *seconds))
            })
            .collect()
    }
}
